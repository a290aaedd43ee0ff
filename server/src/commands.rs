//! Line-oriented text commands standing in for the chat transport.
//!
//! Each line is `<player_id> /<command> [args]`. The driver only parses and
//! renders; every rule lives behind [`Game`].

use rpg_shared::{
    AttackOutcome, CombatEvent, CombatStatus, DefeatResult, DropOutcome, EncounterEvent,
    FleeResult, GameError, HuntOutcome, ItemKind, ShopCategory, StatusEffect, Target,
    VictoryResult,
};

use crate::game::Game;
use crate::persistence::PlayerRepository;
use crate::progression::{rank_title, total_xp, xp_needed};
use crate::shop::DailyOffer;

/// Result of executing a command
pub struct CommandResult {
    /// Whether the command was successful
    pub success: bool,
    /// Message to display to the user
    pub message: String,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<GameError> for CommandResult {
    fn from(err: GameError) -> Self {
        Self::error(err.to_string())
    }
}

/// Parse and execute one input line.
/// Returns None for blank lines.
pub fn parse_and_execute<R: PlayerRepository>(line: &str, game: &mut Game<R>) -> Option<CommandResult> {
    let mut parts = line.split_whitespace();
    let player_id = parts.next()?;
    let Some(command) = parts.next() else {
        return Some(CommandResult::error("Usage: <player_id> /<command> [args]"));
    };
    let Some(command) = command.strip_prefix('/') else {
        return Some(CommandResult::error(format!("Commands start with /, got {}", command)));
    };
    let command = command.to_lowercase();
    let args: Vec<&str> = parts.collect();

    Some(match command.as_str() {
        "help" => cmd_help(),
        "start" => cmd_start(player_id, &args, game),
        "name" => cmd_name(player_id, &args, game),
        "status" => cmd_status(player_id, game),
        "hunt" => cmd_hunt(player_id, game),
        "continue" => cmd_continue(player_id, game),
        "attack" => cmd_attack(player_id, game),
        "flee" => cmd_flee(player_id, game),
        "use" => cmd_use(player_id, &args, game),
        "equip" => cmd_equip(player_id, &args, game),
        "rest" => cmd_rest(player_id, game),
        "swap" => cmd_swap(player_id, &args, game),
        "dismiss" => cmd_dismiss(player_id, &args, game),
        "buy" => cmd_buy(player_id, &args, game),
        "sell" => cmd_sell(player_id, &args, game),
        "map" => cmd_map(player_id, &args, game),
        "merchant" => cmd_merchant(player_id, &args, game),
        "offer" => cmd_offer(game),
        _ => CommandResult::error(format!("Unknown command: /{}", command)),
    })
}

// =============================================================================
// Character
// =============================================================================

fn cmd_help() -> CommandResult {
    let mut help = String::from("Available commands:\n");
    help.push_str("  /start <class> - Create a character (warrior, mage, archer, fighter, unemployed)\n");
    help.push_str("  /name [name] - Name your character (random if omitted)\n");
    help.push_str("  /status - Show your character\n");
    help.push_str("  /hunt - Go hunting\n");
    help.push_str("  /continue - Hunt a monster right after an encounter\n");
    help.push_str("  /attack - Attack the current monster\n");
    help.push_str("  /flee - Try to run away\n");
    help.push_str("  /use <item> - Use a consumable\n");
    help.push_str("  /equip weapon|armor <item> - Equip owned gear\n");
    help.push_str("  /rest - Recover some HP\n");
    help.push_str("  /swap <n> [discard] - Take pending drop n, optionally discarding a stack\n");
    help.push_str("  /dismiss <n> - Throw away pending drop n\n");
    help.push_str("  /buy <potions|buffs|weapons|armors> <item> - Buy from the shop\n");
    help.push_str("  /sell <item> - Sell an item\n");
    help.push_str("  /map <id> - Travel to an unlocked map\n");
    help.push_str("  /merchant buy|duel - Deal with a wandering merchant\n");
    help.push_str("  /offer - Show today's shop offer\n");
    CommandResult::success(help)
}

fn cmd_start<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    let Some(class) = args.first() else {
        return CommandResult::error("Usage: /start <class>");
    };
    match game.create_player(id, class) {
        Ok(player) => CommandResult::success(format!(
            "A new {} begins with {} HP, a {} and nothing else. Use /name to pick a name.",
            player.class.name(),
            player.max_hp,
            player.equipped_weapon
        )),
        Err(e) => e.into(),
    }
}

fn cmd_name<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    let name = if args.is_empty() {
        game.random_name()
    } else {
        args.join(" ")
    };
    match game.set_name(id, &name) {
        Ok(player) => CommandResult::success(format!(
            "You are now known as {}",
            player.name.unwrap_or_default()
        )),
        Err(e) => e.into(),
    }
}

fn cmd_status<R: PlayerRepository>(id: &str, game: &Game<R>) -> CommandResult {
    let player = match game.player(id) {
        Ok(player) => player,
        Err(e) => return e.into(),
    };

    let mut msg = format!(
        "{} the {} {} (level {})\n",
        player.name.as_deref().unwrap_or("Nameless"),
        rank_title(player.level),
        player.class.name(),
        player.level
    );
    msg.push_str(&format!(
        "HP {}/{}  XP {}/{} (total {})  Gold {}\n",
        player.hp,
        player.max_hp,
        player.xp,
        xp_needed(player.level),
        total_xp(player.level, player.xp),
        player.gold
    ));
    msg.push_str(&format!(
        "Weapon: {}  Armor: {}\n",
        player.equipped_weapon, player.equipped_armor
    ));
    msg.push_str(&format!(
        "{} ({}/{} slots)\n",
        player.backpack.name(),
        player.slots_used(),
        player.capacity()
    ));
    for (item, quantity) in &player.inventory {
        msg.push_str(&format!("  {} x{}\n", item, quantity));
    }
    for (i, pending) in player.pending_drop_swaps.iter().enumerate() {
        msg.push_str(&format!("  pending #{}: {}\n", i + 1, pending.item_name));
    }
    msg.push_str(&format!("Map: {}", player.current_map_id));

    if let Ok(status) = game.combat_status(id) {
        msg.push('\n');
        msg.push_str(&render_status(&status));
    }
    CommandResult::success(msg)
}

// =============================================================================
// Hunting and Combat
// =============================================================================

fn cmd_hunt<R: PlayerRepository>(id: &str, game: &mut Game<R>) -> CommandResult {
    match game.start_hunt(id) {
        Ok(HuntOutcome::Encounter(event)) => CommandResult::success(render_encounter(&event)),
        Ok(HuntOutcome::Combat(status)) => CommandResult::success(format!(
            "A {} appears!\n{}",
            status.monster.name,
            render_status(&status)
        )),
        Ok(HuntOutcome::InProgress(status)) => CommandResult::success(format!(
            "You are still fighting.\n{}",
            render_status(&status)
        )),
        Err(e) => e.into(),
    }
}

fn cmd_continue<R: PlayerRepository>(id: &str, game: &mut Game<R>) -> CommandResult {
    match game.continue_hunt(id) {
        Ok(status) => CommandResult::success(format!(
            "A {} appears!\n{}",
            status.monster.name,
            render_status(&status)
        )),
        Err(e) => e.into(),
    }
}

fn cmd_attack<R: PlayerRepository>(id: &str, game: &mut Game<R>) -> CommandResult {
    match game.resolve_attack(id) {
        Ok(AttackOutcome::Continue(status)) => CommandResult::success(render_status(&status)),
        Ok(AttackOutcome::PhaseAdvanced(status)) => CommandResult::success(render_status(&status)),
        Ok(AttackOutcome::Victory(victory)) => CommandResult::success(render_victory(&victory)),
        Ok(AttackOutcome::Defeat(defeat)) => CommandResult::success(render_defeat(&defeat)),
        Err(e) => e.into(),
    }
}

fn cmd_flee<R: PlayerRepository>(id: &str, game: &mut Game<R>) -> CommandResult {
    match game.resolve_flee(id) {
        Ok(FleeResult::Escaped) => CommandResult::success("You got away."),
        Ok(FleeResult::Failed(status)) => {
            CommandResult::success(format!("You failed to escape!\n{}", render_status(&status)))
        }
        Ok(FleeResult::Died(defeat)) => CommandResult::success(render_defeat(&defeat)),
        Err(e) => e.into(),
    }
}

fn cmd_merchant<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        Some("buy") => match game.buy_from_merchant(id) {
            Ok(purchase) => CommandResult::success(format!(
                "Bought {} for {} gold ({} left)",
                purchase.item, purchase.price, purchase.gold_left
            )),
            Err(e) => e.into(),
        },
        Some("duel") => match game.duel_merchant(id) {
            Ok(status) => CommandResult::success(format!(
                "The merchant drops his pack and draws a blade.\n{}",
                render_status(&status)
            )),
            Err(e) => e.into(),
        },
        _ => CommandResult::error("Usage: /merchant buy|duel"),
    }
}

// =============================================================================
// Items
// =============================================================================

fn cmd_use<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    if args.is_empty() {
        return CommandResult::error("Usage: /use <item>");
    }
    match game.use_consumable(id, &args.join(" ")) {
        Ok(used) => {
            let mut msg = format!("Used {}.", used.item);
            if used.healed > 0 {
                msg.push_str(&format!(" Healed {}.", used.healed));
            }
            if let Some(effect) = used.cured {
                msg.push_str(&format!(" Cured {}.", effect.name()));
            }
            if used.max_hp_bonus > 0 {
                msg.push_str(&format!(" Max HP +{}.", used.max_hp_bonus));
            }
            if let Some(buff) = &used.buff {
                msg.push_str(&format!(" {} active for {} turns.", buff.name, buff.remaining_turns));
            }
            msg.push_str(&format!(" HP {}/{}, {} left", used.hp, used.max_hp, used.remaining));
            CommandResult::success(msg)
        }
        Err(e) => e.into(),
    }
}

fn cmd_equip<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    if args.len() < 2 {
        return CommandResult::error("Usage: /equip weapon|armor <item>");
    }
    let kind = match args[0].to_lowercase().as_str() {
        "weapon" => ItemKind::Weapon,
        "armor" => ItemKind::Armor,
        _ => return CommandResult::error("Usage: /equip weapon|armor <item>"),
    };
    match game.equip(id, &args[1..].join(" "), kind) {
        Ok(equipped) => CommandResult::success(format!(
            "Equipped {} (was {})",
            equipped.item, equipped.previous
        )),
        Err(e) => e.into(),
    }
}

fn cmd_rest<R: PlayerRepository>(id: &str, game: &mut Game<R>) -> CommandResult {
    match game.rest(id) {
        Ok(rest) if rest.healed == 0 => CommandResult::success("You are already at full health."),
        Ok(rest) => CommandResult::success(format!(
            "Rested and healed {}. HP {}/{}. Next rest in {}s",
            rest.healed, rest.hp, rest.max_hp, rest.next_cooldown_secs
        )),
        Err(e) => e.into(),
    }
}

/// User-facing positions are 1-based
fn parse_position(arg: Option<&&str>) -> Option<usize> {
    arg?.parse::<usize>().ok()?.checked_sub(1)
}

fn cmd_swap<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    let Some(index) = parse_position(args.first()) else {
        return CommandResult::error("Usage: /swap <n> [discard]");
    };
    let discard = (args.len() > 1).then(|| args[1..].join(" "));
    match game.resolve_pending_drop_swap(id, index, discard.as_deref()) {
        Ok(swap) => {
            let mut msg = format!("Took {}", swap.accepted);
            if let Some((item, quantity)) = swap.discarded {
                msg.push_str(&format!(", threw away {} x{}", item, quantity));
            }
            CommandResult::success(msg)
        }
        Err(e) => e.into(),
    }
}

fn cmd_dismiss<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    let Some(index) = parse_position(args.first()) else {
        return CommandResult::error("Usage: /dismiss <n>");
    };
    match game.dismiss_pending_drop(id, index) {
        Ok(dropped) => CommandResult::success(format!("Left {} behind", dropped.item_name)),
        Err(e) => e.into(),
    }
}

// =============================================================================
// Shop and Travel
// =============================================================================

fn cmd_buy<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    if args.len() < 2 {
        return CommandResult::error("Usage: /buy <potions|buffs|weapons|armors> <item>");
    }
    let Some(category) = ShopCategory::from_name(args[0]) else {
        return CommandResult::error(format!("Unknown shop category: {}", args[0]));
    };
    match game.buy(id, &args[1..].join(" "), category) {
        Ok(purchase) => CommandResult::success(format!(
            "Bought {} for {} gold ({} left)",
            purchase.item, purchase.price, purchase.gold_left
        )),
        Err(e) => e.into(),
    }
}

fn cmd_sell<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    if args.is_empty() {
        return CommandResult::error("Usage: /sell <item>");
    }
    match game.sell(id, &args.join(" ")) {
        Ok(sale) => CommandResult::success(format!(
            "Sold {} x{} for {} gold ({} total)",
            sale.item, sale.quantity, sale.gold_earned, sale.gold_total
        )),
        Err(e) => e.into(),
    }
}

fn cmd_map<R: PlayerRepository>(id: &str, args: &[&str], game: &mut Game<R>) -> CommandResult {
    let Some(map_id) = args.first() else {
        let mut msg = String::from("Maps:\n");
        for map in game.catalog().maps() {
            msg.push_str(&format!(
                "  {} - {} (level {}+)\n",
                map.id, map.name, map.recommended_level
            ));
        }
        return CommandResult::success(msg);
    };
    match game.change_map(id, map_id) {
        Ok(map) => CommandResult::success(format!("You travel to {}", map)),
        Err(e) => e.into(),
    }
}

fn cmd_offer<R: PlayerRepository>(game: &Game<R>) -> CommandResult {
    let text = match game.daily_offer() {
        DailyOffer::SellBonus { kind, percent } => {
            format!("Today the shop pays {}% more for {} items", percent, kind.name())
        }
        DailyOffer::BuyDiscount { category, percent } => {
            format!("Today {:?} are {}% off", category, percent)
        }
    };
    CommandResult::success(text)
}

// =============================================================================
// Rendering
// =============================================================================

fn target_name(target: Target) -> &'static str {
    match target {
        Target::Player => "You",
        Target::Monster => "The monster",
    }
}

fn render_effects(effects: &[StatusEffect]) -> String {
    effects.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ")
}

fn render_events(events: &[CombatEvent]) -> String {
    let mut msg = String::new();
    for event in events {
        let line = match event {
            CombatEvent::PlayerHit { damage, critical: true } => format!("Critical hit for {}!", damage),
            CombatEvent::PlayerHit { damage, .. } => format!("You hit for {}", damage),
            CombatEvent::MonsterHit { damage, critical: true } => {
                format!("The monster lands a critical blow for {}!", damage)
            }
            CombatEvent::MonsterHit { damage, .. } => format!("The monster hits you for {}", damage),
            CombatEvent::SpecialPower { name, damage } => format!("{} deals {}!", name, damage),
            CombatEvent::EffectApplied { target, effect } => {
                format!("{} suffer {}", target_name(*target), effect.name())
            }
            CombatEvent::StatusTick { target, effect, damage } => {
                format!("{} take {} from {}", target_name(*target), damage, effect.name())
            }
            CombatEvent::BuffExpired { name } => format!("{} wore off", name),
            CombatEvent::PhaseAdvanced { phase_name, .. } => format!("{} rises again!", phase_name),
            CombatEvent::PendingPoison => "The thorn poison takes hold".to_string(),
        };
        msg.push_str(&line);
        msg.push('\n');
    }
    msg
}

fn render_status(status: &CombatStatus) -> String {
    let mut msg = render_events(&status.events);
    msg.push_str(&format!(
        "Turn {}: {} HP {}/{} | You HP {}/{}",
        status.turn,
        status.monster.name,
        status.monster.hp,
        status.monster.max_hp,
        status.player_hp,
        status.player_max_hp
    ));
    if !status.player_effects.is_empty() {
        msg.push_str(&format!(" | You: {}", render_effects(&status.player_effects)));
    }
    if !status.monster_effects.is_empty() {
        msg.push_str(&format!(" | Monster: {}", render_effects(&status.monster_effects)));
    }
    msg
}

fn render_drops(drops: &[DropOutcome]) -> String {
    let mut msg = String::new();
    for drop in drops {
        let line = match drop {
            DropOutcome::Acquired { item, level_warning: Some(level), .. } => {
                format!("Got {} (needs level {} to equip)", item, level)
            }
            DropOutcome::Acquired { item, .. } => format!("Got {}", item),
            DropOutcome::AlreadyOwned { item } => format!("Found another {}, you already have one", item),
            DropOutcome::Queued { item, .. } => format!("Backpack full, {} is waiting (/swap)", item),
            DropOutcome::Evicted { item } => format!("No room to carry {}, it was left behind", item),
        };
        msg.push_str(&line);
        msg.push('\n');
    }
    msg
}

fn render_victory(victory: &VictoryResult) -> String {
    let mut msg = render_events(&victory.events);
    msg.push_str(&format!(
        "You defeated {}! +{} XP, +{} gold\n",
        victory.monster_name, victory.xp_gained, victory.gold_gained
    ));
    msg.push_str(&render_drops(&victory.drops));
    if let Some(tier) = victory.backpack_upgrade {
        msg.push_str(&format!("Your pack grows: {} ({} slots)\n", tier.name(), tier.slots()));
    }
    for level in &victory.levels_gained {
        msg.push_str(&format!("Level up! You are now level {}\n", level));
    }
    if let Some(map) = &victory.boss_defeated {
        msg.push_str(&format!("The guardian of {} has fallen\n", map));
    }
    if let Some(map) = &victory.unlocked_map {
        msg.push_str(&format!("New map unlocked: {}\n", map));
    }
    msg.trim_end().to_string()
}

fn render_defeat(defeat: &DefeatResult) -> String {
    let mut msg = render_events(&defeat.events);
    msg.push_str(&format!(
        "You were slain by {}. Lost {} XP and {} gold ({}%). You wake with {} HP.",
        defeat.monster_name, defeat.xp_lost, defeat.gold_lost, defeat.penalty_percent, defeat.hp_after
    ));
    msg
}

fn render_encounter(event: &EncounterEvent) -> String {
    match event {
        EncounterEvent::Merchant => {
            "A wandering merchant offers a cheap potion. /merchant buy or /merchant duel".to_string()
        }
        EncounterEvent::Campfire { healed } => format!("You rest by an old campfire and recover {} HP", healed),
        EncounterEvent::LostPurse { gold } => format!("You find a lost purse with {} gold", gold),
        EncounterEvent::FoundPotion { drops } => {
            format!("Something glints in the grass.\n{}", render_drops(drops).trim_end())
        }
        EncounterEvent::FoundGold { gold } => format!("You find {} gold on the path", gold),
        EncounterEvent::PoisonThorns => "Poisoned thorns scratch you. It will hurt in your next fight".to_string(),
        EncounterEvent::Nothing => "The woods are quiet. /continue to keep hunting".to_string(),
    }
}
