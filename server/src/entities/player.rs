//! Player lifecycle and the actions a player takes outside the combat turn.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use rpg_shared::{
    ActiveBuff, Catalog, CharacterClass, ConsumableEffect, EquipResult, GameError, ItemKind,
    PlayerState, RestResult, UseItemResult, HP_BASE, MAX_NAME_LEN, STARTING_ARMOR, STARTING_MAP,
};

/// Share of max HP restored by one rest
pub const REST_HEAL_PERCENT: i64 = 30;

/// Rest cooldown stops doubling after this many consecutive rests
pub const MAX_REST_DOUBLINGS: u32 = 6;

/// A rest streak ends after this long without resting
pub const REST_STREAK_RESET: Duration = Duration::from_secs(60 * 60);

/// Fresh hardcore character: no gold, no XP, starting gear only
pub fn new_player(id: &str, class: CharacterClass, now: DateTime<Utc>) -> PlayerState {
    let profile = class.profile();
    let max_hp = HP_BASE + profile.hp_bonus;

    PlayerState {
        id: id.to_string(),
        name: None,
        class,
        level: 1,
        xp: 0,
        hp: max_hp,
        max_hp,
        gold: 0,
        equipped_weapon: profile.starting_weapon.to_string(),
        equipped_armor: STARTING_ARMOR.to_string(),
        owned_weapons: [profile.starting_weapon.to_string()].into(),
        owned_armors: [STARTING_ARMOR.to_string()].into(),
        current_map_id: STARTING_MAP.to_string(),
        unlocked_map_ids: [STARTING_MAP.to_string()].into(),
        created_at: now,
        ..Default::default()
    }
}

/// Name the character. Names are set once.
pub fn set_name(player: &mut PlayerState, name: &str) -> Result<String, GameError> {
    if let Some(existing) = &player.name {
        return Err(GameError::NameAlreadySet(existing.clone()));
    }

    let name = name.trim();
    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_LEN {
        return Err(GameError::InvalidName(format!(
            "names must be 1 to {} characters",
            MAX_NAME_LEN
        )));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(GameError::InvalidName("names cannot contain control characters".into()));
    }

    player.name = Some(name.to_string());
    Ok(name.to_string())
}

// =============================================================================
// Items
// =============================================================================

/// Drink or apply one unit of a consumable. Works in and out of combat.
pub fn use_consumable(
    catalog: &Catalog,
    player: &mut PlayerState,
    item: &str,
) -> Result<UseItemResult, GameError> {
    let Some(def) = catalog.consumable(item) else {
        return Err(match catalog.item_kind(item) {
            Some(_) => GameError::NotUsable(item.to_string()),
            None => GameError::UnknownItem(item.to_string()),
        });
    };
    if player.item_quantity(item) == 0 {
        return Err(GameError::ItemNotOwned(item.to_string()));
    }

    let mut healed = 0;
    let mut cured = None;
    let mut max_hp_bonus = 0;
    let mut buff = None;

    match &def.effect {
        ConsumableEffect::Heal(amount) => {
            healed = player.heal(*amount);
        }
        ConsumableEffect::HealAndCure { heal, cures } => {
            healed = player.heal(*heal);
            if player.player_status_effects.remove(cures).is_some() {
                cured = Some(*cures);
            }
        }
        ConsumableEffect::HealAndBoost { heal, max_hp_bonus: bonus } => {
            player.max_hp += bonus;
            max_hp_bonus = *bonus;
            healed = player.heal(*heal);
        }
        ConsumableEffect::Buff { kind, magnitude, turns } => {
            let active = ActiveBuff {
                name: def.name.clone(),
                kind: *kind,
                magnitude: *magnitude,
                remaining_turns: *turns,
            };
            // Drinking the same elixir again refreshes it instead of stacking
            player.active_buffs.retain(|b| b.name != def.name);
            player.active_buffs.push(active.clone());
            buff = Some(active);
        }
    }

    player.remove_item(item, 1);

    Ok(UseItemResult {
        item: item.to_string(),
        healed,
        cured,
        max_hp_bonus,
        buff,
        hp: player.hp,
        max_hp: player.max_hp,
        remaining: player.item_quantity(item),
    })
}

/// Equip an owned weapon or armor
pub fn equip(
    catalog: &Catalog,
    player: &mut PlayerState,
    item: &str,
    kind: ItemKind,
) -> Result<EquipResult, GameError> {
    let (level_req, owned) = match kind {
        ItemKind::Weapon => {
            let def = catalog.weapon(item).ok_or_else(|| GameError::UnknownItem(item.to_string()))?;
            (def.level_req, player.owned_weapons.contains(item))
        }
        ItemKind::Armor => {
            let def = catalog.armor(item).ok_or_else(|| GameError::UnknownItem(item.to_string()))?;
            (def.level_req, player.owned_armors.contains(item))
        }
        ItemKind::Consumable | ItemKind::Misc => return Err(GameError::NotUsable(item.to_string())),
    };

    if !owned {
        return Err(GameError::ItemNotOwned(item.to_string()));
    }
    if player.level < level_req {
        return Err(GameError::LevelTooLow {
            required: level_req,
            current: player.level,
        });
    }

    let slot = match kind {
        ItemKind::Weapon => &mut player.equipped_weapon,
        _ => &mut player.equipped_armor,
    };
    let previous = std::mem::replace(slot, item.to_string());

    Ok(EquipResult {
        item: item.to_string(),
        kind,
        previous,
    })
}

// =============================================================================
// Cooldowns
// =============================================================================

/// Time left before `cooldown` has passed since `last`, if any
pub fn cooldown_remaining(
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<Duration> {
    let last = last?;
    let elapsed = now.signed_duration_since(last).to_std().unwrap_or(Duration::ZERO);
    cooldown.checked_sub(elapsed).filter(|left| !left.is_zero())
}

/// Whole seconds, rounded up, for error reporting
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// `base * 2^min(rest_count, 6)`
pub fn rest_cooldown(base: Duration, rest_count: u32) -> Duration {
    base * 2u32.pow(rest_count.min(MAX_REST_DOUBLINGS))
}

/// Heal 30% of max HP. Each consecutive rest doubles the wait for the next.
pub fn rest(
    player: &mut PlayerState,
    now: DateTime<Utc>,
    base_cooldown: Duration,
) -> Result<RestResult, GameError> {
    if let Some(monster) = &player.active_monster {
        return Err(GameError::AlreadyInCombat { monster: monster.name.clone() });
    }

    let mut rest_count = player.rest_count;
    if cooldown_remaining(player.last_rest_at, now, REST_STREAK_RESET).is_none() {
        rest_count = 0;
    }

    if player.hp >= player.max_hp {
        return Ok(RestResult {
            healed: 0,
            hp: player.hp,
            max_hp: player.max_hp,
            next_cooldown_secs: 0,
        });
    }

    if let Some(left) = cooldown_remaining(player.last_rest_at, now, rest_cooldown(base_cooldown, rest_count)) {
        return Err(GameError::CooldownActive {
            action: "rest".into(),
            remaining_secs: ceil_secs(left),
        });
    }

    let amount = (player.max_hp * REST_HEAL_PERCENT + 99) / 100;
    let healed = player.heal(amount);
    player.rest_count = rest_count + 1;
    player.last_rest_at = Some(now);

    Ok(RestResult {
        healed,
        hp: player.hp,
        max_hp: player.max_hp,
        next_cooldown_secs: rest_cooldown(base_cooldown, player.rest_count).as_secs(),
    })
}

// =============================================================================
// Maps
// =============================================================================

/// Travel to an unlocked map
pub fn change_map(catalog: &Catalog, player: &mut PlayerState, map_id: &str) -> Result<String, GameError> {
    if let Some(monster) = &player.active_monster {
        return Err(GameError::AlreadyInCombat { monster: monster.name.clone() });
    }
    let map = catalog
        .map(map_id)
        .ok_or_else(|| GameError::UnknownMap(map_id.to_string()))?;
    if !player.unlocked_map_ids.contains(&map.id) {
        return Err(GameError::MapLocked(map.id.clone()));
    }

    player.current_map_id = map.id.clone();
    info!("Player {} travelled to {}", player.id, map.name);
    Ok(map.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use rpg_shared::StatusEffect;

    const BASE: Duration = Duration::from_secs(120);

    fn mage() -> PlayerState {
        new_player("m", CharacterClass::Mage, Utc::now())
    }

    #[test]
    fn test_new_player_is_hardcore() {
        let p = new_player("42", CharacterClass::Warrior, Utc::now());
        assert_eq!((p.level, p.xp, p.gold), (1, 0, 0));
        assert_eq!((p.hp, p.max_hp), (90, 90));
        assert_eq!(p.equipped_weapon, "Wooden Sword");
        assert_eq!(p.equipped_armor, "Old Clothes");
        assert!(p.owned_weapons.contains("Wooden Sword"));
        assert!(p.inventory.is_empty());
        assert_eq!(p.current_map_id, "forest");
        assert!(p.unlocked_map_ids.contains("forest"));
        assert!(!p.in_combat());
    }

    #[test]
    fn test_set_name_once() {
        let mut p = mage();
        assert_eq!(set_name(&mut p, "  Merlin  ").unwrap(), "Merlin");
        assert_eq!(set_name(&mut p, "Other"), Err(GameError::NameAlreadySet("Merlin".into())));
    }

    #[test]
    fn test_set_name_validation() {
        let mut p = mage();
        assert!(matches!(set_name(&mut p, "   "), Err(GameError::InvalidName(_))));
        assert!(matches!(set_name(&mut p, &"x".repeat(25)), Err(GameError::InvalidName(_))));
        assert!(set_name(&mut p, &"x".repeat(24)).is_ok());
    }

    #[test]
    fn test_use_potion() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        p.hp = 10;
        p.add_item_to_inventory("Small Potion", 2);

        let result = use_consumable(&catalog, &mut p, "Small Potion").unwrap();
        assert_eq!(result.healed, 20);
        assert_eq!(p.hp, 30);
        assert_eq!(result.remaining, 1);
    }

    #[test]
    fn test_use_item_errors() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        assert_eq!(
            use_consumable(&catalog, &mut p, "Small Potion"),
            Err(GameError::ItemNotOwned("Small Potion".into()))
        );
        assert_eq!(
            use_consumable(&catalog, &mut p, "Bone"),
            Err(GameError::NotUsable("Bone".into()))
        );
        assert_eq!(
            use_consumable(&catalog, &mut p, "Ambrosia"),
            Err(GameError::UnknownItem("Ambrosia".into()))
        );
    }

    #[test]
    fn test_antidote_cures_poison() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        p.hp = 20;
        p.player_status_effects.insert(StatusEffect::Poison, StatusEffect::Poison.timer());
        p.add_item_to_inventory("Antidote", 1);

        let result = use_consumable(&catalog, &mut p, "Antidote").unwrap();
        assert_eq!(result.cured, Some(StatusEffect::Poison));
        assert!(p.player_status_effects.is_empty());
        assert!(!p.inventory.contains_key("Antidote"));
    }

    #[test]
    fn test_extra_life_raises_max_hp() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        let max_before = p.max_hp;
        p.add_item_to_inventory("Extra Life Potion", 1);
        let result = use_consumable(&catalog, &mut p, "Extra Life Potion").unwrap();
        assert_eq!(result.max_hp_bonus, 5);
        assert_eq!(p.max_hp, max_before + 5);
        assert!(p.hp <= p.max_hp);
    }

    #[test]
    fn test_elixir_refreshes_instead_of_stacking() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        p.add_item_to_inventory("Strength Elixir", 2);
        use_consumable(&catalog, &mut p, "Strength Elixir").unwrap();
        p.active_buffs[0].remaining_turns = 1;
        use_consumable(&catalog, &mut p, "Strength Elixir").unwrap();

        assert_eq!(p.active_buffs.len(), 1);
        assert_eq!(p.active_buffs[0].remaining_turns, 3);
    }

    #[test]
    fn test_equip_rules() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        assert_eq!(
            equip(&catalog, &mut p, "Longsword", ItemKind::Weapon),
            Err(GameError::ItemNotOwned("Longsword".into()))
        );

        p.owned_weapons.insert("Longsword".into());
        assert_eq!(
            equip(&catalog, &mut p, "Longsword", ItemKind::Weapon),
            Err(GameError::LevelTooLow { required: 3, current: 1 })
        );
        assert_eq!(p.equipped_weapon, "Enchanted Twig");

        p.level = 3;
        let result = equip(&catalog, &mut p, "Longsword", ItemKind::Weapon).unwrap();
        assert_eq!(result.previous, "Enchanted Twig");
        assert_eq!(p.equipped_weapon, "Longsword");

        assert_eq!(
            equip(&catalog, &mut p, "Longsword", ItemKind::Armor),
            Err(GameError::UnknownItem("Longsword".into()))
        );
    }

    #[test]
    fn test_rest_heals_and_doubles_cooldown() {
        let mut p = mage();
        let now = Utc::now();
        p.hp = 1;

        let first = rest(&mut p, now, BASE).unwrap();
        assert_eq!(first.healed, 20); // ceil(65 * 0.3)
        assert_eq!(first.next_cooldown_secs, 240);

        let too_soon = rest(&mut p, now + ChronoDuration::seconds(100), BASE);
        assert_eq!(
            too_soon,
            Err(GameError::CooldownActive { action: "rest".into(), remaining_secs: 140 })
        );

        let second = rest(&mut p, now + ChronoDuration::seconds(240), BASE).unwrap();
        assert_eq!(second.next_cooldown_secs, 480);
        assert_eq!(p.rest_count, 2);
    }

    #[test]
    fn test_rest_streak_resets_after_an_hour() {
        let mut p = mage();
        let now = Utc::now();
        p.hp = 1;
        p.rest_count = 5;
        p.last_rest_at = Some(now - ChronoDuration::minutes(61));

        rest(&mut p, now, BASE).unwrap();
        assert_eq!(p.rest_count, 1);
    }

    #[test]
    fn test_rest_at_full_hp_changes_nothing() {
        let mut p = mage();
        let before = p.clone();
        let result = rest(&mut p, Utc::now(), BASE).unwrap();
        assert_eq!(result.healed, 0);
        assert_eq!(p, before);
    }

    #[test]
    fn test_rest_cooldown_caps() {
        assert_eq!(rest_cooldown(BASE, 0), BASE);
        assert_eq!(rest_cooldown(BASE, 6), BASE * 64);
        assert_eq!(rest_cooldown(BASE, 20), BASE * 64);
    }

    #[test]
    fn test_change_map() {
        let catalog = Catalog::builtin();
        let mut p = mage();
        assert_eq!(change_map(&catalog, &mut p, "caves"), Err(GameError::MapLocked("caves".into())));
        assert_eq!(change_map(&catalog, &mut p, "moon"), Err(GameError::UnknownMap("moon".into())));

        p.unlocked_map_ids.insert("caves".into());
        assert_eq!(change_map(&catalog, &mut p, "caves").unwrap(), "caves");
        assert_eq!(p.current_map_id, "caves");
    }
}
