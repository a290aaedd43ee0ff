//! Turn-based combat resolution.
//!
//! A fight lives on the player record: `active_monster` plus the turn
//! counter, status timers and buffs. Every function here mutates the record
//! it is given; callers work on a copy and only keep it when the action
//! succeeds.
//!
//! One `resolve_attack` turn runs in a fixed order:
//! 1. roll the player's hit and tick buffs
//! 2. maybe put the weapon's effect on the monster
//! 3. damage the monster, then tick its status timers
//! 4. on a kill, advance the boss phase or resolve the victory
//! 5. otherwise the monster retaliates and the player's timers tick
//! 6. on player death resolve the defeat, else move to the next turn

pub mod spawn;

pub use spawn::select_monster;

use log::{debug, info};
use rand::Rng;
use rpg_shared::{
    tick_status_timers, AttackOutcome, Catalog, CombatEvent, CombatStatus, FleeResult, GameError,
    MonsterState, PlayerState, StatusEffect, Target, VictoryResult,
};

use crate::loot;
use crate::progression;
use crate::random::chance;
use crate::stats::{effective_defense, roll_monster_attack, roll_player_attack};

/// Chance that a weapon's effect lands on a hit
pub const WEAPON_EFFECT_CHANCE: f64 = 0.3;

/// Chance per innate effect that a monster's hit applies it
pub const INNATE_EFFECT_CHANCE: f64 = 0.2;

pub const FLEE_CHANCE: f64 = 0.5;

/// Gold rewards are multiplied by this and floored
pub const MONSTER_GOLD_MULTIPLIER: f64 = 1.55;

// =============================================================================
// Status
// =============================================================================

fn snapshot(player: &PlayerState, monster: &MonsterState, events: Vec<CombatEvent>) -> CombatStatus {
    CombatStatus {
        monster: monster.clone(),
        player_hp: player.hp,
        player_max_hp: player.max_hp,
        turn: player.combat_turn,
        player_effects: player.player_status_effects.keys().copied().collect(),
        monster_effects: player.monster_status_effects.keys().copied().collect(),
        events,
    }
}

/// The current fight, without changing anything
pub fn current_status(player: &PlayerState) -> Result<CombatStatus, GameError> {
    let monster = player.active_monster.as_ref().ok_or(GameError::NoActiveCombat)?;
    Ok(snapshot(player, monster, Vec::new()))
}

/// Enter combat with `monster`. Any queued poison takes hold now.
pub fn start_combat(player: &mut PlayerState, monster: MonsterState) -> CombatStatus {
    player.clear_combat();
    player.combat_turn = 1;
    player.merchant_offer = false;
    player.last_monster_name = Some(monster.name.clone());

    let mut events = Vec::new();
    if std::mem::take(&mut player.pending_poison) {
        player
            .player_status_effects
            .insert(StatusEffect::Poison, StatusEffect::Poison.timer());
        events.push(CombatEvent::PendingPoison);
    }

    debug!("Player {} engages {} (hp {})", player.id, monster.name, monster.hp);
    let status = snapshot(player, &monster, events);
    player.active_monster = Some(monster);
    status
}

// =============================================================================
// Attack
// =============================================================================

/// Resolve one attack turn
pub fn resolve_attack<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
) -> Result<AttackOutcome, GameError> {
    let mut monster = player.active_monster.take().ok_or(GameError::NoActiveCombat)?;
    let mut events = Vec::new();

    // Defense for this turn's retaliation includes buffs that expire below
    let defense = effective_defense(catalog, player);
    let hit = roll_player_attack(rng, catalog, player);
    tick_buffs(player, &mut events);

    if let Some(effect) = catalog.weapon(&player.equipped_weapon).and_then(|w| w.effect) {
        if !player.monster_status_effects.contains_key(&effect) && chance(rng, WEAPON_EFFECT_CHANCE) {
            player.monster_status_effects.insert(effect, effect.timer());
            events.push(CombatEvent::EffectApplied { target: Target::Monster, effect });
        }
    }

    monster.hp -= hit.damage;
    events.push(CombatEvent::PlayerHit { damage: hit.damage, critical: hit.critical });

    if !monster.is_dead() {
        for (effect, damage) in tick_status_timers(&mut player.monster_status_effects) {
            monster.hp -= damage;
            events.push(CombatEvent::StatusTick { target: Target::Monster, effect, damage });
        }
    }

    debug!(
        "Player {} turn {}: dealt {}{}, {} hp {}",
        player.id,
        player.combat_turn,
        hit.damage,
        if hit.critical { " (crit)" } else { "" },
        monster.name,
        monster.hp
    );

    if monster.is_dead() {
        if let Some(next) = monster.next_boss_phase() {
            return Ok(AttackOutcome::PhaseAdvanced(advance_phase(player, next, events)));
        }
        return Ok(AttackOutcome::Victory(resolve_victory(rng, catalog, player, monster, events)));
    }

    monster_retaliation(rng, player, &monster, defense, &mut events);

    if player.is_dead() {
        let result = progression::apply_defeat(rng, player, &monster.name, events);
        return Ok(AttackOutcome::Defeat(result));
    }

    player.combat_turn += 1;
    let status = snapshot(player, &monster, events);
    player.active_monster = Some(monster);
    Ok(AttackOutcome::Continue(status))
}

/// Count buffs down one turn and drop the spent ones
fn tick_buffs(player: &mut PlayerState, events: &mut Vec<CombatEvent>) {
    for buff in player.active_buffs.iter_mut() {
        buff.remaining_turns = buff.remaining_turns.saturating_sub(1);
        if buff.remaining_turns == 0 {
            events.push(CombatEvent::BuffExpired { name: buff.name.clone() });
        }
    }
    player.active_buffs.retain(|b| b.remaining_turns > 0);
}

fn apply_player_effect(player: &mut PlayerState, effect: StatusEffect, events: &mut Vec<CombatEvent>) {
    if player.player_status_effects.contains_key(&effect) {
        return;
    }
    player.player_status_effects.insert(effect, effect.timer());
    events.push(CombatEvent::EffectApplied { target: Target::Player, effect });
}

/// The monster's side of a turn: hits, special power, innate effects, then
/// the player's own status ticks
fn monster_retaliation<R: Rng + ?Sized>(
    rng: &mut R,
    player: &mut PlayerState,
    monster: &MonsterState,
    defense: f64,
    events: &mut Vec<CombatEvent>,
) {
    let hits = if monster.double_attack() { 2 } else { 1 };
    for _ in 0..hits {
        let roll = roll_monster_attack(rng, monster, player.level, defense);
        let taken = player.take_damage(roll.damage);
        events.push(CombatEvent::MonsterHit { damage: taken, critical: roll.critical });
    }

    if let Some(power) = monster.special_power() {
        if chance(rng, power.trigger_chance) {
            let taken = player.take_damage(power.bonus_damage);
            events.push(CombatEvent::SpecialPower { name: power.name.clone(), damage: taken });
            if let Some(effect) = power.effect {
                if chance(rng, power.effect_chance) {
                    apply_player_effect(player, effect, events);
                }
            }
        }
    }

    for &effect in &monster.innate_effects {
        if chance(rng, INNATE_EFFECT_CHANCE) {
            apply_player_effect(player, effect, events);
        }
    }

    for (effect, damage) in tick_status_timers(&mut player.player_status_effects) {
        let taken = player.take_damage(damage);
        events.push(CombatEvent::StatusTick { target: Target::Player, effect, damage: taken });
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Swap in the next boss phase. No rewards; the turn counter is kept.
fn advance_phase(player: &mut PlayerState, next: MonsterState, mut events: Vec<CombatEvent>) -> CombatStatus {
    let phase_index = next.boss.as_ref().map(|b| b.phase_index).unwrap_or(0);
    info!("Player {} pushed the boss into phase {}: {}", player.id, phase_index + 1, next.name);

    player.player_status_effects.clear();
    player.monster_status_effects.clear();
    events.push(CombatEvent::PhaseAdvanced { phase_name: next.name.clone(), phase_index });

    let status = snapshot(player, &next, events);
    player.active_monster = Some(next);
    status
}

fn resolve_victory<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
    monster: MonsterState,
    events: Vec<CombatEvent>,
) -> VictoryResult {
    let gold_gained = (monster.gold_reward as f64 * MONSTER_GOLD_MULTIPLIER).floor() as u64;
    player.gold += gold_gained;

    let mut drops = loot::roll_drop_table(rng, catalog, player, &monster.drop_table);
    let mut backpack_upgrade = None;
    if monster.grants_rewards() {
        drops.extend(loot::roll_bonus_drops(rng, catalog, player, monster.level));
        backpack_upgrade = loot::roll_backpack_upgrade(rng, player, monster.level);
    }

    let levels_gained = progression::grant_xp(player, monster.xp_reward);

    let mut boss_defeated = None;
    let mut unlocked_map = None;
    if let Some(progress) = &monster.boss {
        player.boss_defeated.insert(progress.map_id.clone(), true);
        boss_defeated = Some(progress.map_id.clone());
        if let Some(next_map) = catalog.map(&progress.map_id).and_then(|m| m.next_map.clone()) {
            if player.unlocked_map_ids.insert(next_map.clone()) {
                unlocked_map = Some(next_map);
            }
        }
        info!("Player {} defeated {} on {}", player.id, progress.boss_name, progress.map_id);
    }

    player.clear_combat();

    VictoryResult {
        monster_name: monster.name,
        xp_gained: monster.xp_reward,
        gold_gained,
        drops,
        backpack_upgrade,
        levels_gained,
        boss_defeated,
        unlocked_map,
        events,
    }
}

// =============================================================================
// Flee
// =============================================================================

/// Try to run. A failed attempt gives the monster a free retaliation.
pub fn resolve_flee<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
) -> Result<FleeResult, GameError> {
    let monster = player.active_monster.take().ok_or(GameError::NoActiveCombat)?;

    if chance(rng, FLEE_CHANCE) {
        debug!("Player {} escaped from {}", player.id, monster.name);
        player.clear_combat();
        return Ok(FleeResult::Escaped);
    }

    let mut events = Vec::new();
    let defense = effective_defense(catalog, player);
    monster_retaliation(rng, player, &monster, defense, &mut events);

    if player.is_dead() {
        return Ok(FleeResult::Died(progression::apply_flee_death(player, &monster.name, events)));
    }

    let status = snapshot(player, &monster, events);
    player.active_monster = Some(monster);
    Ok(FleeResult::Failed(status))
}
