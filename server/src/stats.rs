//! Derived combat stats.
//!
//! Pure functions of the player's class, level, gear and buffs. The only
//! inputs besides the player record are the catalog (for gear stats) and an
//! injected RNG for the rolls.

use std::ops::RangeInclusive;

use rand::Rng;
use rpg_shared::{BuffKind, Catalog, CharacterClass, MonsterState, PlayerState};

use crate::random::chance;

/// Base roll added to every player attack
pub const PLAYER_DAMAGE_RANGE: RangeInclusive<i64> = 2..=5;

/// Base roll added to every monster attack
pub const MONSTER_DAMAGE_RANGE: RangeInclusive<i64> = 1..=4;

pub const PLAYER_DEFENSE_MULTIPLIER: f64 = 0.85;

/// Defense never loses more than this share of its value to monster level
pub const MIN_DEFENSE_EFFICIENCY: f64 = 0.45;

pub const DEFENSE_EFFICIENCY_LOSS_PER_LEVEL: f64 = 0.02;

/// Random amount shaved off mitigation on each hit
pub const DEFENSE_JITTER: RangeInclusive<i64> = 0..=3;

/// The outcome of one damage roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    pub damage: i64,
    pub critical: bool,
}

// =============================================================================
// Class Stats
// =============================================================================

pub fn class_damage_bonus(class: CharacterClass, level: u32) -> i64 {
    class.profile().damage_bonus_at(level)
}

pub fn class_crit_chance(class: CharacterClass, level: u32) -> f64 {
    (class.profile().crit_chance)(level)
}

pub fn class_defense_bonus(class: CharacterClass, level: u32) -> i64 {
    (class.profile().defense_bonus)(level)
}

pub fn class_damage_multiplier(class: CharacterClass, level: u32) -> f64 {
    (class.profile().damage_multiplier)(level)
}

// =============================================================================
// Gear
// =============================================================================

pub fn weapon_damage(catalog: &Catalog, player: &PlayerState) -> i64 {
    catalog
        .weapon(&player.equipped_weapon)
        .map(|w| w.damage)
        .unwrap_or(0)
}

pub fn armor_defense(catalog: &Catalog, player: &PlayerState) -> i64 {
    catalog
        .armor(&player.equipped_armor)
        .map(|a| a.defense)
        .unwrap_or(0)
}

// =============================================================================
// Player Attack
// =============================================================================

/// Damage before the random roll and crit
pub fn attack_power(catalog: &Catalog, player: &PlayerState) -> i64 {
    weapon_damage(catalog, player)
        + class_damage_bonus(player.class, player.level)
        + player.buff_total(BuffKind::Damage)
}

/// Roll one player attack, with crit
pub fn roll_player_attack<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &PlayerState,
) -> DamageRoll {
    let base = rng.gen_range(PLAYER_DAMAGE_RANGE) + attack_power(catalog, player);
    let multiplier = class_damage_multiplier(player.class, player.level);
    let mut damage = (base as f64 * multiplier).round().max(0.0) as i64;

    let critical = chance(rng, class_crit_chance(player.class, player.level));
    if critical {
        damage += damage;
    }

    DamageRoll { damage, critical }
}

// =============================================================================
// Monster Attack
// =============================================================================

/// `(armor + class defense + defense buffs) * 0.85`
pub fn effective_defense(catalog: &Catalog, player: &PlayerState) -> f64 {
    let raw = armor_defense(catalog, player)
        + class_defense_bonus(player.class, player.level)
        + player.buff_total(BuffKind::Defense);
    raw as f64 * PLAYER_DEFENSE_MULTIPLIER
}

/// Share of defense that still works against a monster of this level
pub fn defense_efficiency(monster_level: u32) -> f64 {
    (1.0 - monster_level as f64 * DEFENSE_EFFICIENCY_LOSS_PER_LEVEL).max(MIN_DEFENSE_EFFICIENCY)
}

/// Damage absorbed by defense on one hit
pub fn mitigated_defense<R: Rng + ?Sized>(rng: &mut R, defense: f64, monster_level: u32) -> i64 {
    let mitigated = (defense * defense_efficiency(monster_level)).round() as i64;
    (mitigated - rng.gen_range(DEFENSE_JITTER)).max(0)
}

/// Monster ATK multiplier, stepping up at levels 5 and 10
pub fn atk_multiplier(monster_level: u32) -> f64 {
    match monster_level {
        0..=4 => 0.75,
        5..=9 => 0.90,
        _ => 1.05,
    }
}

/// Smallest damage a monster of this level deals per hit
pub fn damage_floor(monster_level: u32) -> i64 {
    match monster_level {
        0..=1 => 2,
        2..=4 => 3,
        5..=7 => 5,
        8..=9 => 7,
        10..=14 => 9,
        15..=17 => 12,
        _ => 15,
    }
}

/// Roll one monster hit against a player with the given effective defense.
///
/// Boss crits replace the rolled damage with the phase's crit damage.
pub fn roll_monster_attack<R: Rng + ?Sized>(
    rng: &mut R,
    monster: &MonsterState,
    player_level: u32,
    defense: f64,
) -> DamageRoll {
    let level = monster.level;
    let level_scale = 1.0 + 0.06 * level.saturating_sub(3) as f64;
    let pressure_scale = 1.0 + 0.05 * level.saturating_sub(player_level) as f64;

    let base = rng.gen_range(MONSTER_DAMAGE_RANGE) as f64;
    let attack = monster.atk as f64 * atk_multiplier(level) * level_scale * pressure_scale;
    let mitigated = mitigated_defense(rng, defense, level) as f64;

    let mut damage = (base + attack - mitigated).round() as i64;
    let floor = damage_floor(level);
    if damage <= floor {
        damage = floor + rng.gen_range(0..=1);
    }

    if let Some((crit_chance, crit_damage)) = monster.boss_crit() {
        if chance(rng, crit_chance) {
            return DamageRoll { damage: crit_damage, critical: true };
        }
    }

    DamageRoll { damage, critical: false }
}
