//! Monster instantiation from templates and boss definitions.

use rpg_shared::{BossProgress, MapDef, MapScaling, MonsterState, MonsterTemplate};

/// HP added per level the player is above the template
const HP_PER_LEVEL_GAP: i64 = 10;

/// ATK added per level the player is above the template
const ATK_PER_LEVEL_GAP: i64 = 2;

/// Merchant duel stats
pub const MERCHANT_NAME: &str = "Wandering Merchant";
const MERCHANT_HP: i64 = 800;
const MERCHANT_ATK: i64 = 90;
const MERCHANT_LEVEL: u32 = 20;

/// Scale a regular monster to the player's level and the map
pub fn scale_monster(template: &MonsterTemplate, scaling: &MapScaling, player_level: u32) -> MonsterState {
    let level_gap = player_level as i64 - template.level as i64;
    let hp = scale(template.hp + level_gap * HP_PER_LEVEL_GAP, scaling.hp);
    let atk = scale(template.atk + level_gap * ATK_PER_LEVEL_GAP, scaling.atk);
    let gold_reward = (template.gold_reward as f64 * scaling.gold).floor().max(1.0) as u64;

    MonsterState {
        name: template.name.clone(),
        hp,
        max_hp: hp,
        atk,
        level: template.level,
        xp_reward: template.xp_reward,
        gold_reward,
        drop_table: template.drop_table.clone(),
        innate_effects: template.innate_effects.clone(),
        boss: None,
    }
}

/// Truncates, with a floor of 1
fn scale(value: i64, multiplier: f64) -> i64 {
    ((value as f64 * multiplier).floor() as i64).max(1)
}

/// First phase of a map's boss
pub fn boss_monster(map: &MapDef) -> Option<MonsterState> {
    MonsterState::from_boss(BossProgress {
        map_id: map.id.clone(),
        boss_name: map.boss.name.clone(),
        phase_index: 0,
        phases: map.boss.phases.clone(),
    })
}

/// The merchant fights back hard and pays nothing
pub fn merchant_duelist() -> MonsterState {
    MonsterState {
        name: MERCHANT_NAME.into(),
        hp: MERCHANT_HP,
        max_hp: MERCHANT_HP,
        atk: MERCHANT_ATK,
        level: MERCHANT_LEVEL,
        xp_reward: 0,
        gold_reward: 0,
        drop_table: Vec::new(),
        innate_effects: Vec::new(),
        boss: None,
    }
}
