//! XP, level-ups and death penalties.

use std::ops::RangeInclusive;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use rpg_shared::{CombatEvent, DefeatResult, PlayerState, HP_PER_LEVEL, XP_BASE};

/// Share of XP and gold lost on a regular defeat, in percent
pub const DEATH_PENALTY_PERCENT: RangeInclusive<u32> = 10..=35;

/// Share of XP and gold lost when dying during a failed escape
pub const FLEE_DEATH_PENALTY_PERCENT: u32 = 50;

/// XP needed to go from `level` to `level + 1`
pub fn xp_needed(level: u32) -> u64 {
    XP_BASE * level.max(1) as u64 * 2
}

/// Cumulative XP across all previous levels plus current progress
pub fn total_xp(level: u32, xp: u64) -> u64 {
    (1..level.max(1)).map(xp_needed).sum::<u64>() + xp
}

/// Grant XP and run the level-up loop. Returns every level reached.
pub fn grant_xp(player: &mut PlayerState, amount: u64) -> Vec<u32> {
    player.xp += amount;
    let mut levels = Vec::new();

    while player.xp >= xp_needed(player.level) {
        player.xp -= xp_needed(player.level);
        player.level += 1;
        player.max_hp += HP_PER_LEVEL;
        player.hp = player.max_hp;
        player.rest_count = 0;
        levels.push(player.level);
    }

    if let Some(level) = levels.last() {
        info!("Player {} reached level {}", player.id, level);
    }
    levels
}

/// `ceil(value * percent / 100)`
fn percent_of(value: u64, percent: u32) -> u64 {
    (value * percent as u64).div_ceil(100)
}

/// Regular defeat: lose a random share of XP and gold, revive at half HP
pub fn apply_defeat<R: Rng + ?Sized>(
    rng: &mut R,
    player: &mut PlayerState,
    monster_name: &str,
    events: Vec<CombatEvent>,
) -> DefeatResult {
    let percent = rng.gen_range(DEATH_PENALTY_PERCENT);
    let xp_lost = percent_of(player.xp, percent);
    let gold_lost = percent_of(player.gold, percent);
    finish_defeat(player, monster_name, percent, xp_lost, gold_lost, events)
}

/// Dying while fleeing costs half the gold and half the XP
pub fn apply_flee_death(
    player: &mut PlayerState,
    monster_name: &str,
    events: Vec<CombatEvent>,
) -> DefeatResult {
    let xp_lost = percent_of(player.xp, FLEE_DEATH_PENALTY_PERCENT);
    let gold_lost = player.gold / 2;
    finish_defeat(player, monster_name, FLEE_DEATH_PENALTY_PERCENT, xp_lost, gold_lost, events)
}

fn finish_defeat(
    player: &mut PlayerState,
    monster_name: &str,
    penalty_percent: u32,
    xp_lost: u64,
    gold_lost: u64,
    events: Vec<CombatEvent>,
) -> DefeatResult {
    player.xp = player.xp.saturating_sub(xp_lost);
    player.gold = player.gold.saturating_sub(gold_lost);
    player.hp = player.max_hp / 2;
    player.clear_combat();

    info!(
        "Player {} was defeated by {} (-{}% : {} xp, {} gold)",
        player.id, monster_name, penalty_percent, xp_lost, gold_lost
    );

    DefeatResult {
        monster_name: monster_name.to_string(),
        penalty_percent,
        xp_lost,
        gold_lost,
        hp_after: player.hp,
        events,
    }
}

// =============================================================================
// Cosmetics
// =============================================================================

/// Title shown next to the player's level
pub fn rank_title(level: u32) -> &'static str {
    match level {
        0..=4 => "Novice",
        5..=9 => "Adventurer",
        10..=14 => "Veteran",
        15..=19 => "Champion",
        20..=24 => "Hero",
        _ => "Legend",
    }
}

const NAME_PREFIXES: &[&str] = &[
    "Ar", "Bel", "Cor", "Dra", "El", "Fen", "Gor", "Hal", "Ith", "Kal", "Lor", "Mor", "Ny", "Or",
    "Ryn", "Sael", "Thal", "Val", "Zan",
];

const NAME_SUFFIXES: &[&str] = &[
    "adan", "dor", "eth", "ion", "ira", "mir", "nor", "ric", "wyn", "thas", "vyn", "ys",
];

/// A random fantasy name for players who don't pick one
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = NAME_PREFIXES.choose(rng).copied().unwrap_or("Ar");
    let suffix = NAME_SUFFIXES.choose(rng).copied().unwrap_or("dor");
    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rpg_shared::MAX_NAME_LEN;

    fn player(xp: u64, gold: u64) -> PlayerState {
        PlayerState {
            id: "p".into(),
            level: 1,
            xp,
            gold,
            hp: 0,
            max_hp: 91,
            ..Default::default()
        }
    }

    #[test]
    fn test_xp_needed() {
        assert_eq!(xp_needed(1), 100);
        assert_eq!(xp_needed(7), 700);
        assert_eq!(total_xp(1, 40), 40);
        assert_eq!(total_xp(3, 5), 100 + 200 + 5);
    }

    #[test]
    fn test_multi_level_grant() {
        let mut p = player(0, 0);
        p.hp = 10;
        p.rest_count = 3;
        let levels = grant_xp(&mut p, xp_needed(1) + xp_needed(2) + 5);

        assert_eq!(levels, vec![2, 3]);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 5);
        assert_eq!(p.max_hp, 91 + 2 * HP_PER_LEVEL);
        assert_eq!(p.hp, p.max_hp);
        assert_eq!(p.rest_count, 0);
    }

    #[test]
    fn test_small_grant_keeps_level() {
        let mut p = player(50, 0);
        assert!(grant_xp(&mut p, 49).is_empty());
        assert_eq!((p.level, p.xp), (1, 99));
    }

    #[test]
    fn test_defeat_penalty_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let mut p = player(77, 333);
            let result = apply_defeat(&mut rng, &mut p, "Orc", vec![]);
            let pct = result.penalty_percent as u64;

            assert!(DEATH_PENALTY_PERCENT.contains(&result.penalty_percent));
            assert_eq!(result.xp_lost, (77 * pct + 99) / 100);
            assert_eq!(result.gold_lost, (333 * pct + 99) / 100);
            assert_eq!(p.hp, 45);
            assert_eq!(result.hp_after, 45);
            assert!(!p.in_combat());
        }
    }

    #[test]
    fn test_flee_death_is_harsher() {
        let mut p = player(51, 101);
        let result = apply_flee_death(&mut p, "Troll", vec![]);
        assert_eq!(result.penalty_percent, 50);
        assert_eq!(result.xp_lost, 26);
        assert_eq!(result.gold_lost, 50);
        assert_eq!((p.xp, p.gold), (25, 51));
    }

    #[test]
    fn test_random_name_fits() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let name = random_name(&mut rng);
            assert!(!name.is_empty() && name.len() <= MAX_NAME_LEN);
        }
    }

    #[test]
    fn test_rank_titles() {
        assert_eq!(rank_title(1), "Novice");
        assert_eq!(rank_title(12), "Veteran");
        assert_eq!(rank_title(40), "Legend");
    }
}
