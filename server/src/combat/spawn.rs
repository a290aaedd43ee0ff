//! Picking the monster for a hunt.

use log::info;
use rand::Rng;
use rpg_shared::{Catalog, GameError, MonsterState, MonsterTemplate, PlayerState, SpawnEntry};

use crate::entities::{boss_monster, scale_monster};
use crate::random::{chance, weighted_choice};

/// Chance per hunt of meeting the map boss while it still stands
pub const BOSS_CHANCE: f64 = 0.08;

/// Weight multiplier for the monster fought last time
pub const REPEAT_PENALTY: f64 = 0.3;

/// Preference for monsters close to the player's level
pub fn level_proximity_weight(player_level: u32, monster_level: u32) -> f64 {
    match player_level.abs_diff(monster_level) {
        0 => 5.0,
        1 => 4.0,
        2 => 3.0,
        _ => 1.0,
    }
}

/// Selection weight of one pool entry for this player
pub fn spawn_weight(player: &PlayerState, spawn: &SpawnEntry, template: &MonsterTemplate) -> f64 {
    let mut weight = level_proximity_weight(player.level, template.level) * spawn.spawn_weight;
    if player.last_monster_name.as_deref() == Some(template.name.as_str()) {
        weight *= REPEAT_PENALTY;
    }
    weight
}

/// Roll the monster for a hunt on the player's current map.
///
/// The boss is rolled first and, when it appears, replaces the regular pick.
pub fn select_monster<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &PlayerState,
) -> Result<MonsterState, GameError> {
    let map = catalog
        .map(&player.current_map_id)
        .ok_or_else(|| GameError::UnknownMap(player.current_map_id.clone()))?;

    if !player.is_boss_defeated(&map.id) && chance(rng, BOSS_CHANCE) {
        if let Some(boss) = boss_monster(map) {
            info!("Player {} encountered {} on {}", player.id, map.boss.name, map.id);
            return Ok(boss);
        }
    }

    let candidates: Vec<(&SpawnEntry, &MonsterTemplate)> = map
        .pool
        .iter()
        .filter_map(|spawn| catalog.monster(&spawn.monster).map(|template| (spawn, template)))
        .collect();

    let (_, template) = weighted_choice(rng, &candidates, |(spawn, template)| {
        spawn_weight(player, spawn, template)
    })
    .ok_or_else(|| GameError::UnknownMap(map.id.clone()))?;

    Ok(scale_monster(template, &map.scaling, player.level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn player(level: u32) -> PlayerState {
        PlayerState {
            id: "hunter".into(),
            level,
            current_map_id: "forest".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_proximity_weights() {
        assert_eq!(level_proximity_weight(3, 3), 5.0);
        assert_eq!(level_proximity_weight(3, 4), 4.0);
        assert_eq!(level_proximity_weight(5, 3), 3.0);
        assert_eq!(level_proximity_weight(1, 9), 1.0);
    }

    #[test]
    fn test_repeat_penalty() {
        let catalog = Catalog::builtin();
        let forest = catalog.map("forest").unwrap();
        let spawn = &forest.pool[0];
        let slime = catalog.monster(&spawn.monster).unwrap();

        let mut p = player(1);
        let fresh = spawn_weight(&p, spawn, slime);
        p.last_monster_name = Some("Slime".into());
        let repeat = spawn_weight(&p, spawn, slime);
        assert!((repeat - fresh * REPEAT_PENALTY).abs() < 1e-9);
    }

    #[test]
    fn test_boss_only_while_undefeated() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(31);
        let mut p = player(1);
        p.boss_defeated.insert("forest".into(), true);

        for _ in 0..2_000 {
            let monster = select_monster(&mut rng, &catalog, &p).unwrap();
            assert!(!monster.is_boss());
        }

        p.boss_defeated.clear();
        let bosses = (0..2_000)
            .filter(|_| select_monster(&mut rng, &catalog, &p).unwrap().is_boss())
            .count();
        // 8% of 2000
        assert!((100..=230).contains(&bosses), "{} bosses", bosses);
    }

    #[test]
    fn test_low_level_prefers_nearby_monsters() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(77);
        let mut p = player(1);
        p.boss_defeated.insert("forest".into(), true);

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..5_000 {
            let monster = select_monster(&mut rng, &catalog, &p).unwrap();
            *counts.entry(monster.name).or_default() += 1;
        }
        assert!(counts["Slime"] > counts["Orc"]);
        assert!(counts["Goblin"] > counts["Skeleton"]);
    }

    #[test]
    fn test_unknown_map() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = player(1);
        p.current_map_id = "moon".into();
        assert_eq!(
            select_monster(&mut rng, &catalog, &p),
            Err(GameError::UnknownMap("moon".into()))
        );
    }
}
