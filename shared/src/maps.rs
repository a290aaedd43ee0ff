//! Hunting maps, their monster pools and bosses.

use serde::{Deserialize, Serialize};

use crate::{BossPhase, LootEntry, SpecialPower, StatusEffect};

/// Map every new character starts on
pub const STARTING_MAP: &str = "forest";

/// Multipliers applied to regular monsters spawned on a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapScaling {
    pub hp: f64,
    pub atk: f64,
    pub gold: f64,
}

/// One monster in a map's pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub monster: String,
    pub spawn_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub name: String,
    pub phases: Vec<BossPhase>,
}

/// Map definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDef {
    pub id: String,
    pub name: String,
    pub recommended_level: u32,
    pub pool: Vec<SpawnEntry>,
    pub scaling: MapScaling,
    pub boss: BossDef,
    /// Unlocked when this map's boss falls
    pub next_map: Option<String>,
}

fn pool(entries: &[(&str, f64)]) -> Vec<SpawnEntry> {
    entries
        .iter()
        .map(|&(monster, spawn_weight)| SpawnEntry { monster: monster.into(), spawn_weight })
        .collect()
}

fn drops(entries: &[(&str, f64)]) -> Vec<LootEntry> {
    entries.iter().map(|&(item, chance)| LootEntry::new(item, chance)).collect()
}

/// A plain phase; callers override the extras with struct update syntax
fn phase(name: &str, hp: i64, atk: i64, level: u32, xp_reward: u64, gold_reward: u64) -> BossPhase {
    BossPhase {
        name: name.into(),
        hp,
        atk,
        level,
        xp_reward,
        gold_reward,
        drop_table: Vec::new(),
        innate_effects: Vec::new(),
        double_attack: false,
        crit_chance: 0.0,
        crit_damage: 0,
        special_power: None,
    }
}

fn power(name: &str, trigger_chance: f64, bonus_damage: i64, effect: StatusEffect, effect_chance: f64) -> Option<SpecialPower> {
    Some(SpecialPower {
        name: name.into(),
        trigger_chance,
        bonus_damage,
        effect: Some(effect),
        effect_chance,
    })
}

/// Get all map definitions, in unlock order
pub fn get_map_definitions() -> Vec<MapDef> {
    use StatusEffect::*;

    vec![
        MapDef {
            id: "forest".into(),
            name: "Forest of Perdition".into(),
            recommended_level: 1,
            pool: pool(&[("Slime", 1.2), ("Goblin", 1.0), ("Orc", 0.8), ("Skeleton", 0.5)]),
            scaling: MapScaling { hp: 1.0, atk: 1.0, gold: 1.0 },
            boss: BossDef {
                name: "Goblin Warlord".into(),
                phases: vec![
                    BossPhase {
                        drop_table: drops(&[("Medium Potion", 0.5)]),
                        innate_effects: vec![Bleed],
                        ..phase("Goblin Warlord", 220, 12, 4, 120, 60)
                    },
                    BossPhase {
                        drop_table: drops(&[("Large Potion", 0.6), ("War Axe", 0.25), ("Chainmail", 0.3)]),
                        innate_effects: vec![Bleed],
                        double_attack: true,
                        crit_chance: 0.1,
                        crit_damage: 30,
                        special_power: power("War Cry", 0.2, 8, Bleed, 0.5),
                        ..phase("Goblin Warlord (Enraged)", 260, 15, 5, 400, 200)
                    },
                ],
            },
            next_map: Some("caves".into()),
        },
        MapDef {
            id: "caves".into(),
            name: "Crystal Caves".into(),
            recommended_level: 5,
            pool: pool(&[
                ("Skeleton", 1.0),
                ("Cyclops", 1.0),
                ("Troll", 1.0),
                ("Basilisk", 0.6),
                ("Specter", 0.5),
            ]),
            scaling: MapScaling { hp: 1.1, atk: 1.05, gold: 1.15 },
            boss: BossDef {
                name: "Crystal Basilisk".into(),
                phases: vec![
                    BossPhase {
                        drop_table: drops(&[("Large Potion", 0.5)]),
                        innate_effects: vec![Poison],
                        ..phase("Crystal Basilisk", 500, 30, 8, 300, 150)
                    },
                    BossPhase {
                        drop_table: drops(&[
                            ("Large Potion", 0.7),
                            ("Heavy Crossbow", 0.25),
                            ("Dwarven Armor", 0.25),
                        ]),
                        innate_effects: vec![Poison, Freeze],
                        crit_chance: 0.1,
                        crit_damage: 45,
                        special_power: power("Petrifying Gaze", 0.2, 12, Freeze, 0.6),
                        ..phase("Crystal Basilisk (Shattered)", 560, 36, 9, 900, 450)
                    },
                ],
            },
            next_map: Some("ruins".into()),
        },
        MapDef {
            id: "ruins".into(),
            name: "Forgotten Ruins".into(),
            recommended_level: 10,
            pool: pool(&[
                ("Specter", 1.0),
                ("Chimera", 1.0),
                ("Lich", 1.0),
                ("Cerberus", 0.8),
                ("Young Dragon", 0.6),
            ]),
            scaling: MapScaling { hp: 1.2, atk: 1.1, gold: 1.3 },
            boss: BossDef {
                name: "Lich Sovereign".into(),
                phases: vec![
                    BossPhase {
                        innate_effects: vec![Poison],
                        ..phase("Lich Sovereign", 700, 48, 12, 500, 250)
                    },
                    BossPhase {
                        innate_effects: vec![Poison, Shock],
                        special_power: power("Soul Drain", 0.2, 15, Poison, 0.5),
                        ..phase("Lich Sovereign (Unbound)", 760, 54, 13, 700, 350)
                    },
                    BossPhase {
                        drop_table: drops(&[
                            ("Large Potion", 0.8),
                            ("Grimoire of Shadows", 0.3),
                            ("Celestial Armor", 0.25),
                        ]),
                        innate_effects: vec![Poison, Shock],
                        double_attack: true,
                        crit_chance: 0.12,
                        crit_damage: 70,
                        special_power: power("Soul Drain", 0.25, 18, Poison, 0.6),
                        ..phase("Lich Sovereign (Phylactery)", 820, 60, 14, 2000, 1000)
                    },
                ],
            },
            next_map: Some("volcano".into()),
        },
        MapDef {
            id: "volcano".into(),
            name: "Ember Volcano".into(),
            recommended_level: 15,
            pool: pool(&[
                ("Phoenix", 1.0),
                ("Leviathan", 0.8),
                ("Forest Titan", 0.8),
                ("Flame Demon", 1.0),
                ("Ice Golem", 0.6),
                ("Ancient Dragon", 0.5),
            ]),
            scaling: MapScaling { hp: 1.3, atk: 1.15, gold: 1.45 },
            boss: BossDef {
                name: "Ancient Flame Wyrm".into(),
                phases: vec![
                    BossPhase {
                        innate_effects: vec![Burn],
                        ..phase("Ancient Flame Wyrm", 1000, 70, 17, 900, 450)
                    },
                    BossPhase {
                        innate_effects: vec![Burn],
                        special_power: power("Magma Breath", 0.25, 20, Burn, 0.7),
                        ..phase("Ancient Flame Wyrm (Molten)", 1100, 78, 18, 1200, 600)
                    },
                    BossPhase {
                        drop_table: drops(&[
                            ("Large Potion", 0.9),
                            ("Apocalypse Crossbow", 0.2),
                            ("Ainz Armor", 0.25),
                        ]),
                        innate_effects: vec![Burn, Bleed],
                        double_attack: true,
                        crit_chance: 0.12,
                        crit_damage: 110,
                        special_power: power("Magma Breath", 0.3, 24, Burn, 0.7),
                        ..phase("Ancient Flame Wyrm (Cataclysm)", 1200, 85, 19, 3500, 1800)
                    },
                ],
            },
            next_map: Some("abyss".into()),
        },
        MapDef {
            id: "abyss".into(),
            name: "The Abyss".into(),
            recommended_level: 20,
            pool: pool(&[
                ("Night Lord", 1.0),
                ("Skeleton King", 1.0),
                ("Demon King", 0.9),
                ("Fallen Deity", 0.8),
                ("Ancestral Entity", 0.7),
                ("Abyssal", 0.6),
                ("Eternal Titan", 0.4),
            ]),
            scaling: MapScaling { hp: 1.45, atk: 1.25, gold: 1.6 },
            boss: BossDef {
                name: "Eternal Void".into(),
                phases: vec![
                    BossPhase {
                        innate_effects: vec![Shock],
                        ..phase("Eternal Void", 1400, 95, 22, 1500, 800)
                    },
                    BossPhase {
                        innate_effects: vec![Shock, Holy],
                        special_power: power("Void Collapse", 0.25, 25, Shock, 0.6),
                        ..phase("Eternal Void (Awakened)", 1550, 105, 23, 2000, 1000)
                    },
                    BossPhase {
                        drop_table: drops(&[
                            ("Large Potion", 1.0),
                            ("Infinity Gauntlet", 0.25),
                            ("Void Armor", 0.3),
                        ]),
                        innate_effects: vec![Shock, Holy, Poison],
                        double_attack: true,
                        crit_chance: 0.15,
                        crit_damage: 150,
                        special_power: power("Void Collapse", 0.3, 30, Shock, 0.7),
                        ..phase("Eternal Void (Singularity)", 1700, 115, 25, 6000, 3000)
                    },
                ],
            },
            next_map: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_chain_in_order() {
        let maps = get_map_definitions();
        assert_eq!(maps[0].id, STARTING_MAP);
        for pair in maps.windows(2) {
            assert_eq!(pair[0].next_map.as_deref(), Some(pair[1].id.as_str()));
        }
        assert!(maps.last().unwrap().next_map.is_none());
    }

    #[test]
    fn test_every_boss_has_phases() {
        for map in get_map_definitions() {
            assert!(map.boss.phases.len() >= 2, "{} boss has too few phases", map.id);
            assert!(!map.pool.is_empty());
        }
    }
}
