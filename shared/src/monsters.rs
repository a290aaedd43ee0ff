//! Regular monster templates.
//!
//! Templates are scaled to the player and the map when a fight starts; see
//! the server's spawn code.

use serde::{Deserialize, Serialize};

use crate::{LootEntry, StatusEffect};

/// Base stats of a regular monster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub hp: i64,
    pub atk: i64,
    pub level: u32,
    pub xp_reward: u64,
    pub gold_reward: u64,
    pub drop_table: Vec<LootEntry>,
    pub innate_effects: Vec<StatusEffect>,
}

type MonsterRow = (
    &'static str,
    i64,
    i64,
    u32,
    u64,
    u64,
    &'static [(&'static str, f64)],
    &'static [StatusEffect],
);

use StatusEffect::{Bleed, Burn, Freeze, Holy, Poison, Shock};

const MONSTERS: &[MonsterRow] = &[
    // Beginners (levels 1-3)
    ("Slime", 40, 5, 1, 15, 3, &[("Small Potion", 0.2), ("Slime Goo", 0.8)], &[Poison]),
    ("Goblin", 70, 8, 2, 25, 8, &[("Small Potion", 0.15), ("Rusty Dagger", 0.1), ("Gold Nugget", 0.3)], &[]),
    ("Orc", 120, 14, 3, 50, 15, &[("Medium Potion", 0.15), ("Stone Axe", 0.15), ("Leather Armor", 0.1), ("Orc Hide", 0.4)], &[Burn]),
    // Intermediate (levels 4-6)
    ("Skeleton", 160, 15, 4, 80, 25, &[("Medium Potion", 0.2), ("Longsword", 0.12), ("Chainmail", 0.1), ("Bone", 0.5)], &[Freeze]),
    ("Cyclops", 240, 20, 5, 120, 40, &[("Large Potion", 0.2), ("Silver Sword", 0.1), ("Plate Armor", 0.1), ("Cyclops Eye", 0.3)], &[Shock]),
    ("Troll", 300, 22, 6, 150, 50, &[("Large Potion", 0.2), ("War Hammer", 0.1), ("Scale Armor", 0.1)], &[Bleed]),
    // Advanced (levels 7-10)
    ("Young Dragon", 360, 30, 7, 200, 80, &[("Large Potion", 0.25), ("Flaming Sword", 0.08), ("Divine Armor", 0.06), ("Dragon Scale", 0.2)], &[Burn, Poison]),
    ("Basilisk", 400, 35, 8, 220, 100, &[("Large Potion", 0.25), ("Thunder Axe", 0.1), ("Dwarven Armor", 0.08)], &[Poison, Freeze]),
    ("Specter", 320, 38, 9, 240, 120, &[("Large Potion", 0.2), ("Crystal Wand", 0.1), ("Iron Cuirass", 0.08)], &[Shock, Bleed]),
    ("Chimera", 480, 42, 10, 300, 150, &[("Large Potion", 0.25), ("Silver Sword", 0.12), ("Dragon Armor", 0.1)], &[Burn, Freeze, Shock]),
    // Experts (levels 11-15)
    ("Lich", 280, 48, 11, 300, 220, &[("Large Potion", 0.45), ("Ancient Grimoire", 0.15), ("Elven Armor", 0.12)], &[Poison, Shock]),
    ("Cerberus", 320, 52, 12, 350, 260, &[("Large Potion", 0.45), ("Double Axe", 0.15), ("Celestial Armor", 0.12)], &[Burn, Bleed]),
    ("Phoenix", 300, 55, 13, 400, 300, &[("Large Potion", 0.5), ("Arcane Staff", 0.15), ("Divine Armor", 0.12)], &[Burn]),
    ("Leviathan", 360, 60, 14, 450, 350, &[("Large Potion", 0.5), ("Dragon Lance", 0.15), ("Demonic Armor", 0.12)], &[Freeze, Shock]),
    ("Forest Titan", 400, 65, 15, 500, 400, &[("Large Potion", 0.5), ("Flaming Katar", 0.15), ("Celestial Armor", 0.12)], &[Burn, Freeze, Shock]),
    // Heroic (levels 16-20)
    ("Flame Demon", 450, 72, 16, 600, 500, &[("Large Potion", 0.55), ("Flaming Sword", 0.15), ("Demonic Armor", 0.15)], &[Burn]),
    ("Ice Golem", 420, 68, 17, 550, 480, &[("Large Potion", 0.55), ("Frost Hammer", 0.15), ("Celestial Armor", 0.15)], &[Freeze]),
    ("Ancient Dragon", 500, 78, 18, 700, 600, &[("Large Potion", 0.6), ("Infinite Grimoire", 0.18), ("Ainz Armor", 0.15), ("Dragon Scale", 0.5)], &[Burn, Poison, Bleed]),
    ("Night Lord", 520, 82, 19, 750, 650, &[("Large Potion", 0.6), ("Celestial Wand", 0.18), ("Void Armor", 0.15)], &[Shock, Bleed, Freeze]),
    ("Skeleton King", 550, 88, 20, 800, 700, &[("Large Potion", 0.6), ("Dragon Fist", 0.18), ("Divine Armor", 0.15), ("Bone", 0.8)], &[Poison, Burn, Shock]),
    // Legendary (levels 21+)
    ("Demon King", 600, 95, 21, 900, 800, &[("Large Potion", 0.65), ("Excalibur", 0.2), ("Ainz Armor", 0.18)], &[Burn, Poison, Shock, Freeze]),
    ("Fallen Deity", 650, 100, 22, 1000, 900, &[("Large Potion", 0.65), ("Mjolnir", 0.2), ("Void Armor", 0.18)], &[Shock, Holy]),
    ("Ancestral Entity", 700, 105, 23, 1100, 1000, &[("Large Potion", 0.7), ("Gungnir", 0.22), ("Divine Armor", 0.2)], &[Burn, Freeze, Shock, Poison]),
    ("Abyssal", 750, 110, 24, 1200, 1100, &[("Large Potion", 0.7), ("Merlin's Staff", 0.22), ("Ainz Armor", 0.2)], &[Poison, Bleed, Holy]),
    ("Eternal Titan", 800, 120, 25, 1500, 1300, &[("Large Potion", 0.75), ("Wand of Reality", 0.25), ("Void Armor", 0.22)], &[Burn, Freeze, Shock, Poison, Bleed]),
];

/// Get all regular monster templates
pub fn get_monster_definitions() -> Vec<MonsterTemplate> {
    MONSTERS
        .iter()
        .map(|&(name, hp, atk, level, xp_reward, gold_reward, drops, effects)| MonsterTemplate {
            name: name.into(),
            hp,
            atk,
            level,
            xp_reward,
            gold_reward,
            drop_table: drops.iter().map(|&(item, chance)| LootEntry::new(item, chance)).collect(),
            innate_effects: effects.to_vec(),
        })
        .collect()
}
