//! Item definitions: weapons, armors, consumables and loot trinkets.
//!
//! Everything here is static reference data. The `Catalog` indexes these
//! tables by name once at startup.

use serde::{Deserialize, Serialize};

use crate::{BuffKind, StatusEffect};

/// Highest level a generated level variant may require
pub const MAX_VARIANT_LEVEL: u32 = 25;

/// Number of level variants generated above each base item
const VARIANT_STEPS: u32 = 5;

// =============================================================================
// Item Classification
// =============================================================================

/// Item rarity, ordered from most to least common
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Mythic => "Mythic",
        }
    }

    /// Weight used when a bonus drop picks a rarity band
    pub fn drop_weight(&self) -> f64 {
        match self {
            Self::Common => 5.0,
            Self::Rare => 3.0,
            Self::Epic => 2.0,
            Self::Legendary | Self::Mythic => 1.0,
        }
    }
}

/// Which class a weapon is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    Warrior,
    Mage,
    Archer,
    Fighter,
    General,
}

/// Item kinds, used to route loot to the right collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Consumable,
    Misc,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Consumable => "consumable",
            Self::Misc => "misc",
        }
    }

    /// Weapons and armors live in owned sets and never take a backpack slot
    pub fn uses_backpack_slot(&self) -> bool {
        matches!(self, Self::Consumable | Self::Misc)
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// Weapon definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub name: String,
    pub damage: i64,
    pub price: u64,
    pub level_req: u32,
    pub category: WeaponCategory,
    pub rarity: Rarity,
    /// Status effect this weapon can put on the monster
    pub effect: Option<StatusEffect>,
    /// Set on generated level variants
    pub base_weapon: Option<String>,
}

/// Armor definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorDef {
    pub name: String,
    pub defense: i64,
    pub price: u64,
    pub level_req: u32,
    pub rarity: Rarity,
    pub base_armor: Option<String>,
}

/// What a consumable does when used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    Heal(i64),
    /// Heal and remove a status effect
    HealAndCure { heal: i64, cures: StatusEffect },
    /// Heal and permanently raise max HP
    HealAndBoost { heal: i64, max_hp_bonus: i64 },
    /// Temporary combat buff
    Buff { kind: BuffKind, magnitude: i64, turns: u32 },
}

/// Consumable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableDef {
    pub name: String,
    pub price: u64,
    pub effect: ConsumableEffect,
}

impl ConsumableDef {
    /// Elixirs are sold on the buff shelf, everything else on the potion shelf
    pub fn is_buff(&self) -> bool {
        matches!(self.effect, ConsumableEffect::Buff { .. })
    }
}

/// Loot that is only worth selling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiscItemDef {
    pub name: String,
    pub price: u64,
}

// =============================================================================
// Weapon Tables
// =============================================================================

type WeaponRow = (&'static str, i64, u64, u32, WeaponCategory, Option<StatusEffect>);

use StatusEffect::{Bleed, Burn, Freeze, Holy, Pierce, Poison, Shock, Stun};
use WeaponCategory::{Archer, Fighter, General, Mage, Warrior};

const COMMON_WEAPONS: &[WeaponRow] = &[
    ("Wooden Sword", 3, 60, 1, Warrior, None),
    ("Stone Axe", 4, 75, 1, Warrior, None),
    ("Wooden Hammer", 3, 67, 1, Warrior, None),
    ("Enchanted Twig", 2, 52, 1, Mage, None),
    ("Wooden Wand", 3, 67, 1, Mage, None),
    ("Basic Grimoire", 2, 60, 1, Mage, None),
    ("Short Bow", 3, 67, 1, Archer, None),
    ("Rusty Dagger", 2, 45, 1, Archer, None),
    ("Slingshot", 2, 37, 1, Archer, None),
    ("Leather Gauntlet", 3, 60, 1, Fighter, None),
    ("Brass Knuckles", 4, 75, 1, Fighter, None),
    ("Wooden Staff", 3, 52, 1, Fighter, None),
    ("Fists", 0, 0, 1, General, None),
];

const RARE_WEAPONS: &[WeaponRow] = &[
    ("Longsword", 12, 600, 3, Warrior, None),
    ("War Axe", 14, 680, 4, Warrior, Some(Bleed)),
    ("Iron Hammer", 13, 650, 3, Warrior, Some(Stun)),
    ("Knight's Lance", 15, 760, 5, Warrior, Some(Pierce)),
    ("Elemental Staff", 11, 680, 4, Mage, Some(Burn)),
    ("Crystal Wand", 10, 650, 3, Mage, Some(Freeze)),
    ("Arcane Grimoire", 12, 710, 4, Mage, Some(Shock)),
    ("Glass Orb", 9, 600, 3, Mage, Some(Poison)),
    ("Longbow", 13, 650, 4, Archer, Some(Pierce)),
    ("Light Crossbow", 14, 680, 4, Archer, None),
    ("Silver Dagger", 10, 540, 3, Archer, Some(Bleed)),
    ("Steel Shuriken", 8, 475, 3, Archer, Some(Poison)),
    ("Iron Gauntlet", 12, 610, 3, Fighter, None),
    ("Katar", 13, 660, 4, Fighter, Some(Bleed)),
    ("Nunchaku", 10, 540, 3, Fighter, Some(Stun)),
    ("Stone Fist", 11, 580, 3, Fighter, None),
];

const EPIC_WEAPONS: &[WeaponRow] = &[
    ("Silver Sword", 25, 2000, 7, Warrior, Some(Holy)),
    ("Double Axe", 28, 2250, 8, Warrior, Some(Bleed)),
    ("War Hammer", 26, 2080, 7, Warrior, Some(Stun)),
    ("Dragon Lance", 30, 2340, 8, Warrior, Some(Pierce)),
    ("Arcane Staff", 24, 2170, 7, Mage, Some(Shock)),
    ("Elven Wand", 22, 1920, 6, Mage, Some(Freeze)),
    ("Ancient Grimoire", 26, 2340, 8, Mage, Some(Burn)),
    ("Crystal Orb", 20, 1670, 6, Mage, Some(Poison)),
    ("Elven Bow", 25, 2080, 7, Archer, Some(Freeze)),
    ("Heavy Crossbow", 28, 2250, 8, Archer, Some(Pierce)),
    ("Elven Dagger", 22, 1840, 6, Archer, Some(Bleed)),
    ("Elemental Shuriken", 20, 1670, 6, Archer, Some(Shock)),
    ("Silver Gauntlet", 24, 2000, 7, Fighter, Some(Holy)),
    ("Flaming Katar", 27, 2170, 8, Fighter, Some(Burn)),
    ("Steel Nunchaku", 22, 1750, 6, Fighter, Some(Stun)),
    ("Thunder Fist", 25, 1920, 7, Fighter, Some(Shock)),
];

const LEGENDARY_WEAPONS: &[WeaponRow] = &[
    ("Flaming Sword", 48, 6800, 11, Warrior, Some(Burn)),
    ("Thunder Axe", 52, 7650, 12, Warrior, Some(Shock)),
    ("Frost Hammer", 45, 6460, 10, Warrior, Some(Freeze)),
    ("Divine Lance", 55, 8160, 12, Warrior, Some(Holy)),
    ("Elder Staff", 50, 7140, 11, Mage, Some(Shock)),
    ("Celestial Wand", 45, 6460, 10, Mage, Some(Holy)),
    ("Grimoire of Shadows", 52, 7480, 11, Mage, Some(Poison)),
    ("Prophetic Orb", 42, 6120, 10, Mage, Some(Freeze)),
    ("Celestial Bow", 48, 6800, 11, Archer, Some(Holy)),
    ("Hunter's Crossbow", 52, 7310, 12, Archer, Some(Pierce)),
    ("Shadow Dagger", 44, 6290, 10, Archer, Some(Bleed)),
    ("Divine Shuriken", 40, 5950, 10, Archer, Some(Shock)),
    ("Divine Gauntlet", 46, 6630, 11, Fighter, Some(Holy)),
    ("Wind Katar", 50, 6970, 11, Fighter, Some(Pierce)),
    ("Elemental Nunchaku", 42, 6120, 10, Fighter, Some(Shock)),
    ("Dragon Fist", 48, 6800, 11, Fighter, Some(Burn)),
];

const MYTHIC_WEAPONS: &[WeaponRow] = &[
    ("Excalibur", 100, 20400, 18, Warrior, Some(Holy)),
    ("Mjolnir", 110, 22950, 20, Warrior, Some(Shock)),
    ("Gungnir", 105, 21250, 19, Warrior, Some(Pierce)),
    ("Sword of Tomorrow", 95, 18700, 17, Warrior, Some(Burn)),
    ("Merlin's Staff", 108, 22100, 20, Mage, Some(Shock)),
    ("Wand of Reality", 98, 19550, 18, Mage, Some(Holy)),
    ("Infinite Grimoire", 102, 21250, 19, Mage, Some(Poison)),
    ("Orb of Time", 92, 17850, 17, Mage, Some(Freeze)),
    ("Bow of Artemis", 98, 20060, 18, Archer, Some(Freeze)),
    ("Apocalypse Crossbow", 112, 23800, 20, Archer, Some(Burn)),
    ("Crossbow of Fate", 88, 17000, 16, Archer, Some(Bleed)),
    ("Celestial Shuriken", 85, 16150, 15, Archer, Some(Shock)),
    ("Infinity Gauntlet", 95, 18700, 17, Fighter, Some(Holy)),
    ("Chaos Katar", 105, 21760, 19, Fighter, Some(Burn)),
    ("Storm Nunchaku", 90, 17850, 16, Fighter, Some(Shock)),
    ("Primordial Fist", 100, 20400, 18, Fighter, Some(Pierce)),
];

/// Base weapon definitions, without level variants
pub fn get_base_weapon_definitions() -> Vec<WeaponDef> {
    let tables = [
        (COMMON_WEAPONS, Rarity::Common),
        (RARE_WEAPONS, Rarity::Rare),
        (EPIC_WEAPONS, Rarity::Epic),
        (LEGENDARY_WEAPONS, Rarity::Legendary),
        (MYTHIC_WEAPONS, Rarity::Mythic),
    ];

    tables
        .iter()
        .flat_map(|(rows, rarity)| {
            rows.iter().map(move |&(name, damage, price, level_req, category, effect)| WeaponDef {
                name: name.into(),
                damage,
                price,
                level_req,
                category,
                rarity: *rarity,
                effect,
                base_weapon: None,
            })
        })
        .collect()
}

/// All weapon definitions including "<name> Lv N" variants
pub fn get_weapon_definitions() -> Vec<WeaponDef> {
    let base = get_base_weapon_definitions();
    let mut all = base.clone();

    for weapon in base.iter().filter(|w| w.price > 0) {
        for step in 1..=VARIANT_STEPS {
            let level = (weapon.level_req + step).min(MAX_VARIANT_LEVEL);
            if level == weapon.level_req {
                continue;
            }
            let name = variant_name(&weapon.name, level);
            if all.iter().any(|w| w.name == name) {
                continue;
            }
            all.push(WeaponDef {
                name,
                damage: scale_stat(weapon.damage, step, 0.08),
                price: scale_price(weapon.price, step),
                level_req: level,
                base_weapon: Some(weapon.name.clone()),
                ..weapon.clone()
            });
        }
    }

    all
}

// =============================================================================
// Armor Tables
// =============================================================================

const ARMORS: &[(&str, i64, u64, u32, Rarity)] = &[
    ("Old Clothes", 1, 0, 1, Rarity::Common),
    ("Leather Armor", 3, 100, 1, Rarity::Common),
    ("Hide Jerkin", 4, 135, 2, Rarity::Common),
    ("Chainmail", 6, 200, 3, Rarity::Common),
    ("Plate Armor", 10, 500, 4, Rarity::Rare),
    ("Scale Armor", 12, 670, 5, Rarity::Rare),
    ("Iron Cuirass", 15, 835, 6, Rarity::Rare),
    ("Elven Armor", 14, 1340, 7, Rarity::Epic),
    ("Dwarven Armor", 16, 1670, 8, Rarity::Epic),
    ("Dragon Armor", 18, 2170, 9, Rarity::Epic),
    ("Divine Armor", 24, 4170, 10, Rarity::Legendary),
    ("Demonic Armor", 26, 5010, 11, Rarity::Legendary),
    ("Celestial Armor", 28, 5840, 12, Rarity::Legendary),
    ("Ainz Armor", 35, 13360, 15, Rarity::Mythic),
    ("Void Armor", 40, 20040, 18, Rarity::Mythic),
];

/// All armor definitions including "<name> Lv N" variants
pub fn get_armor_definitions() -> Vec<ArmorDef> {
    let base: Vec<ArmorDef> = ARMORS
        .iter()
        .map(|&(name, defense, price, level_req, rarity)| ArmorDef {
            name: name.into(),
            defense,
            price,
            level_req,
            rarity,
            base_armor: None,
        })
        .collect();
    let mut all = base.clone();

    for armor in base.iter().filter(|a| a.price > 0) {
        for step in 1..=VARIANT_STEPS {
            let level = (armor.level_req + step).min(MAX_VARIANT_LEVEL);
            if level == armor.level_req {
                continue;
            }
            let name = variant_name(&armor.name, level);
            if all.iter().any(|a| a.name == name) {
                continue;
            }
            all.push(ArmorDef {
                name,
                defense: scale_stat(armor.defense, step, 0.07),
                price: scale_price(armor.price, step),
                level_req: level,
                base_armor: Some(armor.name.clone()),
                ..armor.clone()
            });
        }
    }

    all
}

fn variant_name(base: &str, level: u32) -> String {
    format!("{} Lv {}", base, level)
}

/// Variant stat: the percentage scale, but never less than +1 per step
fn scale_stat(base: i64, step: u32, per_step: f64) -> i64 {
    let scaled = (base as f64 * (1.0 + per_step * step as f64)).round() as i64;
    scaled.max(base + step as i64)
}

/// Variant price: +12% per step rounded to tens, but never less than +10 per step
fn scale_price(base: u64, step: u32) -> u64 {
    let scaled = ((base as f64 * (1.0 + 0.12 * step as f64)) / 10.0).round() as u64 * 10;
    scaled.max(base + 10 * step as u64)
}

// =============================================================================
// Consumables and Misc Items
// =============================================================================

/// Consumable definitions
pub fn get_consumable_definitions() -> Vec<ConsumableDef> {
    vec![
        ConsumableDef {
            name: "Small Potion".into(),
            price: 40,
            effect: ConsumableEffect::Heal(20),
        },
        ConsumableDef {
            name: "Medium Potion".into(),
            price: 90,
            effect: ConsumableEffect::Heal(40),
        },
        ConsumableDef {
            name: "Large Potion".into(),
            price: 180,
            effect: ConsumableEffect::Heal(80),
        },
        ConsumableDef {
            name: "Antidote".into(),
            price: 50,
            effect: ConsumableEffect::HealAndCure { heal: 10, cures: StatusEffect::Poison },
        },
        ConsumableDef {
            name: "Extra Life Potion".into(),
            price: 120,
            effect: ConsumableEffect::HealAndBoost { heal: 30, max_hp_bonus: 5 },
        },
        ConsumableDef {
            name: "Healing Boost".into(),
            price: 60,
            effect: ConsumableEffect::Heal(30),
        },
        ConsumableDef {
            name: "Strength Elixir".into(),
            price: 150,
            effect: ConsumableEffect::Buff { kind: BuffKind::Damage, magnitude: 5, turns: 3 },
        },
        ConsumableDef {
            name: "Defense Elixir".into(),
            price: 150,
            effect: ConsumableEffect::Buff { kind: BuffKind::Defense, magnitude: 3, turns: 3 },
        },
    ]
}

/// Trinkets dropped by monsters
pub fn get_misc_item_definitions() -> Vec<MiscItemDef> {
    [
        ("Slime Goo", 5),
        ("Gold Nugget", 1),
        ("Bone", 3),
        ("Orc Hide", 8),
        ("Cyclops Eye", 15),
        ("Dragon Scale", 50),
    ]
    .iter()
    .map(|&(name, price)| MiscItemDef { name: name.into(), price })
    .collect()
}
