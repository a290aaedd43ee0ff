//! Character classes and their per-class stat rules.
//!
//! Each class maps to one `ClassProfile`. Derived stats go through the
//! profile's function pointers, so callers never branch on the class.

use serde::{Deserialize, Serialize};

// =============================================================================
// Character Class
// =============================================================================

/// Playable character classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Mage,
    Archer,
    Fighter,
    #[default]
    Unemployed,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 5] = [
        Self::Warrior,
        Self::Mage,
        Self::Archer,
        Self::Fighter,
        Self::Unemployed,
    ];

    /// Parse a class from user input, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn profile(&self) -> &'static ClassProfile {
        match self {
            Self::Warrior => &WARRIOR,
            Self::Mage => &MAGE,
            Self::Archer => &ARCHER,
            Self::Fighter => &FIGHTER,
            Self::Unemployed => &UNEMPLOYED,
        }
    }
}

// =============================================================================
// Class Profiles
// =============================================================================

/// Static per-class configuration
#[derive(Debug)]
pub struct ClassProfile {
    pub class: CharacterClass,
    pub name: &'static str,
    /// Added to base HP at creation
    pub hp_bonus: i64,
    /// Base of the level-scaled damage bonus
    pub damage_bonus: i64,
    /// Weapon every new character starts with
    pub starting_weapon: &'static str,
    pub crit_chance: fn(u32) -> f64,
    pub defense_bonus: fn(u32) -> i64,
    pub damage_multiplier: fn(u32) -> f64,
}

impl ClassProfile {
    /// `floor(damage_bonus * max(1, level) / 10)`
    pub fn damage_bonus_at(&self, level: u32) -> i64 {
        (self.damage_bonus * level.max(1) as i64 / 10).max(0)
    }
}

/// Levels gained since level 1
fn levels_gained(level: u32) -> u32 {
    level.saturating_sub(1)
}

fn flat_crit(_level: u32) -> f64 {
    0.05
}

fn archer_crit(level: u32) -> f64 {
    0.15 + 0.01 * levels_gained(level) as f64
}

fn mage_crit(level: u32) -> f64 {
    0.10 + 0.02 * levels_gained(level) as f64
}

fn no_defense(_level: u32) -> i64 {
    0
}

fn warrior_defense(level: u32) -> i64 {
    5 + 2 * levels_gained(level) as i64
}

fn no_multiplier(_level: u32) -> f64 {
    1.0
}

fn fighter_multiplier(level: u32) -> f64 {
    1.0 + 0.05 + 0.02 * levels_gained(level) as f64
}

static WARRIOR: ClassProfile = ClassProfile {
    class: CharacterClass::Warrior,
    name: "Warrior",
    hp_bonus: 40,
    damage_bonus: 4,
    starting_weapon: "Wooden Sword",
    crit_chance: flat_crit,
    defense_bonus: warrior_defense,
    damage_multiplier: no_multiplier,
};

static MAGE: ClassProfile = ClassProfile {
    class: CharacterClass::Mage,
    name: "Mage",
    hp_bonus: 15,
    damage_bonus: 12,
    starting_weapon: "Enchanted Twig",
    crit_chance: mage_crit,
    defense_bonus: no_defense,
    damage_multiplier: no_multiplier,
};

static ARCHER: ClassProfile = ClassProfile {
    class: CharacterClass::Archer,
    name: "Archer",
    hp_bonus: 20,
    damage_bonus: 8,
    starting_weapon: "Slingshot",
    crit_chance: archer_crit,
    defense_bonus: no_defense,
    damage_multiplier: no_multiplier,
};

static FIGHTER: ClassProfile = ClassProfile {
    class: CharacterClass::Fighter,
    name: "Fighter",
    hp_bonus: 25,
    damage_bonus: 6,
    starting_weapon: "Wooden Staff",
    crit_chance: flat_crit,
    defense_bonus: no_defense,
    damage_multiplier: fighter_multiplier,
};

static UNEMPLOYED: ClassProfile = ClassProfile {
    class: CharacterClass::Unemployed,
    name: "Unemployed",
    hp_bonus: 0,
    damage_bonus: 0,
    starting_weapon: "Fists",
    crit_chance: flat_crit,
    defense_bonus: no_defense,
    damage_multiplier: no_multiplier,
};
