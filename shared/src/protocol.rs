//! Structured results returned to the caller, and the error taxonomy.
//!
//! The engine never renders text. Every operation returns one of these
//! values and the caller decides how to present it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ActiveBuff, BackpackTier, ItemKind, MonsterState, StatusEffect};

/// Base max HP before the class bonus
pub const HP_BASE: i64 = 50;

/// Max HP gained per level
pub const HP_PER_LEVEL: i64 = 20;

/// `xp_needed(level) = XP_BASE * level * 2`
pub const XP_BASE: u64 = 50;

/// Armor every new character starts with
pub const STARTING_ARMOR: &str = "Old Clothes";

/// Longest allowed character name
pub const MAX_NAME_LEN: usize = 24;

/// Most drops that can wait for a free slot at once
pub const MAX_PENDING_DROPS: usize = 10;

// =============================================================================
// Combat
// =============================================================================

/// Who an event happened to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Player,
    Monster,
}

/// Something that happened during a turn, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// The player struck the monster
    PlayerHit { damage: i64, critical: bool },
    /// The monster struck the player
    MonsterHit { damage: i64, critical: bool },
    SpecialPower { name: String, damage: i64 },
    EffectApplied { target: Target, effect: StatusEffect },
    StatusTick { target: Target, effect: StatusEffect, damage: i64 },
    BuffExpired { name: String },
    /// A boss moved into its next phase
    PhaseAdvanced { phase_name: String, phase_index: usize },
    /// Poison picked up before the fight took hold
    PendingPoison,
}

/// Snapshot of an ongoing fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStatus {
    pub monster: MonsterState,
    pub player_hp: i64,
    pub player_max_hp: i64,
    pub turn: u32,
    pub player_effects: Vec<StatusEffect>,
    pub monster_effects: Vec<StatusEffect>,
    pub events: Vec<CombatEvent>,
}

/// Result of one attack turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Continue(CombatStatus),
    PhaseAdvanced(CombatStatus),
    Victory(VictoryResult),
    Defeat(DefeatResult),
}

/// What one loot roll turned into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropOutcome {
    /// Added to inventory or owned gear. `level_warning` carries the
    /// required level when the player cannot equip it yet.
    Acquired {
        item: String,
        kind: ItemKind,
        level_warning: Option<u32>,
    },
    /// Gear the player already had
    AlreadyOwned { item: String },
    /// Backpack full; waiting in the pending swap queue
    Queued { item: String, kind: ItemKind },
    /// Pushed out of a full pending swap queue
    Evicted { item: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictoryResult {
    pub monster_name: String,
    pub xp_gained: u64,
    pub gold_gained: u64,
    pub drops: Vec<DropOutcome>,
    pub backpack_upgrade: Option<BackpackTier>,
    /// Each level reached, in order
    pub levels_gained: Vec<u32>,
    /// Map whose boss was just defeated
    pub boss_defeated: Option<String>,
    pub unlocked_map: Option<String>,
    pub events: Vec<CombatEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefeatResult {
    pub monster_name: String,
    pub penalty_percent: u32,
    pub xp_lost: u64,
    pub gold_lost: u64,
    pub hp_after: i64,
    pub events: Vec<CombatEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FleeResult {
    Escaped,
    /// The escape failed and the monster struck back
    Failed(CombatStatus),
    /// The monster's counter-attack was fatal
    Died(DefeatResult),
}

// =============================================================================
// Hunting
// =============================================================================

/// Non-combat events that can happen while hunting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterEvent {
    /// A wandering merchant offers a discounted potion or a duel
    Merchant,
    Campfire { healed: i64 },
    LostPurse { gold: u64 },
    FoundPotion { drops: Vec<DropOutcome> },
    FoundGold { gold: u64 },
    /// Poison that takes hold when the next fight starts
    PoisonThorns,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HuntOutcome {
    Encounter(EncounterEvent),
    Combat(CombatStatus),
    /// Already fighting; the current fight is returned unchanged
    InProgress(CombatStatus),
}

// =============================================================================
// Player Actions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseItemResult {
    pub item: String,
    pub healed: i64,
    pub cured: Option<StatusEffect>,
    pub max_hp_bonus: i64,
    pub buff: Option<ActiveBuff>,
    pub hp: i64,
    pub max_hp: i64,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipResult {
    pub item: String,
    pub kind: ItemKind,
    pub previous: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestResult {
    pub healed: i64,
    pub hp: i64,
    pub max_hp: i64,
    /// Cooldown before the next rest, in seconds
    pub next_cooldown_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    pub accepted: String,
    /// Discarded stack and how many units it held
    pub discarded: Option<(String, u32)>,
}

/// Shop shelves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopCategory {
    Potions,
    Buffs,
    Weapons,
    Armors,
}

impl ShopCategory {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "potions" | "potion" => Some(Self::Potions),
            "buffs" | "buff" => Some(Self::Buffs),
            "weapons" | "weapon" => Some(Self::Weapons),
            "armors" | "armor" => Some(Self::Armors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub item: String,
    pub kind: ItemKind,
    pub price: u64,
    pub gold_left: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleResult {
    pub item: String,
    pub quantity: u32,
    pub gold_earned: u64,
    pub gold_total: u64,
}

// =============================================================================
// Errors
// =============================================================================

/// Why an operation was rejected. A rejected operation never changes the
/// player record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("No character found for player {0}")]
    NoActivePlayer(String),

    #[error("Player {0} already has a character")]
    PlayerAlreadyExists(String),

    #[error("You are not in combat")]
    NoActiveCombat,

    #[error("You are already fighting {monster}")]
    AlreadyInCombat { monster: String },

    #[error("Not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u64, available: u64 },

    #[error("Requires level {required} (you are level {current})")]
    LevelTooLow { required: u32, current: u32 },

    #[error("You don't have {0}")]
    ItemNotOwned(String),

    #[error("Backpack is full ({capacity} slots)")]
    InventoryFull { capacity: usize },

    #[error("You can {action} again in {remaining_secs}s")]
    CooldownActive { action: String, remaining_secs: u64 },

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Unknown map: {0}")]
    UnknownMap(String),

    #[error("Map {0} is still locked")]
    MapLocked(String),

    #[error("{0} is equipped")]
    ItemEquipped(String),

    #[error("You already own {0}")]
    AlreadyOwned(String),

    #[error("{0} cannot be used")]
    NotUsable(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Your name is already {0}")]
    NameAlreadySet(String),

    #[error("No pending drop at position {0}")]
    InvalidPendingDrop(usize),

    #[error("There is no merchant around")]
    NoMerchant,

    #[error("Slow down, try again in {remaining_ms}ms")]
    Throttled { remaining_ms: u64 },
}
