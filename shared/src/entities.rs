//! Player and monster records.
//!
//! `PlayerState` is the long-lived record persisted per player id. The
//! monster only exists while a fight is in progress and lives on the player
//! record as `active_monster`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CharacterClass, ItemKind};

/// Turns a status effect stays on its target
pub const STATUS_EFFECT_TURNS: u32 = 2;

/// Damage dealt by one poison tick
pub const POISON_DAMAGE_PER_TURN: i64 = 3;

// =============================================================================
// Status Effects
// =============================================================================

/// Elemental and status effects carried by weapons and monsters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffect {
    Poison,
    Burn,
    Freeze,
    Shock,
    Bleed,
    Stun,
    Pierce,
    Holy,
}

impl StatusEffect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Poison => "Poison",
            Self::Burn => "Burn",
            Self::Freeze => "Freeze",
            Self::Shock => "Shock",
            Self::Bleed => "Bleed",
            Self::Stun => "Stun",
            Self::Pierce => "Pierce",
            Self::Holy => "Holy",
        }
    }

    /// Only poison deals damage over time
    pub fn damage_per_turn(&self) -> i64 {
        match self {
            Self::Poison => POISON_DAMAGE_PER_TURN,
            _ => 0,
        }
    }

    /// A fresh timer for this effect
    pub fn timer(&self) -> StatusTimer {
        StatusTimer {
            remaining_turns: STATUS_EFFECT_TURNS,
            damage_per_turn: self.damage_per_turn(),
        }
    }
}

/// Countdown attached to one effect on one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTimer {
    pub remaining_turns: u32,
    pub damage_per_turn: i64,
}

pub type StatusTimers = BTreeMap<StatusEffect, StatusTimer>;

/// Advance every timer by one turn and drop the expired ones.
///
/// Returns the effects that dealt damage this tick with their damage.
pub fn tick_status_timers(timers: &mut StatusTimers) -> Vec<(StatusEffect, i64)> {
    let mut ticks = Vec::new();
    for (effect, timer) in timers.iter_mut() {
        if timer.damage_per_turn > 0 {
            ticks.push((*effect, timer.damage_per_turn));
        }
        timer.remaining_turns = timer.remaining_turns.saturating_sub(1);
    }
    timers.retain(|_, timer| timer.remaining_turns > 0);
    ticks
}

// =============================================================================
// Buffs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    Damage,
    Defense,
}

/// A temporary combat buff from an elixir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub name: String,
    pub kind: BuffKind,
    pub magnitude: i64,
    pub remaining_turns: u32,
}

// =============================================================================
// Inventory
// =============================================================================

/// Backpack tiers, each with a fixed number of distinct-item slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpackTier {
    #[default]
    Pouch,
    Satchel,
    Rucksack,
    ExplorerPack,
    BagOfHolding,
}

impl BackpackTier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pouch => "Pouch",
            Self::Satchel => "Satchel",
            Self::Rucksack => "Rucksack",
            Self::ExplorerPack => "Explorer Pack",
            Self::BagOfHolding => "Bag of Holding",
        }
    }

    pub fn slots(&self) -> usize {
        match self {
            Self::Pouch => 6,
            Self::Satchel => 10,
            Self::Rucksack => 14,
            Self::ExplorerPack => 20,
            Self::BagOfHolding => 30,
        }
    }

    /// Player level needed before this tier can drop
    pub fn min_level(&self) -> u32 {
        match self {
            Self::Pouch => 1,
            Self::Satchel => 4,
            Self::Rucksack => 8,
            Self::ExplorerPack => 13,
            Self::BagOfHolding => 18,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pouch => Some(Self::Satchel),
            Self::Satchel => Some(Self::Rucksack),
            Self::Rucksack => Some(Self::ExplorerPack),
            Self::ExplorerPack => Some(Self::BagOfHolding),
            Self::BagOfHolding => None,
        }
    }
}

/// A loot item waiting for a free backpack slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDrop {
    pub item_name: String,
    pub item_kind: ItemKind,
}

// =============================================================================
// Monsters
// =============================================================================

/// Drop table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: String,
    pub drop_chance: f64, // 0.0 - 1.0
}

impl LootEntry {
    pub fn new(item: &str, drop_chance: f64) -> Self {
        Self { item: item.into(), drop_chance }
    }
}

/// Conditional bonus attack some boss phases use on retaliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialPower {
    pub name: String,
    pub trigger_chance: f64,
    pub bonus_damage: i64,
    pub effect: Option<StatusEffect>,
    pub effect_chance: f64,
}

/// Stats for one phase of a boss fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPhase {
    pub name: String,
    pub hp: i64,
    pub atk: i64,
    pub level: u32,
    pub xp_reward: u64,
    pub gold_reward: u64,
    pub drop_table: Vec<LootEntry>,
    pub innate_effects: Vec<StatusEffect>,
    pub double_attack: bool,
    pub crit_chance: f64,
    pub crit_damage: i64,
    pub special_power: Option<SpecialPower>,
}

/// Where a boss fight stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProgress {
    pub map_id: String,
    pub boss_name: String,
    pub phase_index: usize,
    pub phases: Vec<BossPhase>,
}

impl BossProgress {
    pub fn current_phase(&self) -> Option<&BossPhase> {
        self.phases.get(self.phase_index)
    }

    pub fn is_final_phase(&self) -> bool {
        self.phase_index + 1 >= self.phases.len()
    }
}

/// The monster the player is currently fighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterState {
    pub name: String,
    pub hp: i64,
    pub max_hp: i64,
    pub atk: i64,
    pub level: u32,
    pub xp_reward: u64,
    pub gold_reward: u64,
    pub drop_table: Vec<LootEntry>,
    pub innate_effects: Vec<StatusEffect>,
    /// Set only for bosses
    pub boss: Option<BossProgress>,
}

impl MonsterState {
    /// Project the monster view of the boss's current phase, at full HP
    pub fn from_boss(progress: BossProgress) -> Option<Self> {
        let phase = progress.current_phase()?.clone();
        Some(Self {
            name: phase.name,
            hp: phase.hp,
            max_hp: phase.hp,
            atk: phase.atk,
            level: phase.level,
            xp_reward: phase.xp_reward,
            gold_reward: phase.gold_reward,
            drop_table: phase.drop_table,
            innate_effects: phase.innate_effects,
            boss: Some(progress),
        })
    }

    /// The view of the next boss phase, or `None` for regular monsters and final phases
    pub fn next_boss_phase(&self) -> Option<Self> {
        let mut progress = self.boss.clone()?;
        if progress.is_final_phase() {
            return None;
        }
        progress.phase_index += 1;
        Self::from_boss(progress)
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Training fights such as the merchant duel grant nothing
    pub fn grants_rewards(&self) -> bool {
        self.xp_reward > 0 || self.gold_reward > 0 || !self.drop_table.is_empty()
    }

    fn phase(&self) -> Option<&BossPhase> {
        self.boss.as_ref().and_then(|b| b.current_phase())
    }

    pub fn double_attack(&self) -> bool {
        self.phase().map(|p| p.double_attack).unwrap_or(false)
    }

    /// `(chance, damage)` of the current boss phase's crit, if it has one
    pub fn boss_crit(&self) -> Option<(f64, i64)> {
        self.phase()
            .filter(|p| p.crit_chance > 0.0)
            .map(|p| (p.crit_chance, p.crit_damage))
    }

    pub fn special_power(&self) -> Option<&SpecialPower> {
        self.phase().and_then(|p| p.special_power.as_ref())
    }
}

// =============================================================================
// Player
// =============================================================================

/// Persistent player record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub id: String,
    pub name: Option<String>,
    pub class: CharacterClass,

    pub level: u32,
    pub xp: u64,
    pub hp: i64,
    pub max_hp: i64,
    pub gold: u64,

    pub equipped_weapon: String,
    pub equipped_armor: String,
    pub owned_weapons: BTreeSet<String>,
    pub owned_armors: BTreeSet<String>,
    pub inventory: BTreeMap<String, u32>,
    pub backpack: BackpackTier,
    pub pending_drop_swaps: Vec<PendingDrop>,

    pub active_monster: Option<MonsterState>,
    /// 0 while idle, counts from 1 during a fight
    pub combat_turn: u32,
    pub monster_status_effects: StatusTimers,
    pub player_status_effects: StatusTimers,
    pub active_buffs: Vec<ActiveBuff>,
    pub last_monster_name: Option<String>,
    /// Poison picked up outside combat, applied when the next fight starts
    pub pending_poison: bool,
    pub merchant_offer: bool,

    pub current_map_id: String,
    pub unlocked_map_ids: BTreeSet<String>,
    pub boss_defeated: BTreeMap<String, bool>,

    pub last_hunt_at: Option<DateTime<Utc>>,
    pub last_rest_at: Option<DateTime<Utc>>,
    pub rest_count: u32,
    pub created_at: DateTime<Utc>,
}

impl PlayerState {
    pub fn in_combat(&self) -> bool {
        self.active_monster.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Apply damage, clamping HP at 0. Returns the damage actually taken.
    pub fn take_damage(&mut self, damage: i64) -> i64 {
        let damage = damage.max(0).min(self.hp.max(0));
        self.hp = (self.hp - damage).clamp(0, self.max_hp);
        damage
    }

    /// Heal, clamping HP at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).clamp(0, self.max_hp);
        self.hp - before
    }

    /// Drop the fight and its status effects. Buffs run until their turns are spent.
    pub fn clear_combat(&mut self) {
        self.active_monster = None;
        self.combat_turn = 0;
        self.monster_status_effects.clear();
        self.player_status_effects.clear();
    }

    pub fn is_boss_defeated(&self, map_id: &str) -> bool {
        self.boss_defeated.get(map_id).copied().unwrap_or(false)
    }

    /// Sum of active buff magnitudes of one kind
    pub fn buff_total(&self, kind: BuffKind) -> i64 {
        self.active_buffs
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.magnitude)
            .sum()
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Distinct item names currently held
    pub fn slots_used(&self) -> usize {
        self.inventory.values().filter(|&&qty| qty > 0).count()
    }

    pub fn capacity(&self) -> usize {
        self.backpack.slots()
    }

    pub fn item_quantity(&self, name: &str) -> u32 {
        self.inventory.get(name).copied().unwrap_or(0)
    }

    /// Whether the item fits: either it already stacks or a slot is free
    pub fn can_add_item(&self, name: &str) -> bool {
        self.item_quantity(name) > 0 || self.slots_used() < self.capacity()
    }

    /// Add to the inventory if it fits. Returns false when the backpack is full.
    pub fn add_item_to_inventory(&mut self, name: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return true;
        }
        if !self.can_add_item(name) {
            return false;
        }
        *self.inventory.entry(name.to_string()).or_insert(0) += quantity;
        true
    }

    /// Remove items, pruning the entry at zero. Returns false if not enough are held.
    pub fn remove_item(&mut self, name: &str, quantity: u32) -> bool {
        let held = self.item_quantity(name);
        if held < quantity || held == 0 {
            return false;
        }
        if held == quantity {
            self.inventory.remove(name);
        } else {
            self.inventory.insert(name.to_string(), held - quantity);
        }
        true
    }
}
