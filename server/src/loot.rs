//! Loot resolution: drop tables, bonus drops, backpack upgrades and the
//! pending swap queue.
//!
//! Gear goes straight into the owned sets. Consumables and misc items need a
//! backpack slot; when none is free they wait in `pending_drop_swaps` instead
//! of being lost.

use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use rpg_shared::{
    BackpackTier, Catalog, DropOutcome, GameError, ItemKind, LootEntry, PendingDrop, PlayerState,
    Rarity, SwapResult, MAX_PENDING_DROPS,
};

use crate::random::{chance, weighted_choice};

/// Common armor bonus, only from monsters up to `COMMON_ARMOR_MAX_LEVEL`
pub const BONUS_COMMON_ARMOR_CHANCE: f64 = 0.10;
pub const COMMON_ARMOR_MAX_LEVEL: u32 = 3;
pub const BONUS_WEAPON_CHANCE: f64 = 0.08;
pub const BONUS_ARMOR_CHANCE: f64 = 0.06;
pub const BONUS_HEALING_BOOST_CHANCE: f64 = 0.12;
pub const HEALING_BOOST: &str = "Healing Boost";

/// Rarities a bonus drop may roll at an effective level
pub fn rarity_band(effective_level: u32) -> &'static [Rarity] {
    match effective_level {
        0..=3 => &[Rarity::Common],
        4..=6 => &[Rarity::Common, Rarity::Rare],
        7..=10 => &[Rarity::Common, Rarity::Rare, Rarity::Epic],
        11..=15 => &[Rarity::Rare, Rarity::Epic, Rarity::Legendary],
        _ => &[Rarity::Epic, Rarity::Legendary, Rarity::Mythic],
    }
}

// =============================================================================
// Acquisition
// =============================================================================

/// Give one unit of an item to the player, queueing it if the backpack is full
pub fn grant_item(catalog: &Catalog, player: &mut PlayerState, name: &str) -> Vec<DropOutcome> {
    match catalog.item_kind(name) {
        None => {
            warn!("Skipping unknown item {} in loot", name);
            Vec::new()
        }
        Some(ItemKind::Weapon) => {
            let level_req = catalog.weapon(name).map(|w| w.level_req).unwrap_or(1);
            vec![grant_gear(player, name, ItemKind::Weapon, level_req)]
        }
        Some(ItemKind::Armor) => {
            let level_req = catalog.armor(name).map(|a| a.level_req).unwrap_or(1);
            vec![grant_gear(player, name, ItemKind::Armor, level_req)]
        }
        Some(kind) => {
            if player.add_item_to_inventory(name, 1) {
                vec![DropOutcome::Acquired {
                    item: name.to_string(),
                    kind,
                    level_warning: None,
                }]
            } else {
                queue_pending_drop(player, name, kind)
            }
        }
    }
}

fn grant_gear(player: &mut PlayerState, name: &str, kind: ItemKind, level_req: u32) -> DropOutcome {
    let owned = match kind {
        ItemKind::Weapon => &mut player.owned_weapons,
        _ => &mut player.owned_armors,
    };
    if !owned.insert(name.to_string()) {
        return DropOutcome::AlreadyOwned { item: name.to_string() };
    }

    DropOutcome::Acquired {
        item: name.to_string(),
        kind,
        level_warning: (player.level < level_req).then_some(level_req),
    }
}

/// Put an item in the swap queue, evicting the oldest entry when it is full
pub fn queue_pending_drop(player: &mut PlayerState, name: &str, kind: ItemKind) -> Vec<DropOutcome> {
    let mut outcomes = vec![DropOutcome::Queued {
        item: name.to_string(),
        kind,
    }];

    if player.pending_drop_swaps.len() >= MAX_PENDING_DROPS {
        let evicted = player.pending_drop_swaps.remove(0);
        outcomes.push(DropOutcome::Evicted { item: evicted.item_name });
    }
    player.pending_drop_swaps.push(PendingDrop {
        item_name: name.to_string(),
        item_kind: kind,
    });

    outcomes
}

// =============================================================================
// Drop Rolls
// =============================================================================

/// Roll every entry of a drop table independently, in shuffled order
pub fn roll_drop_table<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
    table: &[LootEntry],
) -> Vec<DropOutcome> {
    let mut entries: Vec<&LootEntry> = table.iter().collect();
    entries.shuffle(rng);

    let mut outcomes = Vec::new();
    for entry in entries {
        if chance(rng, entry.drop_chance) {
            outcomes.extend(grant_item(catalog, player, &entry.item));
        }
    }
    outcomes
}

/// Extra drops rolled after every rewarding victory
pub fn roll_bonus_drops<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
    monster_level: u32,
) -> Vec<DropOutcome> {
    let mut outcomes = Vec::new();
    let effective_level = player.level.min(monster_level);

    if monster_level <= COMMON_ARMOR_MAX_LEVEL && chance(rng, BONUS_COMMON_ARMOR_CHANCE) {
        let armors: Vec<&str> = catalog
            .armors_of_rarity(Rarity::Common, player.level)
            .into_iter()
            .filter(|a| a.base_armor.is_none())
            .map(|a| a.name.as_str())
            .collect();
        if let Some(name) = armors.choose(rng) {
            outcomes.extend(grant_item(catalog, player, name));
        }
    }

    if chance(rng, BONUS_WEAPON_CHANCE) {
        if let Some(name) = pick_banded_weapon(rng, catalog, effective_level, player.level) {
            outcomes.extend(grant_item(catalog, player, &name));
        }
    }

    if chance(rng, BONUS_ARMOR_CHANCE) {
        if let Some(name) = pick_banded_armor(rng, catalog, effective_level, player.level) {
            outcomes.extend(grant_item(catalog, player, &name));
        }
    }

    if chance(rng, BONUS_HEALING_BOOST_CHANCE) {
        outcomes.extend(grant_item(catalog, player, HEALING_BOOST));
    }

    outcomes
}

/// Roll a rarity inside the band, weighted toward the common end
fn pick_rarity<R: Rng + ?Sized>(rng: &mut R, effective_level: u32) -> Option<Rarity> {
    weighted_choice(rng, rarity_band(effective_level), |r| r.drop_weight()).copied()
}

/// The rarity is rolled first; an empty shelf for it means no drop.
fn pick_banded_weapon<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    effective_level: u32,
    player_level: u32,
) -> Option<String> {
    let rarity = pick_rarity(rng, effective_level)?;
    let weapons: Vec<_> = catalog
        .weapons_of_rarity(rarity, player_level)
        .into_iter()
        .filter(|w| w.base_weapon.is_none())
        .collect();
    weapons.choose(rng).map(|w| w.name.clone())
}

fn pick_banded_armor<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    effective_level: u32,
    player_level: u32,
) -> Option<String> {
    let rarity = pick_rarity(rng, effective_level)?;
    let armors: Vec<_> = catalog
        .armors_of_rarity(rarity, player_level)
        .into_iter()
        .filter(|a| a.base_armor.is_none())
        .collect();
    armors.choose(rng).map(|a| a.name.clone())
}

// =============================================================================
// Backpack Upgrades
// =============================================================================

/// Chance of finding the next backpack tier after a victory
pub fn backpack_upgrade_chance(player_level: u32, monster_level: u32) -> f64 {
    let base = match player_level {
        0..=4 => 0.005,
        5..=9 => 0.01,
        _ => 0.015,
    };
    if monster_level >= player_level + 2 {
        base + 0.005
    } else {
        base
    }
}

/// Maybe upgrade the backpack. Never skips a tier and respects tier level minimums.
pub fn roll_backpack_upgrade<R: Rng + ?Sized>(
    rng: &mut R,
    player: &mut PlayerState,
    monster_level: u32,
) -> Option<BackpackTier> {
    let next = player.backpack.next()?;
    if player.level < next.min_level() {
        return None;
    }
    if !chance(rng, backpack_upgrade_chance(player.level, monster_level)) {
        return None;
    }

    player.backpack = next;
    info!("Player {} found a {} ({} slots)", player.id, next.name(), next.slots());
    Some(next)
}

// =============================================================================
// Pending Swaps
// =============================================================================

/// Accept a queued drop, optionally discarding a whole held stack to make room
pub fn resolve_pending_drop_swap(
    player: &mut PlayerState,
    index: usize,
    discard: Option<&str>,
) -> Result<SwapResult, GameError> {
    let pending = player
        .pending_drop_swaps
        .get(index)
        .cloned()
        .ok_or(GameError::InvalidPendingDrop(index))?;

    let discarded = match discard {
        Some(name) => {
            let quantity = player.item_quantity(name);
            if quantity == 0 {
                return Err(GameError::ItemNotOwned(name.to_string()));
            }
            player.inventory.remove(name);
            Some((name.to_string(), quantity))
        }
        None => None,
    };

    if !player.add_item_to_inventory(&pending.item_name, 1) {
        return Err(GameError::InventoryFull { capacity: player.capacity() });
    }
    player.pending_drop_swaps.remove(index);

    Ok(SwapResult {
        accepted: pending.item_name,
        discarded,
    })
}

/// Throw away a queued drop
pub fn dismiss_pending_drop(player: &mut PlayerState, index: usize) -> Result<PendingDrop, GameError> {
    if index >= player.pending_drop_swaps.len() {
        return Err(GameError::InvalidPendingDrop(index));
    }
    Ok(player.pending_drop_swaps.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player() -> PlayerState {
        PlayerState {
            id: "looter".into(),
            level: 1,
            hp: 50,
            max_hp: 50,
            ..Default::default()
        }
    }

    fn fill_backpack(p: &mut PlayerState) {
        for name in ["Slime Goo", "Bone", "Orc Hide", "Cyclops Eye", "Dragon Scale", "Gold Nugget"] {
            assert!(p.add_item_to_inventory(name, 1));
        }
    }

    #[test]
    fn test_gear_is_added_once() {
        let catalog = Catalog::builtin();
        let mut p = player();
        let first = grant_item(&catalog, &mut p, "Longsword");
        assert_eq!(
            first,
            vec![DropOutcome::Acquired {
                item: "Longsword".into(),
                kind: ItemKind::Weapon,
                level_warning: Some(3),
            }]
        );
        let second = grant_item(&catalog, &mut p, "Longsword");
        assert_eq!(second, vec![DropOutcome::AlreadyOwned { item: "Longsword".into() }]);
        assert_eq!(p.slots_used(), 0);
    }

    #[test]
    fn test_full_backpack_queues_new_items() {
        let catalog = Catalog::builtin();
        let mut p = player();
        fill_backpack(&mut p);

        let outcome = grant_item(&catalog, &mut p, "Small Potion");
        assert_eq!(
            outcome,
            vec![DropOutcome::Queued {
                item: "Small Potion".into(),
                kind: ItemKind::Consumable,
            }]
        );
        assert_eq!(p.slots_used(), p.capacity());
        assert_eq!(p.pending_drop_swaps.len(), 1);

        // Stacks still fit
        grant_item(&catalog, &mut p, "Bone");
        assert_eq!(p.item_quantity("Bone"), 2);
    }

    #[test]
    fn test_pending_queue_is_bounded() {
        let catalog = Catalog::builtin();
        let mut p = player();
        fill_backpack(&mut p);

        for _ in 0..MAX_PENDING_DROPS {
            grant_item(&catalog, &mut p, "Small Potion");
        }
        let outcome = grant_item(&catalog, &mut p, "Antidote");
        assert_eq!(p.pending_drop_swaps.len(), MAX_PENDING_DROPS);
        assert!(outcome.contains(&DropOutcome::Evicted { item: "Small Potion".into() }));
        assert_eq!(p.pending_drop_swaps.last().unwrap().item_name, "Antidote");
    }

    #[test]
    fn test_swap_discards_whole_stack() {
        let catalog = Catalog::builtin();
        let mut p = player();
        fill_backpack(&mut p);
        p.add_item_to_inventory("Bone", 4);
        grant_item(&catalog, &mut p, "Small Potion");

        let result = resolve_pending_drop_swap(&mut p, 0, Some("Bone")).unwrap();
        assert_eq!(result.accepted, "Small Potion");
        assert_eq!(result.discarded, Some(("Bone".into(), 5)));
        assert_eq!(p.item_quantity("Small Potion"), 1);
        assert!(p.pending_drop_swaps.is_empty());
        assert!(p.slots_used() <= p.capacity());
    }

    #[test]
    fn test_swap_without_room_fails() {
        let catalog = Catalog::builtin();
        let mut p = player();
        fill_backpack(&mut p);
        grant_item(&catalog, &mut p, "Small Potion");

        assert_eq!(
            resolve_pending_drop_swap(&mut p, 0, None),
            Err(GameError::InventoryFull { capacity: 6 })
        );
        assert_eq!(
            resolve_pending_drop_swap(&mut p, 0, Some("Antidote")),
            Err(GameError::ItemNotOwned("Antidote".into()))
        );
        assert_eq!(
            resolve_pending_drop_swap(&mut p, 3, None),
            Err(GameError::InvalidPendingDrop(3))
        );

        p.remove_item("Bone", 1);
        assert!(resolve_pending_drop_swap(&mut p, 0, None).is_ok());
    }

    #[test]
    fn test_dismiss_pending_drop() {
        let catalog = Catalog::builtin();
        let mut p = player();
        fill_backpack(&mut p);
        grant_item(&catalog, &mut p, "Antidote");

        let dropped = dismiss_pending_drop(&mut p, 0).unwrap();
        assert_eq!(dropped.item_name, "Antidote");
        assert!(dismiss_pending_drop(&mut p, 0).is_err());
    }

    #[test]
    fn test_drop_table_certain_and_impossible() {
        let catalog = Catalog::builtin();
        let mut p = player();
        let mut rng = StdRng::seed_from_u64(17);
        let table = vec![LootEntry::new("Slime Goo", 1.0), LootEntry::new("Dragon Scale", 0.0)];

        let drops = roll_drop_table(&mut rng, &catalog, &mut p, &table);
        assert_eq!(drops.len(), 1);
        assert_eq!(p.item_quantity("Slime Goo"), 1);
        assert_eq!(p.item_quantity("Dragon Scale"), 0);
    }

    #[test]
    fn test_banded_drops_respect_level() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..100 {
            let name = pick_banded_weapon(&mut rng, &catalog, 3, 3).unwrap();
            assert!(catalog.weapon(&name).unwrap().level_req <= 3);
            let name = pick_banded_armor(&mut rng, &catalog, 1, 1).unwrap();
            assert_eq!(catalog.armor(&name).unwrap().rarity, Rarity::Common);
        }
    }

    #[test]
    fn test_high_level_band_skips_low_rarities() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(41);
        let mut dropped = 0;
        for _ in 0..2000 {
            if let Some(name) = pick_banded_weapon(&mut rng, &catalog, 20, 20) {
                let rarity = catalog.weapon(&name).unwrap().rarity;
                assert!(!matches!(rarity, Rarity::Common | Rarity::Rare), "{} is {:?}", name, rarity);
                dropped += 1;
            }
            if let Some(name) = pick_banded_armor(&mut rng, &catalog, 12, 20) {
                assert_ne!(catalog.armor(&name).unwrap().rarity, Rarity::Common);
            }
        }
        assert!(dropped > 0);
    }

    #[test]
    fn test_band_uses_player_level_for_items() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            if let Some(name) = pick_banded_weapon(&mut rng, &catalog, 5, 5) {
                assert!(catalog.weapon(&name).unwrap().level_req <= 5);
            }
        }
        assert_eq!(rarity_band(0), &[Rarity::Common]);
        assert_eq!(rarity_band(16), &[Rarity::Epic, Rarity::Legendary, Rarity::Mythic]);
    }

    #[test]
    fn test_backpack_upgrade_needs_level() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = player();
        for _ in 0..10_000 {
            assert!(roll_backpack_upgrade(&mut rng, &mut p, 30).is_none());
        }

        p.level = 4;
        let upgraded = (0..10_000).find_map(|_| roll_backpack_upgrade(&mut rng, &mut p, 30));
        assert_eq!(upgraded, Some(BackpackTier::Satchel));
        assert_eq!(p.backpack, BackpackTier::Satchel);
    }

    #[test]
    fn test_backpack_upgrade_chance_tiers() {
        assert!((backpack_upgrade_chance(1, 1) - 0.005).abs() < 1e-9);
        assert!((backpack_upgrade_chance(1, 3) - 0.01).abs() < 1e-9);
        assert!((backpack_upgrade_chance(7, 7) - 0.01).abs() < 1e-9);
        assert!((backpack_upgrade_chance(12, 12) - 0.015).abs() < 1e-9);
    }
}
