//! Hunting: the cooldown gate, random encounters and the wandering merchant.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;
use rpg_shared::{
    Catalog, CombatStatus, EncounterEvent, GameError, HuntOutcome, ItemKind, PlayerState,
    PurchaseResult,
};

use crate::combat::{current_status, select_monster, start_combat};
use crate::entities::{ceil_secs, cooldown_remaining, merchant_duelist};
use crate::loot::grant_item;
use crate::random::{chance, weighted_choice};

/// Chance that a hunt turns into a non-combat encounter
pub const ENCOUNTER_CHANCE: f64 = 0.15;

/// The merchant sells this at a discount
pub const MERCHANT_ITEM: &str = "Small Potion";
pub const MERCHANT_DISCOUNT: f64 = 0.6;

pub const CAMPFIRE_HEAL: i64 = 10;
pub const LOST_PURSE_GOLD: std::ops::RangeInclusive<u64> = 8..=20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encounter {
    Merchant,
    Campfire,
    LostPurse,
    Potion(&'static str),
    Gold(u64),
    PoisonThorns,
    Nothing,
}

const ENCOUNTERS: [(Encounter, f64); 12] = [
    (Encounter::Merchant, 100.0),
    (Encounter::Campfire, 20.0),
    (Encounter::LostPurse, 20.0),
    (Encounter::Potion("Small Potion"), 80.0),
    (Encounter::Potion("Medium Potion"), 30.0),
    (Encounter::Potion("Large Potion"), 5.0),
    (Encounter::Gold(10), 100.0),
    (Encounter::Gold(30), 50.0),
    (Encounter::Gold(70), 10.0),
    (Encounter::Gold(120), 5.0),
    (Encounter::PoisonThorns, 20.0),
    (Encounter::Nothing, 50.0),
];

// =============================================================================
// Hunting
// =============================================================================

/// Go hunting: either an encounter or a fight.
///
/// While a fight is running the current fight is returned untouched.
pub fn start_hunt<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<HuntOutcome, GameError> {
    if player.in_combat() {
        return current_status(player).map(HuntOutcome::InProgress);
    }

    if let Some(left) = cooldown_remaining(player.last_hunt_at, now, cooldown) {
        return Err(GameError::CooldownActive {
            action: "hunt".into(),
            remaining_secs: ceil_secs(left),
        });
    }

    player.last_hunt_at = Some(now);
    player.merchant_offer = false;

    if chance(rng, ENCOUNTER_CHANCE) {
        let encounter = weighted_choice(rng, &ENCOUNTERS, |(_, weight)| *weight)
            .map(|(encounter, _)| *encounter)
            .unwrap_or(Encounter::Nothing);
        return Ok(HuntOutcome::Encounter(resolve_encounter(rng, catalog, player, encounter)));
    }

    let monster = select_monster(rng, catalog, player)?;
    Ok(HuntOutcome::Combat(start_combat(player, monster)))
}

/// Fight right after an encounter, skipping the cooldown and the encounter roll
pub fn continue_hunt<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
) -> Result<CombatStatus, GameError> {
    if let Some(monster) = &player.active_monster {
        return Err(GameError::AlreadyInCombat { monster: monster.name.clone() });
    }

    let monster = select_monster(rng, catalog, player)?;
    Ok(start_combat(player, monster))
}

/// Apply one encounter to the player
pub fn resolve_encounter<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player: &mut PlayerState,
    encounter: Encounter,
) -> EncounterEvent {
    debug!("Player {} encounter: {:?}", player.id, encounter);

    match encounter {
        Encounter::Merchant => {
            player.merchant_offer = true;
            EncounterEvent::Merchant
        }
        Encounter::Campfire => EncounterEvent::Campfire {
            healed: player.heal(CAMPFIRE_HEAL),
        },
        Encounter::LostPurse => {
            let gold = rng.gen_range(LOST_PURSE_GOLD);
            player.gold += gold;
            EncounterEvent::LostPurse { gold }
        }
        Encounter::Potion(name) => EncounterEvent::FoundPotion {
            drops: grant_item(catalog, player, name),
        },
        Encounter::Gold(gold) => {
            player.gold += gold;
            EncounterEvent::FoundGold { gold }
        }
        Encounter::PoisonThorns => {
            player.pending_poison = true;
            EncounterEvent::PoisonThorns
        }
        Encounter::Nothing => EncounterEvent::Nothing,
    }
}

// =============================================================================
// Wandering Merchant
// =============================================================================

/// Price of the merchant's potion
pub fn merchant_price(catalog: &Catalog) -> u64 {
    let list = catalog.list_price(MERCHANT_ITEM).unwrap_or(0);
    ((list as f64 * MERCHANT_DISCOUNT).floor() as u64).max(1)
}

/// Buy one discounted potion. The offer stays open.
pub fn buy_from_merchant(catalog: &Catalog, player: &mut PlayerState) -> Result<PurchaseResult, GameError> {
    if !player.merchant_offer {
        return Err(GameError::NoMerchant);
    }

    let price = merchant_price(catalog);
    if player.gold < price {
        return Err(GameError::InsufficientGold {
            needed: price,
            available: player.gold,
        });
    }
    if !player.can_add_item(MERCHANT_ITEM) {
        return Err(GameError::InventoryFull { capacity: player.capacity() });
    }

    player.gold -= price;
    player.add_item_to_inventory(MERCHANT_ITEM, 1);

    Ok(PurchaseResult {
        item: MERCHANT_ITEM.to_string(),
        kind: ItemKind::Consumable,
        price,
        gold_left: player.gold,
    })
}

/// Pick a fight with the merchant. Closes the offer.
pub fn duel_merchant(player: &mut PlayerState) -> Result<CombatStatus, GameError> {
    if let Some(monster) = &player.active_monster {
        return Err(GameError::AlreadyInCombat { monster: monster.name.clone() });
    }
    if !player.merchant_offer {
        return Err(GameError::NoMerchant);
    }

    info!("Player {} challenges the merchant", player.id);
    Ok(start_combat(player, merchant_duelist()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{new_player, MERCHANT_NAME};
    use chrono::Duration as ChronoDuration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rpg_shared::{BackpackTier, CharacterClass, CombatEvent, DropOutcome, StatusEffect};

    const COOLDOWN: Duration = Duration::from_secs(5);

    fn archer() -> PlayerState {
        new_player("a", CharacterClass::Archer, Utc::now())
    }

    #[test]
    fn test_hunt_cooldown() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc::now();
        let mut p = archer();
        p.last_hunt_at = Some(now - ChronoDuration::seconds(2));

        let before = p.clone();
        assert_eq!(
            start_hunt(&mut rng, &catalog, &mut p, now, COOLDOWN),
            Err(GameError::CooldownActive { action: "hunt".into(), remaining_secs: 3 })
        );
        assert_eq!(p, before);

        let later = now + ChronoDuration::seconds(3);
        assert!(start_hunt(&mut rng, &catalog, &mut p, later, COOLDOWN).is_ok());
        assert_eq!(p.last_hunt_at, Some(later));
    }

    #[test]
    fn test_hunt_during_combat_returns_current_fight() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = archer();
        p.last_hunt_at = Some(Utc::now());
        let status = continue_hunt(&mut rng, &catalog, &mut p).unwrap();
        let before = p.clone();

        let outcome = start_hunt(&mut rng, &catalog, &mut p, Utc::now(), COOLDOWN).unwrap();
        assert_eq!(outcome, HuntOutcome::InProgress(status));
        assert_eq!(p, before);
    }

    #[test]
    fn test_encounter_rate() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(15);
        let trials = 3_000;
        let mut encounters = 0;

        for _ in 0..trials {
            let mut p = archer();
            match start_hunt(&mut rng, &catalog, &mut p, Utc::now(), COOLDOWN).unwrap() {
                HuntOutcome::Encounter(_) => {
                    encounters += 1;
                    assert!(!p.in_combat());
                }
                HuntOutcome::Combat(_) => assert!(p.in_combat()),
                HuntOutcome::InProgress(_) => panic!("fresh player cannot be fighting"),
            }
        }

        let rate = encounters as f64 / trials as f64;
        assert!((0.12..=0.18).contains(&rate), "encounter rate {}", rate);
    }

    #[test]
    fn test_poison_thorns_apply_at_next_fight() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = archer();

        let event = resolve_encounter(&mut rng, &catalog, &mut p, Encounter::PoisonThorns);
        assert_eq!(event, EncounterEvent::PoisonThorns);
        assert!(p.pending_poison);

        let status = continue_hunt(&mut rng, &catalog, &mut p).unwrap();
        assert!(status.events.contains(&CombatEvent::PendingPoison));
        assert!(p.player_status_effects.contains_key(&StatusEffect::Poison));
        assert!(!p.pending_poison);
    }

    #[test]
    fn test_found_potion_queues_when_full() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(6);
        let mut p = archer();
        assert_eq!(p.backpack, BackpackTier::default());
        for i in 0..p.capacity() {
            p.inventory.insert(format!("Junk {}", i), 1);
        }

        let event = resolve_encounter(&mut rng, &catalog, &mut p, Encounter::Potion("Large Potion"));
        let EncounterEvent::FoundPotion { drops } = event else {
            panic!("expected a potion");
        };
        assert!(matches!(&drops[0], DropOutcome::Queued { item, .. } if item == "Large Potion"));
        assert_eq!(p.pending_drop_swaps.len(), 1);
    }

    #[test]
    fn test_gold_and_campfire() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = archer();
        p.hp = 10;

        let event = resolve_encounter(&mut rng, &catalog, &mut p, Encounter::Campfire);
        assert_eq!(event, EncounterEvent::Campfire { healed: 10 });

        resolve_encounter(&mut rng, &catalog, &mut p, Encounter::Gold(70));
        let EncounterEvent::LostPurse { gold } =
            resolve_encounter(&mut rng, &catalog, &mut p, Encounter::LostPurse)
        else {
            panic!("expected a purse");
        };
        assert!(LOST_PURSE_GOLD.contains(&gold));
        assert_eq!(p.gold, 70 + gold);
    }

    #[test]
    fn test_merchant_purchase() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(8);
        let mut p = archer();
        assert_eq!(buy_from_merchant(&catalog, &mut p), Err(GameError::NoMerchant));

        resolve_encounter(&mut rng, &catalog, &mut p, Encounter::Merchant);
        assert_eq!(
            buy_from_merchant(&catalog, &mut p),
            Err(GameError::InsufficientGold { needed: 24, available: 0 })
        );

        p.gold = 50;
        let result = buy_from_merchant(&catalog, &mut p).unwrap();
        assert_eq!(result.price, 24);
        assert_eq!(result.gold_left, 26);
        assert_eq!(p.item_quantity(MERCHANT_ITEM), 1);
        assert!(p.merchant_offer);
    }

    #[test]
    fn test_hunting_closes_merchant_offer() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = archer();
        p.merchant_offer = true;
        start_hunt(&mut rng, &catalog, &mut p, Utc::now(), COOLDOWN).unwrap();
        // A new merchant may show up, but only through a fresh encounter
        if p.in_combat() {
            assert!(!p.merchant_offer);
        }
    }

    #[test]
    fn test_duel_merchant() {
        let mut p = archer();
        assert_eq!(duel_merchant(&mut p), Err(GameError::NoMerchant));

        p.merchant_offer = true;
        let status = duel_merchant(&mut p).unwrap();
        assert_eq!(status.monster.name, MERCHANT_NAME);
        assert!(!p.merchant_offer);
        assert!(matches!(duel_merchant(&mut p), Err(GameError::AlreadyInCombat { .. })));
    }
}
