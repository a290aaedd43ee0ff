//! Shop buying and selling with the daily offer applied.

use chrono::{Datelike, NaiveDate};
use log::debug;
use rpg_shared::{
    Catalog, GameError, ItemKind, PlayerState, PurchaseResult, SaleResult, ShopCategory,
};
use serde::{Deserialize, Serialize};

/// Shops buy back at this percentage of list price
pub const SELL_PERCENT: u64 = 40;

/// What a daily offer changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyOffer {
    /// Extra percentage paid when selling items of this kind
    SellBonus { kind: ItemKind, percent: u64 },
    /// Percentage taken off purchases on this shelf
    BuyDiscount { category: ShopCategory, percent: u64 },
}

pub const DAILY_OFFERS: [DailyOffer; 6] = [
    DailyOffer::SellBonus { kind: ItemKind::Misc, percent: 40 },
    DailyOffer::SellBonus { kind: ItemKind::Weapon, percent: 30 },
    DailyOffer::SellBonus { kind: ItemKind::Armor, percent: 30 },
    DailyOffer::BuyDiscount { category: ShopCategory::Potions, percent: 20 },
    DailyOffer::BuyDiscount { category: ShopCategory::Weapons, percent: 15 },
    DailyOffer::BuyDiscount { category: ShopCategory::Armors, percent: 15 },
];

/// The offer of the day, rotating by day of year
pub fn daily_offer(date: NaiveDate) -> DailyOffer {
    DAILY_OFFERS[date.ordinal() as usize % DAILY_OFFERS.len()]
}

pub fn buy_price(list_price: u64, category: ShopCategory, offer: DailyOffer) -> u64 {
    match offer {
        DailyOffer::BuyDiscount { category: discounted, percent } if discounted == category => {
            list_price - list_price * percent / 100
        }
        _ => list_price,
    }
}

/// Price paid for one unit
pub fn sell_price(list_price: u64, kind: ItemKind, offer: DailyOffer) -> u64 {
    let base = list_price * SELL_PERCENT / 100;
    match offer {
        DailyOffer::SellBonus { kind: boosted, percent } if boosted == kind => base + base * percent / 100,
        _ => base,
    }
}

/// List price of `item` if the shop stocks it on this shelf
fn shelf_price(catalog: &Catalog, item: &str, category: ShopCategory) -> Option<(ItemKind, u64)> {
    match category {
        ShopCategory::Potions => catalog
            .consumable(item)
            .filter(|c| !c.is_buff())
            .map(|c| (ItemKind::Consumable, c.price)),
        ShopCategory::Buffs => catalog
            .consumable(item)
            .filter(|c| c.is_buff())
            .map(|c| (ItemKind::Consumable, c.price)),
        ShopCategory::Weapons => catalog.weapon(item).map(|w| (ItemKind::Weapon, w.price)),
        ShopCategory::Armors => catalog.armor(item).map(|a| (ItemKind::Armor, a.price)),
    }
    .filter(|(_, price)| *price > 0)
}

// =============================================================================
// Buying
// =============================================================================

pub fn buy(
    catalog: &Catalog,
    player: &mut PlayerState,
    item: &str,
    category: ShopCategory,
    today: NaiveDate,
) -> Result<PurchaseResult, GameError> {
    let (kind, list_price) =
        shelf_price(catalog, item, category).ok_or_else(|| GameError::UnknownItem(item.to_string()))?;
    let price = buy_price(list_price, category, daily_offer(today));

    let already_owned = match kind {
        ItemKind::Weapon => player.owned_weapons.contains(item),
        ItemKind::Armor => player.owned_armors.contains(item),
        _ => false,
    };
    if already_owned {
        return Err(GameError::AlreadyOwned(item.to_string()));
    }
    if player.gold < price {
        return Err(GameError::InsufficientGold {
            needed: price,
            available: player.gold,
        });
    }

    match kind {
        ItemKind::Weapon => {
            player.owned_weapons.insert(item.to_string());
        }
        ItemKind::Armor => {
            player.owned_armors.insert(item.to_string());
        }
        _ => {
            if !player.add_item_to_inventory(item, 1) {
                return Err(GameError::InventoryFull { capacity: player.capacity() });
            }
        }
    }
    player.gold -= price;

    debug!("Player {} bought {} for {}", player.id, item, price);
    Ok(PurchaseResult {
        item: item.to_string(),
        kind,
        price,
        gold_left: player.gold,
    })
}

// =============================================================================
// Selling
// =============================================================================

/// Sell an owned weapon or armor, or a whole stack of consumables or trinkets
pub fn sell(
    catalog: &Catalog,
    player: &mut PlayerState,
    item: &str,
    today: NaiveDate,
) -> Result<SaleResult, GameError> {
    let kind = catalog
        .item_kind(item)
        .ok_or_else(|| GameError::UnknownItem(item.to_string()))?;
    let list_price = catalog.list_price(item).unwrap_or(0);

    let quantity = match kind {
        ItemKind::Weapon | ItemKind::Armor => {
            let (owned, equipped) = match kind {
                ItemKind::Weapon => (&mut player.owned_weapons, &player.equipped_weapon),
                _ => (&mut player.owned_armors, &player.equipped_armor),
            };
            if !owned.contains(item) {
                return Err(GameError::ItemNotOwned(item.to_string()));
            }
            if equipped == item {
                return Err(GameError::ItemEquipped(item.to_string()));
            }
            owned.remove(item);
            1
        }
        ItemKind::Consumable | ItemKind::Misc => {
            let quantity = player.item_quantity(item);
            if quantity == 0 {
                return Err(GameError::ItemNotOwned(item.to_string()));
            }
            player.remove_item(item, quantity);
            quantity
        }
    };

    let gold_earned = sell_price(list_price, kind, daily_offer(today)) * u64::from(quantity);
    player.gold += gold_earned;

    debug!("Player {} sold {}x {} for {}", player.id, quantity, item, gold_earned);
    Ok(SaleResult {
        item: item.to_string(),
        quantity,
        gold_earned,
        gold_total: player.gold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::new_player;
    use chrono::Utc;
    use rpg_shared::CharacterClass;

    /// Day 1 of the year: sell bonus on weapons
    fn weapon_sell_day() -> NaiveDate {
        NaiveDate::from_yo_opt(2026, 1).unwrap()
    }

    /// Day 3: potions 20% off
    fn potion_sale_day() -> NaiveDate {
        NaiveDate::from_yo_opt(2026, 3).unwrap()
    }

    /// Day 6: sell bonus on misc only
    fn misc_bonus_day() -> NaiveDate {
        NaiveDate::from_yo_opt(2026, 6).unwrap()
    }

    fn rich_fighter() -> PlayerState {
        let mut p = new_player("f", CharacterClass::Fighter, Utc::now());
        p.gold = 1_000;
        p
    }

    #[test]
    fn test_daily_offer_rotates_by_day_of_year() {
        assert_eq!(
            daily_offer(NaiveDate::from_yo_opt(2026, 6).unwrap()),
            DailyOffer::SellBonus { kind: ItemKind::Misc, percent: 40 }
        );
        assert_eq!(
            daily_offer(NaiveDate::from_yo_opt(2026, 1).unwrap()),
            DailyOffer::SellBonus { kind: ItemKind::Weapon, percent: 30 }
        );
        assert_eq!(
            daily_offer(NaiveDate::from_yo_opt(2026, 3).unwrap()),
            DailyOffer::BuyDiscount { category: ShopCategory::Potions, percent: 20 }
        );
    }

    #[test]
    fn test_prices() {
        let discount = DailyOffer::BuyDiscount { category: ShopCategory::Potions, percent: 20 };
        assert_eq!(buy_price(40, ShopCategory::Potions, discount), 32);
        assert_eq!(buy_price(40, ShopCategory::Buffs, discount), 40);

        let bonus = DailyOffer::SellBonus { kind: ItemKind::Misc, percent: 40 };
        assert_eq!(sell_price(25, ItemKind::Misc, bonus), 14);
        assert_eq!(sell_price(25, ItemKind::Weapon, bonus), 10);
    }

    #[test]
    fn test_buy_potion_with_discount() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        let result = buy(&catalog, &mut p, "Small Potion", ShopCategory::Potions, potion_sale_day()).unwrap();
        assert_eq!(result.price, 32);
        assert_eq!(p.gold, 968);
        assert_eq!(p.item_quantity("Small Potion"), 1);
    }

    #[test]
    fn test_buy_wrong_shelf() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        assert_eq!(
            buy(&catalog, &mut p, "Strength Elixir", ShopCategory::Potions, misc_bonus_day()),
            Err(GameError::UnknownItem("Strength Elixir".into()))
        );
        assert!(buy(&catalog, &mut p, "Strength Elixir", ShopCategory::Buffs, misc_bonus_day()).is_ok());
    }

    #[test]
    fn test_buy_rejections_leave_player_alone() {
        let catalog = Catalog::builtin();
        let mut p = new_player("f", CharacterClass::Fighter, Utc::now());
        p.gold = 10;
        let before = p.clone();

        assert_eq!(
            buy(&catalog, &mut p, "Longsword", ShopCategory::Weapons, misc_bonus_day()),
            Err(GameError::InsufficientGold { needed: 600, available: 10 })
        );
        assert_eq!(
            buy(&catalog, &mut p, "Wooden Staff", ShopCategory::Weapons, misc_bonus_day()),
            Err(GameError::AlreadyOwned("Wooden Staff".into()))
        );
        assert_eq!(p, before);
    }

    #[test]
    fn test_buy_full_backpack() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        for i in 0..p.capacity() {
            p.inventory.insert(format!("Junk {}", i), 1);
        }
        assert_eq!(
            buy(&catalog, &mut p, "Antidote", ShopCategory::Potions, misc_bonus_day()),
            Err(GameError::InventoryFull { capacity: 6 })
        );
        assert_eq!(p.gold, 1_000);
    }

    #[test]
    fn test_buy_gear_above_level() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        let result = buy(&catalog, &mut p, "Longsword", ShopCategory::Weapons, misc_bonus_day()).unwrap();
        assert_eq!(result.kind, ItemKind::Weapon);
        assert!(p.owned_weapons.contains("Longsword"));
        assert_eq!(p.equipped_weapon, "Wooden Staff");
    }

    #[test]
    fn test_sell_weapon_with_bonus() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        p.owned_weapons.insert("Longsword".into());

        let result = sell(&catalog, &mut p, "Longsword", weapon_sell_day()).unwrap();
        // 40% of 600 is 240, plus 30%
        assert_eq!(result.gold_earned, 312);
        assert!(!p.owned_weapons.contains("Longsword"));
    }

    #[test]
    fn test_sell_whole_stack() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        p.add_item_to_inventory("Small Potion", 3);

        let result = sell(&catalog, &mut p, "Small Potion", misc_bonus_day()).unwrap();
        assert_eq!(result.quantity, 3);
        assert_eq!(result.gold_earned, 48);
        assert_eq!(p.item_quantity("Small Potion"), 0);
        assert_eq!(p.slots_used(), 0);
    }

    #[test]
    fn test_sell_rejections() {
        let catalog = Catalog::builtin();
        let mut p = rich_fighter();
        assert_eq!(
            sell(&catalog, &mut p, "Wooden Staff", misc_bonus_day()),
            Err(GameError::ItemEquipped("Wooden Staff".into()))
        );
        assert_eq!(
            sell(&catalog, &mut p, "Longsword", misc_bonus_day()),
            Err(GameError::ItemNotOwned("Longsword".into()))
        );
        assert_eq!(
            sell(&catalog, &mut p, "Moonstone", misc_bonus_day()),
            Err(GameError::UnknownItem("Moonstone".into()))
        );
    }
}
