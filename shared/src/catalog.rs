//! Read-only index over all static content.
//!
//! Built once at startup and shared by reference; nothing in here changes
//! after construction.

use std::collections::HashMap;

use crate::{
    get_armor_definitions, get_consumable_definitions, get_map_definitions,
    get_misc_item_definitions, get_monster_definitions, get_weapon_definitions, ArmorDef,
    ConsumableDef, ItemKind, MapDef, MiscItemDef, MonsterTemplate, Rarity, WeaponDef,
};

/// Indexed content catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    weapons: Vec<WeaponDef>,
    armors: Vec<ArmorDef>,
    consumables: Vec<ConsumableDef>,
    misc_items: Vec<MiscItemDef>,
    monsters: Vec<MonsterTemplate>,
    maps: Vec<MapDef>,
    weapon_index: HashMap<String, usize>,
    armor_index: HashMap<String, usize>,
    consumable_index: HashMap<String, usize>,
    misc_index: HashMap<String, usize>,
    monster_index: HashMap<String, usize>,
    map_index: HashMap<String, usize>,
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item).to_string(), i))
        .collect()
}

impl Catalog {
    /// The built-in game content
    pub fn builtin() -> Self {
        Self::new(
            get_weapon_definitions(),
            get_armor_definitions(),
            get_consumable_definitions(),
            get_misc_item_definitions(),
            get_monster_definitions(),
            get_map_definitions(),
        )
    }

    pub fn new(
        weapons: Vec<WeaponDef>,
        armors: Vec<ArmorDef>,
        consumables: Vec<ConsumableDef>,
        misc_items: Vec<MiscItemDef>,
        monsters: Vec<MonsterTemplate>,
        maps: Vec<MapDef>,
    ) -> Self {
        Self {
            weapon_index: index_by(&weapons, |w| w.name.as_str()),
            armor_index: index_by(&armors, |a| a.name.as_str()),
            consumable_index: index_by(&consumables, |c| c.name.as_str()),
            misc_index: index_by(&misc_items, |m| m.name.as_str()),
            monster_index: index_by(&monsters, |m| m.name.as_str()),
            map_index: index_by(&maps, |m| m.id.as_str()),
            weapons,
            armors,
            consumables,
            misc_items,
            monsters,
            maps,
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn weapon(&self, name: &str) -> Option<&WeaponDef> {
        self.weapon_index.get(name).map(|&i| &self.weapons[i])
    }

    pub fn armor(&self, name: &str) -> Option<&ArmorDef> {
        self.armor_index.get(name).map(|&i| &self.armors[i])
    }

    pub fn consumable(&self, name: &str) -> Option<&ConsumableDef> {
        self.consumable_index.get(name).map(|&i| &self.consumables[i])
    }

    pub fn misc_item(&self, name: &str) -> Option<&MiscItemDef> {
        self.misc_index.get(name).map(|&i| &self.misc_items[i])
    }

    pub fn monster(&self, name: &str) -> Option<&MonsterTemplate> {
        self.monster_index.get(name).map(|&i| &self.monsters[i])
    }

    pub fn map(&self, id: &str) -> Option<&MapDef> {
        self.map_index.get(id).map(|&i| &self.maps[i])
    }

    /// Classify an item name by the table it belongs to
    pub fn item_kind(&self, name: &str) -> Option<ItemKind> {
        if self.weapon_index.contains_key(name) {
            Some(ItemKind::Weapon)
        } else if self.armor_index.contains_key(name) {
            Some(ItemKind::Armor)
        } else if self.consumable_index.contains_key(name) {
            Some(ItemKind::Consumable)
        } else if self.misc_index.contains_key(name) {
            Some(ItemKind::Misc)
        } else {
            None
        }
    }

    /// List price of any item, if it has one
    pub fn list_price(&self, name: &str) -> Option<u64> {
        self.weapon(name)
            .map(|w| w.price)
            .or_else(|| self.armor(name).map(|a| a.price))
            .or_else(|| self.consumable(name).map(|c| c.price))
            .or_else(|| self.misc_item(name).map(|m| m.price))
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub fn weapons(&self) -> &[WeaponDef] {
        &self.weapons
    }

    pub fn armors(&self) -> &[ArmorDef] {
        &self.armors
    }

    pub fn consumables(&self) -> &[ConsumableDef] {
        &self.consumables
    }

    pub fn maps(&self) -> &[MapDef] {
        &self.maps
    }

    /// Purchasable weapons of one rarity a player of `level` can use
    pub fn weapons_of_rarity(&self, rarity: Rarity, level: u32) -> Vec<&WeaponDef> {
        self.weapons
            .iter()
            .filter(|w| w.rarity == rarity && w.price > 0 && w.level_req <= level)
            .collect()
    }

    /// Purchasable armors of one rarity a player of `level` can use
    pub fn armors_of_rarity(&self, rarity: Rarity, level: u32) -> Vec<&ArmorDef> {
        self.armors
            .iter()
            .filter(|a| a.rarity == rarity && a.price > 0 && a.level_req <= level)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_drop_is_in_the_catalog() {
        let catalog = Catalog::builtin();
        let monster_drops = get_monster_definitions().into_iter().flat_map(|m| m.drop_table);
        let boss_drops = get_map_definitions()
            .into_iter()
            .flat_map(|m| m.boss.phases)
            .flat_map(|p| p.drop_table);

        for entry in monster_drops.chain(boss_drops) {
            assert!(catalog.item_kind(&entry.item).is_some(), "unknown drop {}", entry.item);
        }
    }

    #[test]
    fn test_every_pool_monster_exists() {
        let catalog = Catalog::builtin();
        for map in catalog.maps() {
            for spawn in &map.pool {
                assert!(catalog.monster(&spawn.monster).is_some(), "unknown monster {}", spawn.monster);
            }
        }
    }

    #[test]
    fn test_starting_gear_exists() {
        let catalog = Catalog::builtin();
        for class in crate::CharacterClass::ALL {
            assert!(catalog.weapon(class.profile().starting_weapon).is_some());
        }
        assert!(catalog.armor(crate::STARTING_ARMOR).is_some());
    }

    #[test]
    fn test_item_kind() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.item_kind("Longsword Lv 5"), Some(ItemKind::Weapon));
        assert_eq!(catalog.item_kind("Chainmail"), Some(ItemKind::Armor));
        assert_eq!(catalog.item_kind("Antidote"), Some(ItemKind::Consumable));
        assert_eq!(catalog.item_kind("Bone"), Some(ItemKind::Misc));
        assert_eq!(catalog.item_kind("Banana"), None);
        assert_eq!(catalog.list_price("Small Potion"), Some(40));
    }
}
