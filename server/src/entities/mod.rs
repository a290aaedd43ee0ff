//! Server-side entity construction and player actions.

pub mod player;
mod enemy;

pub use player::{
    ceil_secs, change_map, cooldown_remaining, equip, new_player, rest, rest_cooldown, set_name,
    use_consumable,
};
pub use enemy::{boss_monster, merchant_duelist, scale_monster, MERCHANT_NAME};
