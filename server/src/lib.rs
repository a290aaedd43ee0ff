//! Combat and progression engine for a button-driven chat RPG.
//!
//! [`game::Game`] is the entry point: it owns the player table, the content
//! catalog and the random source, and exposes every player action by id.

pub mod combat;
pub mod commands;
pub mod config;
pub mod entities;
pub mod game;
pub mod hunt;
pub mod loot;
pub mod persistence;
pub mod progression;
pub mod random;
pub mod shop;
pub mod stats;

pub use config::GameConfig;
pub use game::Game;
