//! Data model and static content for the RPG engine.

pub mod catalog;
pub mod classes;
pub mod entities;
pub mod items;
pub mod maps;
pub mod monsters;
pub mod protocol;

pub use catalog::*;
pub use classes::*;
pub use entities::*;
pub use items::*;
pub use maps::*;
pub use monsters::*;
pub use protocol::*;
