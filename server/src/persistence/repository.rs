//! Where live player records are kept between actions.

use rpg_shared::PlayerState;

use super::store::PlayerMap;

/// Storage for the player table used by the game facade
pub trait PlayerRepository {
    /// A copy of the player's record
    fn get(&self, id: &str) -> Option<PlayerState>;

    /// Insert or replace a record
    fn upsert(&mut self, player: PlayerState);

    /// Every record, for writing to disk
    fn snapshot(&self) -> PlayerMap;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// The player table held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    players: PlayerMap,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from records loaded off disk
    pub fn with_players(players: PlayerMap) -> Self {
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerRepository for InMemoryRepository {
    fn get(&self, id: &str) -> Option<PlayerState> {
        self.players.get(id).cloned()
    }

    fn upsert(&mut self, player: PlayerState) {
        self.players.insert(player.id.clone(), player);
    }

    fn snapshot(&self) -> PlayerMap {
        self.players.clone()
    }

    fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }
}
