//! The facade the chat layer talks to.
//!
//! Every operation addresses a player by id, works on a copy of the record
//! and writes it back only when the operation succeeds, so a rejected action
//! never leaves a partial change behind.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rpg_shared::{
    AttackOutcome, Catalog, CharacterClass, CombatStatus, EquipResult, FleeResult, GameError,
    HuntOutcome, ItemKind, PendingDrop, PlayerState, PurchaseResult, RestResult, SaleResult,
    ShopCategory, SwapResult, UseItemResult,
};

use crate::config::GameConfig;
use crate::persistence::{PersistenceHandle, PlayerRepository};
use crate::{combat, entities, hunt, loot, progression, shop};

/// What an action gets to work with besides the player record
struct ActionContext<'a> {
    rng: &'a mut StdRng,
    catalog: &'a Catalog,
    config: &'a GameConfig,
    now: DateTime<Utc>,
}

pub struct Game<R: PlayerRepository> {
    repo: R,
    catalog: Catalog,
    config: GameConfig,
    rng: StdRng,
    persistence: Option<PersistenceHandle>,
    /// Last debounced action per player
    last_action: HashMap<String, DateTime<Utc>>,
}

impl<R: PlayerRepository> Game<R> {
    pub fn new(repo: R, catalog: Catalog, config: GameConfig) -> Self {
        Self {
            repo,
            catalog,
            config,
            rng: StdRng::from_entropy(),
            persistence: None,
            last_action: HashMap::new(),
        }
    }

    /// Replace the random source, for reproducible runs
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Send a snapshot to this writer after every change
    pub fn with_persistence(mut self, handle: PersistenceHandle) -> Self {
        self.persistence = Some(handle);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Queue a snapshot of every player for writing
    pub fn request_save(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save_all(self.repo.snapshot());
        }
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn act<T>(
        &mut self,
        id: &str,
        debounced: bool,
        action: impl FnOnce(ActionContext<'_>, &mut PlayerState) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let now = Utc::now();
        let mut player = self
            .repo
            .get(id)
            .ok_or_else(|| GameError::NoActivePlayer(id.to_string()))?;

        if debounced {
            self.check_debounce(id, now)?;
        }

        let ctx = ActionContext {
            rng: &mut self.rng,
            catalog: &self.catalog,
            config: &self.config,
            now,
        };
        let result = action(ctx, &mut player)?;

        self.repo.upsert(player);
        self.request_save();
        Ok(result)
    }

    fn check_debounce(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), GameError> {
        if let Some(left) = entities::cooldown_remaining(
            self.last_action.get(id).copied(),
            now,
            self.config.action_debounce,
        ) {
            return Err(GameError::Throttled {
                remaining_ms: left.as_millis().max(1) as u64,
            });
        }
        self.last_action.insert(id.to_string(), now);
        Ok(())
    }

    // =========================================================================
    // Character
    // =========================================================================

    pub fn player(&self, id: &str) -> Result<PlayerState, GameError> {
        self.repo.get(id).ok_or_else(|| GameError::NoActivePlayer(id.to_string()))
    }

    /// Start a hardcore character: no gold, no XP, starting gear only
    pub fn create_player(&mut self, id: &str, class_name: &str) -> Result<PlayerState, GameError> {
        let class = CharacterClass::from_name(class_name)
            .ok_or_else(|| GameError::UnknownClass(class_name.to_string()))?;
        if self.repo.contains(id) {
            return Err(GameError::PlayerAlreadyExists(id.to_string()));
        }

        let player = entities::new_player(id, class, Utc::now());
        info!("Player {} created a {}", id, class.name());
        self.repo.upsert(player.clone());
        self.request_save();
        Ok(player)
    }

    pub fn set_name(&mut self, id: &str, name: &str) -> Result<PlayerState, GameError> {
        self.act(id, false, |_, player| {
            entities::set_name(player, name)?;
            Ok(player.clone())
        })
    }

    /// A name suggestion for players who don't want to pick one
    pub fn random_name(&mut self) -> String {
        progression::random_name(&mut self.rng)
    }

    pub fn change_map(&mut self, id: &str, map_id: &str) -> Result<String, GameError> {
        self.act(id, false, |ctx, player| entities::change_map(ctx.catalog, player, map_id))
    }

    // =========================================================================
    // Hunting and Combat
    // =========================================================================

    pub fn start_hunt(&mut self, id: &str) -> Result<HuntOutcome, GameError> {
        self.act(id, false, |ctx, player| {
            hunt::start_hunt(ctx.rng, ctx.catalog, player, ctx.now, ctx.config.hunt_cooldown)
        })
    }

    pub fn continue_hunt(&mut self, id: &str) -> Result<CombatStatus, GameError> {
        self.act(id, false, |ctx, player| hunt::continue_hunt(ctx.rng, ctx.catalog, player))
    }

    pub fn combat_status(&self, id: &str) -> Result<CombatStatus, GameError> {
        combat::current_status(&self.player(id)?)
    }

    pub fn resolve_attack(&mut self, id: &str) -> Result<AttackOutcome, GameError> {
        self.act(id, true, |ctx, player| combat::resolve_attack(ctx.rng, ctx.catalog, player))
    }

    pub fn resolve_flee(&mut self, id: &str) -> Result<FleeResult, GameError> {
        self.act(id, true, |ctx, player| combat::resolve_flee(ctx.rng, ctx.catalog, player))
    }

    pub fn buy_from_merchant(&mut self, id: &str) -> Result<PurchaseResult, GameError> {
        self.act(id, true, |ctx, player| hunt::buy_from_merchant(ctx.catalog, player))
    }

    pub fn duel_merchant(&mut self, id: &str) -> Result<CombatStatus, GameError> {
        self.act(id, false, |_, player| hunt::duel_merchant(player))
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn use_consumable(&mut self, id: &str, item: &str) -> Result<UseItemResult, GameError> {
        self.act(id, true, |ctx, player| entities::use_consumable(ctx.catalog, player, item))
    }

    pub fn equip(&mut self, id: &str, item: &str, kind: ItemKind) -> Result<EquipResult, GameError> {
        self.act(id, false, |ctx, player| entities::equip(ctx.catalog, player, item, kind))
    }

    pub fn rest(&mut self, id: &str) -> Result<RestResult, GameError> {
        self.act(id, false, |ctx, player| {
            entities::rest(player, ctx.now, ctx.config.rest_base_cooldown)
        })
    }

    pub fn resolve_pending_drop_swap(
        &mut self,
        id: &str,
        index: usize,
        discard: Option<&str>,
    ) -> Result<SwapResult, GameError> {
        self.act(id, true, |_, player| loot::resolve_pending_drop_swap(player, index, discard))
    }

    pub fn dismiss_pending_drop(&mut self, id: &str, index: usize) -> Result<PendingDrop, GameError> {
        self.act(id, false, |_, player| loot::dismiss_pending_drop(player, index))
    }

    // =========================================================================
    // Shop
    // =========================================================================

    pub fn buy(&mut self, id: &str, item: &str, category: ShopCategory) -> Result<PurchaseResult, GameError> {
        self.act(id, true, |ctx, player| {
            shop::buy(ctx.catalog, player, item, category, ctx.now.date_naive())
        })
    }

    pub fn sell(&mut self, id: &str, item: &str) -> Result<SaleResult, GameError> {
        self.act(id, true, |ctx, player| shop::sell(ctx.catalog, player, item, ctx.now.date_naive()))
    }

    pub fn daily_offer(&self) -> shop::DailyOffer {
        shop::daily_offer(Utc::now().date_naive())
    }
}
