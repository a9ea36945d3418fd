//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{
    catalog::Catalog,
    config::Config,
    runner::CodeRunner,
    services::{EvaluationService, MatchmakingService, RoomService, Sweeper},
    store::{QueueStore, RoomStore},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    matchmaking: MatchmakingService,
    rooms: RoomService,
    evaluator: EvaluationService,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Wire the services on top of the chosen stores and runner
    pub fn new(
        config: Config,
        queue: Arc<dyn QueueStore>,
        room_store: Arc<dyn RoomStore>,
        catalog: Arc<Catalog>,
        runner: Arc<dyn CodeRunner>,
    ) -> Self {
        let rooms = RoomService::new(room_store, catalog);
        let matchmaking = MatchmakingService::new(queue, rooms.clone());
        let evaluator = EvaluationService::new(
            rooms.clone(),
            runner,
            config.battle.default_language.clone(),
            config.battle.max_source_bytes,
        );

        Self {
            inner: Arc::new(AppStateInner {
                matchmaking,
                rooms,
                evaluator,
                config,
            }),
        }
    }

    pub fn matchmaking(&self) -> &MatchmakingService {
        &self.inner.matchmaking
    }

    pub fn rooms(&self) -> &RoomService {
        &self.inner.rooms
    }

    pub fn evaluator(&self) -> &EvaluationService {
        &self.inner.evaluator
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Background sweeper sharing this state's stores
    pub fn sweeper(&self) -> Sweeper {
        let config = self.config();
        Sweeper::new(
            self.matchmaking().clone(),
            self.rooms().clone(),
            config.matchmaking.queue_idle_timeout(),
            config.battle.completed_room_ttl(),
            config.battle.sweep_interval(),
        )
    }
}
