use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::api::handlers::events::BoardEvent;
use crate::config::Config;
use crate::domain::KanbanError;
use crate::infrastructure::BoardStore;
use crate::services::{AiGateway, BoardLocks, BoardService};

#[derive(Clone)]
pub struct AppState {
    pub db: Option<SqlitePool>,
    pub events: broadcast::Sender<BoardEvent>,
    pub ai: Arc<dyn AiGateway>,
    pub board_locks: BoardLocks,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        db: Option<SqlitePool>,
        events: broadcast::Sender<BoardEvent>,
        ai: Arc<dyn AiGateway>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            db,
            events,
            ai,
            board_locks: BoardLocks::default(),
            config,
        }
    }

    pub fn require_db(&self) -> Result<&SqlitePool, KanbanError> {
        self.db
            .as_ref()
            .ok_or_else(|| KanbanError::Internal("Database not available".into()))
    }

    pub fn boards(&self) -> Result<BoardService, KanbanError> {
        Ok(BoardService {
            store: BoardStore::new(self.require_db()?.clone()),
            locks: self.board_locks.clone(),
            events: self.events.clone(),
        })
    }
}
