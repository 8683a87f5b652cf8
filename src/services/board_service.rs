use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, OwnedMutexGuard};

use crate::api::handlers::events::BoardEvent;
use crate::domain::{Board, KanbanError};
use crate::infrastructure::BoardStore;

/// One async mutex per board key, so load-modify-save cycles on the same
/// board run one at a time while different boards proceed in parallel.
#[derive(Clone, Debug, Default)]
pub struct BoardLocks {
    inner: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl BoardLocks {
    pub async fn acquire(&self, board_key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(board_key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub struct BoardService {
    pub store: BoardStore,
    pub locks: BoardLocks,
    pub events: broadcast::Sender<BoardEvent>,
}

impl BoardService {
    pub async fn load(&self, board_key: &str) -> Result<Board, KanbanError> {
        let _guard = self.locks.acquire(board_key).await;
        self.load_or_seed(board_key).await
    }

    /// Runs `f` against the current board and persists the result. Nothing is
    /// saved when `f` fails or leaves the board unchanged.
    pub async fn mutate<T, F>(
        &self,
        board_key: &str,
        action: &str,
        f: F,
    ) -> Result<(Board, T), KanbanError>
    where
        F: FnOnce(&mut Board) -> Result<T, KanbanError>,
    {
        let _guard = self.locks.acquire(board_key).await;
        let mut board = self.load_or_seed(board_key).await?;
        let before = board.clone();

        let output = match f(&mut board) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(board_key, action, error = %e, "Board mutation rejected");
                return Err(e);
            }
        };

        if board == before {
            tracing::debug!(board_key, action, "Board mutation was a no-op");
            return Ok((board, output));
        }

        self.store.save(board_key, &board).await?;
        tracing::info!(board_key, action, "Board updated");

        let _ = self.events.send(BoardEvent::BoardUpdated {
            board_key: board_key.to_string(),
            action: action.to_string(),
            board: board.clone(),
        });

        Ok((board, output))
    }

    /// Replaces the whole board with one submitted by the client. Widths are
    /// clamped first; any other inconsistency rejects the board.
    pub async fn replace(
        &self,
        board_key: &str,
        action: &str,
        mut board: Board,
    ) -> Result<Board, KanbanError> {
        board.clamp_widths();
        board.validate()?;
        let (board, ()) = self
            .mutate(board_key, action, move |current| {
                *current = board;
                Ok(())
            })
            .await?;
        Ok(board)
    }

    async fn load_or_seed(&self, board_key: &str) -> Result<Board, KanbanError> {
        if let Some(board) = self.store.load(board_key).await? {
            return Ok(board);
        }

        let board = Board::seed();
        self.store.save(board_key, &board).await?;
        tracing::info!(board_key, "Seeded new board");
        Ok(board)
    }
}
