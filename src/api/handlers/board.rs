use axum::{
    extract::{Extension, State},
    Json,
};

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::domain::{Board, DropResult, KanbanError};

pub async fn get_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Board>, KanbanError> {
    let board = state.boards()?.load(user.board_key()).await?;
    Ok(Json(board))
}

pub async fn save_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(board): Json<Board>,
) -> Result<Json<Board>, KanbanError> {
    let board = state
        .boards()?
        .replace(user.board_key(), "save_board", board)
        .await?;
    Ok(Json(board))
}

pub async fn reset_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Board>, KanbanError> {
    let board = state
        .boards()?
        .replace(user.board_key(), "reset_board", Board::seed())
        .await?;
    Ok(Json(board))
}

/// Applies the outcome of a finished drag gesture. A drop outside any target
/// leaves the board as it was.
pub async fn apply_drop(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(drop): Json<DropResult>,
) -> Result<Json<Board>, KanbanError> {
    let boards = state.boards()?;

    let Some(command) = drop.into_command() else {
        tracing::debug!(board_key = user.board_key(), "Drag cancelled, nothing to apply");
        return Ok(Json(boards.load(user.board_key()).await?));
    };

    let (board, ()) = boards
        .mutate(user.board_key(), "drop", |board| board.apply(&command))
        .await?;
    Ok(Json(board))
}
