use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{CreateColumnRequest, MoveColumnRequest, TaskResponse, UpdateColumnRequest};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::domain::{Board, KanbanError, TaskFields};

pub async fn create_column(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateColumnRequest>,
) -> Result<(StatusCode, Json<Board>), KanbanError> {
    let (board, column) = state
        .boards()?
        .mutate(user.board_key(), "add_column", |board| {
            board.add_column(&req.title)
        })
        .await?;

    tracing::info!(column_id = column.id.as_str(), "Column added");
    Ok((StatusCode::CREATED, Json(board)))
}

/// Commits a rename and/or a final resize width. Both are validated before
/// either is applied.
pub async fn update_column(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(column_id): Path<String>,
    Json(req): Json<UpdateColumnRequest>,
) -> Result<Json<Board>, KanbanError> {
    if req.title.is_none() && req.width.is_none() {
        return Err(KanbanError::Validation(
            "Nothing to update: provide a title or a width".into(),
        ));
    }

    let (board, ()) = state
        .boards()?
        .mutate(user.board_key(), "update_column", |board| {
            let mut next = board.clone();
            if let Some(title) = &req.title {
                next.rename_column(&column_id, title)?;
            }
            if let Some(width) = req.width {
                next.resize_column(&column_id, width)?;
            }
            *board = next;
            Ok(())
        })
        .await?;
    Ok(Json(board))
}

pub async fn delete_column(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(column_id): Path<String>,
) -> Result<Json<Board>, KanbanError> {
    let (board, removed) = state
        .boards()?
        .mutate(user.board_key(), "delete_column", |board| {
            board.delete_column(&column_id)
        })
        .await?;

    tracing::info!(
        column_id = column_id.as_str(),
        removed_tasks = removed.task_ids.len(),
        "Column deleted"
    );
    Ok(Json(board))
}

pub async fn move_column(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(column_id): Path<String>,
    Json(req): Json<MoveColumnRequest>,
) -> Result<Json<Board>, KanbanError> {
    let (board, ()) = state
        .boards()?
        .mutate(user.board_key(), "move_column", |board| {
            board.move_column(&column_id, req.index)
        })
        .await?;
    Ok(Json(board))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(column_id): Path<String>,
    Json(fields): Json<TaskFields>,
) -> Result<(StatusCode, Json<TaskResponse>), KanbanError> {
    let (board, task) = state
        .boards()?
        .mutate(user.board_key(), "add_task", |board| {
            board.add_task(&column_id, fields)
        })
        .await?;

    tracing::info!(
        column_id = column_id.as_str(),
        task_id = task.id.as_str(),
        "Task created"
    );
    Ok((StatusCode::CREATED, Json(TaskResponse { task, board })))
}
