use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::api::dto::{MoveTaskRequest, TaskResponse};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::domain::{Board, KanbanError, TaskPatch};

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<TaskResponse>, KanbanError> {
    let (board, task) = state
        .boards()?
        .mutate(user.board_key(), "update_task", |board| {
            board.update_task(&task_id, patch)
        })
        .await?;
    Ok(Json(TaskResponse { task, board }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<Json<Board>, KanbanError> {
    let (board, _) = state
        .boards()?
        .mutate(user.board_key(), "delete_task", |board| {
            board.delete_task(&task_id)
        })
        .await?;
    Ok(Json(board))
}

pub async fn move_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<Board>, KanbanError> {
    let (board, ()) = state
        .boards()?
        .mutate(user.board_key(), "move_task", |board| {
            board.move_task(
                &task_id,
                &req.source_column_id,
                &req.dest_column_id,
                req.dest_index,
            )
        })
        .await?;
    Ok(Json(board))
}
