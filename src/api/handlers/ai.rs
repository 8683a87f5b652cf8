use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{EnhanceDraftRequest, ImportResponse, ImportTasksRequest, TaskResponse};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::domain::{AiResponse, KanbanError};

/// Enhances a task that has not been saved yet, e.g. from the create dialog.
pub async fn enhance_draft(
    State(state): State<AppState>,
    Json(req): Json<EnhanceDraftRequest>,
) -> Result<Json<AiResponse>, KanbanError> {
    if req.title.trim().is_empty() {
        return Err(KanbanError::Validation(
            "A title is required before enhancing".into(),
        ));
    }

    let suggestion = state.ai.enhance_task(&req.title, &req.description).await?;
    Ok(Json(suggestion))
}

/// Returns a suggestion for an existing task without touching the board. The
/// client decides whether to apply it.
pub async fn enhance_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<Json<AiResponse>, KanbanError> {
    let board = state.boards()?.load(user.board_key()).await?;
    let task = board.task(&task_id)?;
    let description = task.description.clone().unwrap_or_default();

    tracing::info!(task_id = task_id.as_str(), "Requesting AI enhancement");
    let suggestion = state.ai.enhance_task(&task.title, &description).await?;
    Ok(Json(suggestion))
}

pub async fn apply_enhancement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(suggestion): Json<AiResponse>,
) -> Result<Json<TaskResponse>, KanbanError> {
    suggestion
        .validate()
        .map_err(|e| KanbanError::Validation(e.to_string()))?;

    let (board, task) = state
        .boards()?
        .mutate(user.board_key(), "apply_enhancement", |board| {
            board.merge_ai_enhancement(&task_id, &suggestion)
        })
        .await?;
    Ok(Json(TaskResponse { task, board }))
}

/// Turns free-form notes into tasks appended to a column. The board lock is
/// not held during the gateway call; the drafts are committed in one
/// mutation afterwards, so a failure leaves the board untouched.
pub async fn import_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(column_id): Path<String>,
    Json(req): Json<ImportTasksRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), KanbanError> {
    if req.text.trim().is_empty() {
        return Err(KanbanError::Validation("No text to import".into()));
    }

    let boards = state.boards()?;
    boards.load(user.board_key()).await?.column(&column_id)?;

    let drafts = state.ai.generate_tasks(&req.text).await?;
    tracing::info!(
        column_id = column_id.as_str(),
        drafts = drafts.len(),
        "AI generated task drafts"
    );

    let (board, tasks) = boards
        .mutate(user.board_key(), "import_tasks", |board| {
            board.import_drafts(&column_id, &drafts)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ImportResponse { tasks, board })))
}
