use serde::{Deserialize, Serialize};

use crate::domain::{Board, Task};

#[derive(Debug, Deserialize)]
pub struct CreateColumnRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateColumnRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MoveColumnRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub source_column_id: String,
    pub dest_column_id: String,
    pub dest_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ImportTasksRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceDraftRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
    pub board: Board,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub tasks: Vec<Task>,
    pub board: Board,
}
