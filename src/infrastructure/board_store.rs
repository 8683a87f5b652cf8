use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::domain::{Board, Column, KanbanError, Priority, Task};

#[derive(Debug, FromRow)]
struct ColumnRow {
    id: String,
    title: String,
    width: i64,
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    column_id: String,
    title: String,
    description: Option<String>,
    priority: String,
    tags: String,
    story_points: Option<i64>,
    created_at: i64,
    acceptance_criteria: Option<String>,
}

impl TaskRow {
    fn into_task(self) -> Result<(String, Task), KanbanError> {
        let priority: Priority = self
            .priority
            .parse()
            .map_err(|e: String| KanbanError::Internal(format!("Invalid priority in DB: {}", e)))?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;
        let acceptance_criteria = self
            .acceptance_criteria
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()?;

        let task = Task {
            id: self.id,
            title: self.title,
            description: self.description,
            priority,
            tags,
            story_points: self.story_points.and_then(|p| u32::try_from(p).ok()),
            created_at: self.created_at,
            acceptance_criteria,
        };
        Ok((self.column_id, task))
    }
}

/// Durable home of every user's board, keyed by an opaque board key.
#[derive(Clone, Debug)]
pub struct BoardStore {
    pool: SqlitePool,
}

impl BoardStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(&self, board_key: &str) -> Result<Option<Board>, KanbanError> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT board_key FROM boards WHERE board_key = ?")
                .bind(board_key)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let column_rows: Vec<ColumnRow> = sqlx::query_as(
            "SELECT id, title, width FROM board_columns WHERE board_key = ? ORDER BY position ASC",
        )
        .bind(board_key)
        .fetch_all(&self.pool)
        .await?;

        let task_rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, column_id, title, description, priority, tags, story_points, created_at, acceptance_criteria FROM board_tasks WHERE board_key = ? ORDER BY column_id ASC, position ASC",
        )
        .bind(board_key)
        .fetch_all(&self.pool)
        .await?;

        let mut board = Board {
            column_order: column_rows.iter().map(|c| c.id.clone()).collect(),
            columns: column_rows
                .into_iter()
                .map(|row| {
                    let column = Column {
                        id: row.id.clone(),
                        title: row.title,
                        task_ids: Vec::new(),
                        width: u32::try_from(row.width).unwrap_or_default(),
                    };
                    (row.id, column)
                })
                .collect(),
            tasks: BTreeMap::new(),
        };

        for row in task_rows {
            let (column_id, task) = row.into_task()?;
            let column = board.columns.get_mut(&column_id).ok_or_else(|| {
                KanbanError::Internal(format!(
                    "Stored task {} references missing column {}",
                    task.id, column_id
                ))
            })?;
            column.task_ids.push(task.id.clone());
            board.tasks.insert(task.id.clone(), task);
        }

        board.validate().map_err(|e| {
            tracing::error!(board_key, error = %e, "Stored board failed validation");
            KanbanError::Internal(format!("Stored board is corrupt: {}", e))
        })?;

        Ok(Some(board))
    }

    /// Replaces everything stored under `board_key` with `board` in one transaction.
    pub async fn save(&self, board_key: &str, board: &Board) -> Result<(), KanbanError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO boards (board_key, created_at, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(board_key) DO UPDATE SET updated_at = excluded.updated_at",
        )
        .bind(board_key)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM board_tasks WHERE board_key = ?")
            .bind(board_key)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM board_columns WHERE board_key = ?")
            .bind(board_key)
            .execute(&mut *tx)
            .await?;

        for (position, column_id) in board.column_order.iter().enumerate() {
            let Some(column) = board.columns.get(column_id) else {
                continue;
            };

            sqlx::query(
                "INSERT INTO board_columns (board_key, id, title, width, position) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(board_key)
            .bind(&column.id)
            .bind(&column.title)
            .bind(column.width as i64)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;

            for (task_position, task_id) in column.task_ids.iter().enumerate() {
                let Some(task) = board.tasks.get(task_id) else {
                    continue;
                };
                let acceptance_criteria = task
                    .acceptance_criteria
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;

                sqlx::query(
                    "INSERT INTO board_tasks (board_key, id, column_id, position, title, description, priority, tags, story_points, created_at, acceptance_criteria) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(board_key)
                .bind(&task.id)
                .bind(&column.id)
                .bind(task_position as i64)
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.priority.as_str())
                .bind(serde_json::to_string(&task.tags)?)
                .bind(task.story_points.map(i64::from))
                .bind(task.created_at)
                .bind(acceptance_criteria)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::debug!(
            board_key,
            columns = board.column_order.len(),
            tasks = board.tasks.len(),
            "Board saved"
        );
        Ok(())
    }
}
