use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{normalize_description, normalize_tags};
use super::{AiResponse, KanbanError, Priority, Task, TaskDraft, TaskFields, TaskPatch};

pub const MIN_COLUMN_WIDTH: u32 = 250;
pub const MAX_COLUMN_WIDTH: u32 = 800;
pub const DEFAULT_COLUMN_WIDTH: u32 = 320;

pub fn clamp_width(width: i64) -> u32 {
    width.clamp(MIN_COLUMN_WIDTH as i64, MAX_COLUMN_WIDTH as i64) as u32
}

fn default_width() -> u32 {
    DEFAULT_COLUMN_WIDTH
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default = "default_width")]
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub tasks: BTreeMap<String, Task>,
    pub columns: BTreeMap<String, Column>,
    pub column_order: Vec<String>,
}

/// A single reordering or resize produced by a pointer gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BoardCommand {
    MoveTask {
        task_id: String,
        source_column_id: String,
        dest_column_id: String,
        dest_index: usize,
    },
    MoveColumn {
        column_id: String,
        dest_index: usize,
    },
    ResizeColumn {
        column_id: String,
        width: i64,
    },
}

fn required_title(title: &str, what: &str) -> Result<String, KanbanError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(KanbanError::Validation(format!("{} title must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

fn column_not_found(column_id: &str) -> KanbanError {
    KanbanError::NotFound(format!("Column not found: {}", column_id))
}

fn task_not_found(task_id: &str) -> KanbanError {
    KanbanError::NotFound(format!("Task not found: {}", task_id))
}

impl Board {
    /// Board every new account starts from.
    pub fn seed() -> Self {
        let now = Utc::now().timestamp_millis();

        let tasks = [
            Task {
                id: "task-1".into(),
                title: "Integrate Gemini API".into(),
                description: Some(
                    "Connect the backend service to Google Gemini for AI task enhancement.".into(),
                ),
                priority: Priority::High,
                tags: vec!["AI".into(), "Backend".into()],
                story_points: Some(5),
                created_at: now,
                acceptance_criteria: Some(vec![
                    "API Key validation".into(),
                    "Error handling".into(),
                    "Response parsing".into(),
                ]),
            },
            Task {
                id: "task-2".into(),
                title: "Design System Update".into(),
                description: Some(
                    "Refresh the color palette to match the new dark mode aesthetics.".into(),
                ),
                priority: Priority::Medium,
                tags: vec!["Design".into(), "UI".into()],
                story_points: Some(3),
                created_at: now - 100_000,
                acceptance_criteria: None,
            },
            Task {
                id: "task-3".into(),
                title: "Fix Drag Lag".into(),
                description: Some(
                    "Investigate performance drop when dragging cards with many sub-elements."
                        .into(),
                ),
                priority: Priority::Critical,
                tags: vec!["Bug".into(), "Performance".into()],
                story_points: Some(8),
                created_at: now - 200_000,
                acceptance_criteria: None,
            },
        ];

        let columns = [
            ("col-1", "To Do", vec!["task-1", "task-2"]),
            ("col-2", "In Progress", vec!["task-3"]),
            ("col-3", "Done", vec![]),
        ];

        Self {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
            columns: columns
                .iter()
                .map(|(id, title, task_ids)| {
                    (
                        id.to_string(),
                        Column {
                            id: id.to_string(),
                            title: title.to_string(),
                            task_ids: task_ids.iter().map(|t| t.to_string()).collect(),
                            width: DEFAULT_COLUMN_WIDTH,
                        },
                    )
                })
                .collect(),
            column_order: columns.iter().map(|(id, _, _)| id.to_string()).collect(),
        }
    }

    pub fn column(&self, column_id: &str) -> Result<&Column, KanbanError> {
        self.columns
            .get(column_id)
            .ok_or_else(|| column_not_found(column_id))
    }

    pub fn task(&self, task_id: &str) -> Result<&Task, KanbanError> {
        self.tasks.get(task_id).ok_or_else(|| task_not_found(task_id))
    }

    /// Column currently holding the task, if any.
    pub fn column_of(&self, task_id: &str) -> Option<&Column> {
        self.column_order
            .iter()
            .filter_map(|id| self.columns.get(id))
            .find(|col| col.task_ids.iter().any(|t| t == task_id))
    }

    // ── Columns ────────────────────────────────────────────────

    pub fn add_column(&mut self, title: &str) -> Result<Column, KanbanError> {
        let title = required_title(title, "Column")?;
        let column = Column {
            id: format!("col-{}", Uuid::new_v4()),
            title,
            task_ids: Vec::new(),
            width: DEFAULT_COLUMN_WIDTH,
        };

        self.column_order.push(column.id.clone());
        self.columns.insert(column.id.clone(), column.clone());
        Ok(column)
    }

    pub fn rename_column(&mut self, column_id: &str, title: &str) -> Result<(), KanbanError> {
        let column = self
            .columns
            .get_mut(column_id)
            .ok_or_else(|| column_not_found(column_id))?;
        column.title = required_title(title, "Column")?;
        Ok(())
    }

    /// Removes the column and every task it holds. Irreversible; callers confirm first.
    pub fn delete_column(&mut self, column_id: &str) -> Result<Column, KanbanError> {
        let column = self
            .columns
            .remove(column_id)
            .ok_or_else(|| column_not_found(column_id))?;

        self.column_order.retain(|id| id != column_id);
        for task_id in &column.task_ids {
            self.tasks.remove(task_id);
        }
        Ok(column)
    }

    pub fn resize_column(&mut self, column_id: &str, width: i64) -> Result<u32, KanbanError> {
        let column = self
            .columns
            .get_mut(column_id)
            .ok_or_else(|| column_not_found(column_id))?;
        column.width = clamp_width(width);
        Ok(column.width)
    }

    pub fn move_column(&mut self, column_id: &str, dest_index: usize) -> Result<(), KanbanError> {
        let from = self
            .column_order
            .iter()
            .position(|id| id == column_id)
            .ok_or_else(|| column_not_found(column_id))?;

        let id = self.column_order.remove(from);
        let to = dest_index.min(self.column_order.len());
        self.column_order.insert(to, id);
        Ok(())
    }

    // ── Tasks ──────────────────────────────────────────────────

    pub fn add_task(&mut self, column_id: &str, fields: TaskFields) -> Result<Task, KanbanError> {
        let title = required_title(&fields.title, "Task")?;
        let column = self
            .columns
            .get_mut(column_id)
            .ok_or_else(|| column_not_found(column_id))?;

        let task = Task {
            id: format!("task-{}", Uuid::new_v4()),
            title,
            description: normalize_description(fields.description),
            priority: fields.priority,
            tags: normalize_tags(&fields.tags),
            story_points: fields.story_points.filter(|p| *p > 0),
            created_at: Utc::now().timestamp_millis(),
            acceptance_criteria: fields.acceptance_criteria,
        };

        column.task_ids.push(task.id.clone());
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> Result<Task, KanbanError> {
        let title = patch
            .title
            .as_deref()
            .map(|t| required_title(t, "Task"))
            .transpose()?;
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| task_not_found(task_id))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = normalize_description(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(tags) = patch.tags {
            task.tags = normalize_tags(&tags);
        }
        if let Some(points) = patch.story_points {
            task.story_points = points.filter(|p| *p > 0);
        }
        if let Some(criteria) = patch.acceptance_criteria {
            task.acceptance_criteria = criteria;
        }
        Ok(task.clone())
    }

    /// Moves a task to `dest_index` of the destination column. The index is
    /// the task's final position and is clamped to the end of the list.
    pub fn move_task(
        &mut self,
        task_id: &str,
        source_column_id: &str,
        dest_column_id: &str,
        dest_index: usize,
    ) -> Result<(), KanbanError> {
        if !self.tasks.contains_key(task_id) {
            return Err(task_not_found(task_id));
        }
        if !self.columns.contains_key(dest_column_id) {
            return Err(column_not_found(dest_column_id));
        }
        let from = self
            .column(source_column_id)?
            .task_ids
            .iter()
            .position(|id| id == task_id)
            .ok_or_else(|| {
                KanbanError::NotFound(format!(
                    "Task {} is not in column {}",
                    task_id, source_column_id
                ))
            })?;

        if let Some(source) = self.columns.get_mut(source_column_id) {
            source.task_ids.remove(from);
        }
        if let Some(dest) = self.columns.get_mut(dest_column_id) {
            let to = dest_index.min(dest.task_ids.len());
            dest.task_ids.insert(to, task_id.to_string());
        }
        Ok(())
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<Task, KanbanError> {
        let task = self
            .tasks
            .remove(task_id)
            .ok_or_else(|| task_not_found(task_id))?;

        for column in self.columns.values_mut() {
            column.task_ids.retain(|id| id != task_id);
        }
        Ok(task)
    }

    pub fn merge_ai_enhancement(
        &mut self,
        task_id: &str,
        enhancement: &AiResponse,
    ) -> Result<Task, KanbanError> {
        let title = required_title(&enhancement.improved_title, "Task")?;
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| task_not_found(task_id))?;

        task.title = title;
        task.description = normalize_description(Some(enhancement.improved_description.clone()));
        task.acceptance_criteria = Some(enhancement.acceptance_criteria.clone());
        task.tags = normalize_tags(&enhancement.suggested_tags);
        task.story_points = Some(enhancement.estimated_story_points).filter(|p| *p > 0);
        Ok(task.clone())
    }

    /// Appends one task per draft to the column. Either every draft becomes a
    /// task or the board is left untouched.
    pub fn import_drafts(
        &mut self,
        column_id: &str,
        drafts: &[TaskDraft],
    ) -> Result<Vec<Task>, KanbanError> {
        if drafts.is_empty() {
            return Err(KanbanError::Validation("No tasks to import".into()));
        }
        self.column(column_id)?;

        let now = Utc::now().timestamp_millis();
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(Task {
                id: format!("task-{}", Uuid::new_v4()),
                title: required_title(&draft.title, "Task")?,
                description: normalize_description(Some(draft.description.clone())),
                priority: draft.priority,
                tags: normalize_tags(&draft.tags),
                story_points: draft.story_points.filter(|p| *p > 0),
                created_at: now,
                acceptance_criteria: None,
            });
        }

        if let Some(column) = self.columns.get_mut(column_id) {
            column.task_ids.extend(created.iter().map(|t| t.id.clone()));
        }
        for task in &created {
            self.tasks.insert(task.id.clone(), task.clone());
        }
        Ok(created)
    }

    pub fn apply(&mut self, command: &BoardCommand) -> Result<(), KanbanError> {
        match command {
            BoardCommand::MoveTask {
                task_id,
                source_column_id,
                dest_column_id,
                dest_index,
            } => self.move_task(task_id, source_column_id, dest_column_id, *dest_index),
            BoardCommand::MoveColumn {
                column_id,
                dest_index,
            } => self.move_column(column_id, *dest_index),
            BoardCommand::ResizeColumn { column_id, width } => {
                self.resize_column(column_id, *width).map(|_| ())
            }
        }
    }

    /// Brings every column width into range, the same way a resize does.
    pub fn clamp_widths(&mut self) {
        for column in self.columns.values_mut() {
            column.width = clamp_width(column.width as i64);
        }
    }

    /// Checks the referential invariants of a board submitted from outside.
    pub fn validate(&self) -> Result<(), KanbanError> {
        let mut ordered = HashSet::new();
        for column_id in &self.column_order {
            if !self.columns.contains_key(column_id) {
                return Err(KanbanError::Validation(format!(
                    "Column order references unknown column {}",
                    column_id
                )));
            }
            if !ordered.insert(column_id.as_str()) {
                return Err(KanbanError::Validation(format!(
                    "Column {} appears twice in column order",
                    column_id
                )));
            }
        }

        let mut placed = HashSet::new();
        for (key, column) in &self.columns {
            if key != &column.id {
                return Err(KanbanError::Validation(format!(
                    "Column key {} does not match id {}",
                    key, column.id
                )));
            }
            if !ordered.contains(key.as_str()) {
                return Err(KanbanError::Validation(format!(
                    "Column {} is missing from column order",
                    key
                )));
            }
            if column.title.trim().is_empty() {
                return Err(KanbanError::Validation(format!(
                    "Column {} has an empty title",
                    key
                )));
            }
            if !(MIN_COLUMN_WIDTH..=MAX_COLUMN_WIDTH).contains(&column.width) {
                return Err(KanbanError::Validation(format!(
                    "Column {} width {} is outside {}-{}",
                    key, column.width, MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH
                )));
            }
            for task_id in &column.task_ids {
                if !self.tasks.contains_key(task_id) {
                    return Err(KanbanError::Validation(format!(
                        "Column {} references unknown task {}",
                        key, task_id
                    )));
                }
                if !placed.insert(task_id.as_str()) {
                    return Err(KanbanError::Validation(format!(
                        "Task {} appears in more than one position",
                        task_id
                    )));
                }
            }
        }

        for (key, task) in &self.tasks {
            if key != &task.id {
                return Err(KanbanError::Validation(format!(
                    "Task key {} does not match id {}",
                    key, task.id
                )));
            }
            if !placed.contains(key.as_str()) {
                return Err(KanbanError::Validation(format!(
                    "Task {} is not placed in any column",
                    key
                )));
            }
            if task.title.trim().is_empty() {
                return Err(KanbanError::Validation(format!(
                    "Task {} has an empty title",
                    key
                )));
            }
            if task.story_points == Some(0) {
                return Err(KanbanError::Validation(format!(
                    "Task {} story points must be positive",
                    key
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(board: &Board, column_id: &str) -> Vec<String> {
        board.columns[column_id].task_ids.clone()
    }

    fn fields(title: &str) -> TaskFields {
        TaskFields {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_board_is_valid() {
        let board = Board::seed();
        assert!(board.validate().is_ok());
        assert_eq!(board.column_order, vec!["col-1", "col-2", "col-3"]);
        assert_eq!(ids(&board, "col-1"), vec!["task-1", "task-2"]);
        assert_eq!(board.columns["col-3"].width, DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_move_task_across_columns() {
        let mut board = Board::seed();
        board.move_task("task-2", "col-1", "col-2", 0).unwrap();

        assert_eq!(ids(&board, "col-1"), vec!["task-1"]);
        assert_eq!(ids(&board, "col-2"), vec!["task-2", "task-3"]);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_move_task_to_original_slot_is_noop() {
        let mut board = Board::seed();
        let before = board.clone();
        board.move_task("task-2", "col-1", "col-1", 1).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_task_within_column() {
        let mut board = Board::seed();
        board.move_task("task-2", "col-1", "col-1", 0).unwrap();
        assert_eq!(ids(&board, "col-1"), vec!["task-2", "task-1"]);
    }

    #[test]
    fn test_move_task_index_past_end_appends() {
        let mut board = Board::seed();
        board.move_task("task-1", "col-1", "col-2", 99).unwrap();
        assert_eq!(ids(&board, "col-2"), vec!["task-3", "task-1"]);
    }

    #[test]
    fn test_move_task_unknown_ids_leave_board_unchanged() {
        let mut board = Board::seed();
        let before = board.clone();

        assert!(matches!(
            board.move_task("task-9", "col-1", "col-2", 0),
            Err(KanbanError::NotFound(_))
        ));
        assert!(matches!(
            board.move_task("task-1", "col-1", "col-9", 0),
            Err(KanbanError::NotFound(_))
        ));
        assert!(matches!(
            board.move_task("task-1", "col-2", "col-3", 0),
            Err(KanbanError::NotFound(_))
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_add_column_rejects_blank_title() {
        let mut board = Board::seed();
        let before = board.clone();
        assert!(matches!(
            board.add_column("   "),
            Err(KanbanError::Validation(_))
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_add_column_appends_with_default_width() {
        let mut board = Board::seed();
        let column = board.add_column("  Review ").unwrap();

        assert_eq!(column.title, "Review");
        assert_eq!(column.width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(board.column_order.last(), Some(&column.id));
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_rename_column() {
        let mut board = Board::seed();
        board.rename_column("col-3", "Shipped").unwrap();
        assert_eq!(board.columns["col-3"].title, "Shipped");

        assert!(matches!(
            board.rename_column("col-3", ""),
            Err(KanbanError::Validation(_))
        ));
        assert_eq!(board.columns["col-3"].title, "Shipped");
        assert!(matches!(
            board.rename_column("col-9", "x"),
            Err(KanbanError::NotFound(_))
        ));
    }

    #[test]
    fn test_resize_column_clamps() {
        let mut board = Board::seed();
        assert_eq!(board.resize_column("col-1", 100).unwrap(), MIN_COLUMN_WIDTH);
        assert_eq!(board.resize_column("col-1", 5000).unwrap(), MAX_COLUMN_WIDTH);
        assert_eq!(board.resize_column("col-1", 5000).unwrap(), MAX_COLUMN_WIDTH);
        assert_eq!(board.resize_column("col-1", -40).unwrap(), MIN_COLUMN_WIDTH);
        assert_eq!(board.resize_column("col-1", 410).unwrap(), 410);
    }

    #[test]
    fn test_delete_column_removes_only_its_tasks() {
        let mut board = Board::seed();
        let removed = board.delete_column("col-1").unwrap();

        assert_eq!(removed.task_ids, vec!["task-1", "task-2"]);
        assert!(!board.tasks.contains_key("task-1"));
        assert!(!board.tasks.contains_key("task-2"));
        assert!(board.tasks.contains_key("task-3"));
        assert_eq!(board.column_order, vec!["col-2", "col-3"]);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_move_column() {
        let mut board = Board::seed();
        board.move_column("col-3", 0).unwrap();
        assert_eq!(board.column_order, vec!["col-3", "col-1", "col-2"]);

        board.move_column("col-3", 42).unwrap();
        assert_eq!(board.column_order, vec!["col-1", "col-2", "col-3"]);
    }

    #[test]
    fn test_add_and_delete_task() {
        let mut board = Board::seed();
        let task = board
            .add_task(
                "col-3",
                TaskFields {
                    title: "Write docs".into(),
                    tags: vec!["Docs".into(), "Docs".into()],
                    story_points: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(ids(&board, "col-3"), vec![task.id.clone()]);
        assert_eq!(task.tags, vec!["Docs"]);
        assert_eq!(task.priority, Priority::Medium);

        board.delete_task(&task.id).unwrap();
        assert!(ids(&board, "col-3").is_empty());
        assert!(board.validate().is_ok());
        assert!(matches!(
            board.delete_task(&task.id),
            Err(KanbanError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_task_patch() {
        let mut board = Board::seed();
        let patch = TaskPatch {
            title: Some("Fix drag lag on Safari".into()),
            story_points: Some(None),
            priority: Some(Priority::High),
            ..Default::default()
        };
        let task = board.update_task("task-3", patch).unwrap();

        assert_eq!(task.title, "Fix drag lag on Safari");
        assert_eq!(task.story_points, None);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.tags, vec!["Bug", "Performance"]);
    }

    #[test]
    fn test_merge_ai_enhancement_overwrites_fields() {
        let mut board = Board::seed();
        let enhancement = AiResponse {
            improved_title: "Reduce drag latency".into(),
            improved_description: "As a user I want smooth dragging".into(),
            acceptance_criteria: vec!["60fps".into(), "No jank".into(), "Profiled".into()],
            suggested_tags: vec!["Performance".into(), "Frontend".into()],
            estimated_story_points: 13,
        };

        let task = board.merge_ai_enhancement("task-3", &enhancement).unwrap();
        assert_eq!(task.title, "Reduce drag latency");
        assert_eq!(task.story_points, Some(13));
        assert_eq!(task.acceptance_criteria.as_ref().map(Vec::len), Some(3));
        assert_eq!(board.tasks["task-3"], task);

        assert!(matches!(
            board.merge_ai_enhancement("task-9", &enhancement),
            Err(KanbanError::NotFound(_))
        ));
    }

    #[test]
    fn test_merge_ai_enhancement_rejects_blank_title() {
        let mut board = Board::seed();
        let enhancement = AiResponse {
            improved_title: "   ".into(),
            improved_description: "Something".into(),
            acceptance_criteria: vec!["a".into(), "b".into(), "c".into()],
            suggested_tags: vec!["X".into(), "Y".into()],
            estimated_story_points: 3,
        };
        let before = board.clone();

        assert!(matches!(
            board.merge_ai_enhancement("task-1", &enhancement),
            Err(KanbanError::Validation(_))
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_import_drafts_appends_in_order() {
        let mut board = Board::seed();
        let drafts = vec![
            TaskDraft {
                title: "Fix login bug".into(),
                description: "Safari only".into(),
                priority: Priority::High,
                tags: vec!["Bug".into()],
                story_points: Some(3),
            },
            TaskDraft {
                title: "Update hero image".into(),
                description: "Landing page".into(),
                priority: Priority::Low,
                tags: vec!["Design".into()],
                story_points: None,
            },
        ];

        let created = board.import_drafts("col-2", &drafts).unwrap();
        assert_eq!(created.len(), 2);
        let col = ids(&board, "col-2");
        assert_eq!(col.len(), 3);
        assert_eq!(col[1], created[0].id);
        assert_eq!(col[2], created[1].id);
        assert_eq!(board.tasks[&created[1].id].title, "Update hero image");
    }

    #[test]
    fn test_import_drafts_is_all_or_nothing() {
        let mut board = Board::seed();
        let before = board.clone();

        assert!(board.import_drafts("col-1", &[]).is_err());
        let drafts = vec![
            TaskDraft {
                title: "ok".into(),
                description: String::new(),
                priority: Priority::Low,
                tags: vec![],
                story_points: None,
            },
            TaskDraft {
                title: " ".into(),
                description: String::new(),
                priority: Priority::Low,
                tags: vec![],
                story_points: None,
            },
        ];
        assert!(board.import_drafts("col-1", &drafts).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_integrity_holds_after_operation_sequence() {
        let mut board = Board::seed();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for step in 0..300 {
            let columns = board.column_order.clone();
            let pick_col = |n: u64| columns[(n as usize) % columns.len()].clone();
            match next() % 3 {
                0 => {
                    board
                        .add_task(&pick_col(next()), fields(&format!("task {}", step)))
                        .unwrap();
                }
                1 => {
                    let task_ids: Vec<String> = board.tasks.keys().cloned().collect();
                    if task_ids.is_empty() {
                        continue;
                    }
                    let task_id = &task_ids[(next() as usize) % task_ids.len()];
                    let source = board.column_of(task_id).unwrap().id.clone();
                    let dest = pick_col(next());
                    board
                        .move_task(task_id, &source, &dest, (next() % 6) as usize)
                        .unwrap();
                }
                _ => {
                    let task_ids: Vec<String> = board.tasks.keys().cloned().collect();
                    if let Some(task_id) = task_ids.get((next() as usize) % task_ids.len().max(1)) {
                        board.delete_task(task_id).unwrap();
                    }
                }
            }
            board.validate().unwrap();
        }
    }

    #[test]
    fn test_validate_rejects_orphans_and_duplicates() {
        let mut board = Board::seed();
        board
            .columns
            .get_mut("col-3")
            .unwrap()
            .task_ids
            .push("task-1".into());
        assert!(matches!(board.validate(), Err(KanbanError::Validation(_))));

        let mut board = Board::seed();
        board.columns.get_mut("col-2").unwrap().task_ids.clear();
        assert!(matches!(board.validate(), Err(KanbanError::Validation(_))));

        let mut board = Board::seed();
        board.column_order.push("col-9".into());
        assert!(matches!(board.validate(), Err(KanbanError::Validation(_))));
    }

    #[test]
    fn test_validate_applies_task_field_rules() {
        let mut board = Board::seed();
        board.tasks.get_mut("task-2").unwrap().title = "  ".into();
        assert!(matches!(board.validate(), Err(KanbanError::Validation(_))));

        let mut board = Board::seed();
        board.tasks.get_mut("task-2").unwrap().story_points = Some(0);
        assert!(matches!(board.validate(), Err(KanbanError::Validation(_))));
    }

    #[test]
    fn test_clamp_widths_repairs_out_of_range_columns() {
        let mut board = Board::seed();
        board.columns.get_mut("col-1").unwrap().width = 1200;
        board.columns.get_mut("col-2").unwrap().width = 10;
        assert!(board.validate().is_err());

        board.clamp_widths();
        assert_eq!(board.columns["col-1"].width, MAX_COLUMN_WIDTH);
        assert_eq!(board.columns["col-2"].width, MIN_COLUMN_WIDTH);
        assert_eq!(board.columns["col-3"].width, DEFAULT_COLUMN_WIDTH);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_apply_commands() {
        let mut board = Board::seed();
        board
            .apply(&BoardCommand::MoveColumn {
                column_id: "col-1".into(),
                dest_index: 2,
            })
            .unwrap();
        board
            .apply(&BoardCommand::ResizeColumn {
                column_id: "col-2".into(),
                width: 900,
            })
            .unwrap();

        assert_eq!(board.column_order, vec!["col-2", "col-3", "col-1"]);
        assert_eq!(board.columns["col-2"].width, MAX_COLUMN_WIDTH);
    }

    #[test]
    fn test_board_wire_format_is_camel_case() {
        let json = serde_json::to_value(Board::seed()).unwrap();
        assert!(json["columnOrder"].is_array());
        assert_eq!(json["columns"]["col-1"]["taskIds"][0], "task-1");
        assert_eq!(json["tasks"]["task-1"]["storyPoints"], 5);
        assert_eq!(json["tasks"]["task-1"]["priority"], "HIGH");
        assert!(json["tasks"]["task-1"]["createdAt"].is_i64());
    }
}
