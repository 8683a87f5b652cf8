use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Board, BoardCommand, KanbanError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Task {
        task_id: String,
        column_id: String,
        index: usize,
    },
    Column {
        column_id: String,
        index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    TaskSlot { column_id: String, index: usize },
    ColumnSlot { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        item: DragItem,
        candidate: Option<DropTarget>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped(BoardCommand),
    Cancelled,
}

/// Ordering shown while a drag is in flight. Derived from the committed board
/// and the active drag; never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub column_order: Vec<String>,
    pub task_order: BTreeMap<String, Vec<String>>,
}

impl BoardView {
    fn from_board(board: &Board) -> Self {
        Self {
            column_order: board.column_order.clone(),
            task_order: board
                .columns
                .iter()
                .map(|(id, col)| (id.clone(), col.task_ids.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn grab(&mut self, item: DragItem) -> Result<(), KanbanError> {
        if self.is_dragging() {
            return Err(KanbanError::Validation(
                "Another drag is already in progress".into(),
            ));
        }
        self.state = DragState::Dragging {
            item,
            candidate: None,
        };
        Ok(())
    }

    /// Updates the candidate drop target as the pointer moves. `None` means
    /// the pointer is outside every valid target. A target of the wrong kind
    /// (a column slot for a task drag, or the reverse) counts as no target.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if let DragState::Dragging { item, candidate } = &mut self.state {
            *candidate = target.filter(|t| accepts(item, t));
        }
    }

    pub fn release(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Dragging {
                item,
                candidate: Some(target),
            } => match command_for(item, target) {
                Some(command) => DragOutcome::Dropped(command),
                None => DragOutcome::Cancelled,
            },
            _ => DragOutcome::Cancelled,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn projection(&self, board: &Board) -> BoardView {
        let mut view = BoardView::from_board(board);
        let DragState::Dragging {
            item,
            candidate: Some(target),
        } = &self.state
        else {
            return view;
        };

        match (item, target) {
            (DragItem::Task { task_id, .. }, DropTarget::TaskSlot { column_id, index }) => {
                if !view.task_order.contains_key(column_id) {
                    return view;
                }
                for ids in view.task_order.values_mut() {
                    ids.retain(|id| id != task_id);
                }
                if let Some(dest) = view.task_order.get_mut(column_id) {
                    let to = (*index).min(dest.len());
                    dest.insert(to, task_id.clone());
                }
            }
            (DragItem::Column { column_id, .. }, DropTarget::ColumnSlot { index }) => {
                if let Some(from) = view.column_order.iter().position(|id| id == column_id) {
                    let id = view.column_order.remove(from);
                    let to = (*index).min(view.column_order.len());
                    view.column_order.insert(to, id);
                }
            }
            _ => {}
        }
        view
    }
}

fn accepts(item: &DragItem, target: &DropTarget) -> bool {
    matches!(
        (item, target),
        (DragItem::Task { .. }, DropTarget::TaskSlot { .. })
            | (DragItem::Column { .. }, DropTarget::ColumnSlot { .. })
    )
}

fn command_for(item: DragItem, target: DropTarget) -> Option<BoardCommand> {
    match (item, target) {
        (
            DragItem::Task {
                task_id, column_id, ..
            },
            DropTarget::TaskSlot {
                column_id: dest_column_id,
                index,
            },
        ) => Some(BoardCommand::MoveTask {
            task_id,
            source_column_id: column_id,
            dest_column_id,
            dest_index: index,
        }),
        (DragItem::Column { column_id, .. }, DropTarget::ColumnSlot { index }) => {
            Some(BoardCommand::MoveColumn {
                column_id,
                dest_index: index,
            })
        }
        _ => None,
    }
}

// ── Drop results reported by the browser drag library ──────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    #[default]
    #[serde(alias = "DEFAULT", alias = "default")]
    Task,
    Column,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggableLocation {
    pub droppable_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropResult {
    pub draggable_id: String,
    #[serde(rename = "type", default)]
    pub kind: DragKind,
    pub source: DraggableLocation,
    #[serde(default)]
    pub destination: Option<DraggableLocation>,
}

impl DropResult {
    /// Replays the finished gesture through a controller so that a drop with
    /// no destination resolves to no command at all.
    pub fn into_command(self) -> Option<BoardCommand> {
        let item = match self.kind {
            DragKind::Task => DragItem::Task {
                task_id: self.draggable_id,
                column_id: self.source.droppable_id,
                index: self.source.index,
            },
            DragKind::Column => DragItem::Column {
                column_id: self.draggable_id,
                index: self.source.index,
            },
        };
        let target = self.destination.map(|dest| match self.kind {
            DragKind::Task => DropTarget::TaskSlot {
                column_id: dest.droppable_id,
                index: dest.index,
            },
            DragKind::Column => DropTarget::ColumnSlot { index: dest.index },
        });

        let mut controller = DragController::new();
        controller.grab(item).ok()?;
        controller.hover(target);
        match controller.release() {
            DragOutcome::Dropped(command) => Some(command),
            DragOutcome::Cancelled => None,
        }
    }
}
