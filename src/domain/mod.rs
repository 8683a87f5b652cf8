pub mod board;
pub mod drag;
pub mod error;
pub mod resize;
pub mod task;

pub use board::{Board, BoardCommand, Column};
pub use drag::{DragController, DragItem, DragOutcome, DropResult, DropTarget};
pub use error::KanbanError;
pub use resize::ColumnResize;
pub use task::{AiResponse, Priority, Task, TaskDraft, TaskFields, TaskPatch};
