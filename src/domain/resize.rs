use super::board::clamp_width;
use super::BoardCommand;

/// Transient width tracking for a column edge drag. Only `release` produces
/// a command, and it always carries the most recent width.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnResize {
    column_id: String,
    start_x: f64,
    start_width: u32,
    current_width: u32,
}

impl ColumnResize {
    pub fn begin(column_id: impl Into<String>, start_x: f64, start_width: u32) -> Self {
        let start_width = clamp_width(start_width as i64);
        Self {
            column_id: column_id.into(),
            start_x,
            start_width,
            current_width: start_width,
        }
    }

    pub fn pointer_moved(&mut self, x: f64) -> u32 {
        // Float-to-int casts saturate, so the sum must saturate too.
        let delta = (x - self.start_x).round() as i64;
        self.current_width = clamp_width((self.start_width as i64).saturating_add(delta));
        self.current_width
    }

    pub fn current_width(&self) -> u32 {
        self.current_width
    }

    pub fn release(self) -> BoardCommand {
        BoardCommand::ResizeColumn {
            column_id: self.column_id,
            width: self.current_width as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH};
    use crate::domain::Board;

    #[test]
    fn test_release_commits_final_width_not_start_width() {
        let mut resize = ColumnResize::begin("col-1", 100.0, 320);
        resize.pointer_moved(150.0);
        resize.pointer_moved(220.0);
        resize.pointer_moved(180.0);

        assert_eq!(
            resize.release(),
            BoardCommand::ResizeColumn {
                column_id: "col-1".into(),
                width: 400,
            }
        );
    }

    #[test]
    fn test_live_width_is_clamped() {
        let mut resize = ColumnResize::begin("col-1", 0.0, 320);
        assert_eq!(resize.pointer_moved(-500.0), MIN_COLUMN_WIDTH);
        assert_eq!(resize.pointer_moved(2000.0), MAX_COLUMN_WIDTH);
        assert_eq!(resize.current_width(), MAX_COLUMN_WIDTH);
    }

    #[test]
    fn test_extreme_pointer_positions_clamp() {
        let mut resize = ColumnResize::begin("col-1", 0.0, 320);
        assert_eq!(resize.pointer_moved(f64::INFINITY), MAX_COLUMN_WIDTH);
        assert_eq!(resize.pointer_moved(f64::NEG_INFINITY), MIN_COLUMN_WIDTH);
        assert_eq!(resize.pointer_moved(f64::MAX), MAX_COLUMN_WIDTH);
        assert_eq!(resize.pointer_moved(f64::NAN), 320);
    }

    #[test]
    fn test_release_without_movement_keeps_width() {
        let resize = ColumnResize::begin("col-2", 40.0, 320);
        let mut board = Board::seed();
        board.apply(&resize.release()).unwrap();
        assert_eq!(board.columns["col-2"].width, 320);
    }

    #[test]
    fn test_committed_width_lands_on_board() {
        let mut resize = ColumnResize::begin("col-3", 10.0, 320);
        resize.pointer_moved(90.5);
        let mut board = Board::seed();
        board.apply(&resize.release()).unwrap();
        assert_eq!(board.columns["col-3"].width, 401);
    }
}
