//! Keyboard selection cursor.

use crate::types::PlayerAction;

/// Cell under the keyboard cursor. Row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub column: u8,
    pub row: u8,
}

impl Cursor {
    pub fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }

    /// Move for a cursor action, staying inside a `columns` x `rows` board.
    ///
    /// Returns true if the cursor moved. Non-cursor actions are ignored.
    pub fn apply(&mut self, action: PlayerAction, columns: u8, rows: u8) -> bool {
        let before = *self;
        match action {
            PlayerAction::CursorLeft => self.column = self.column.saturating_sub(1),
            PlayerAction::CursorRight => self.column = self.column.saturating_add(1),
            PlayerAction::CursorDown => self.row = self.row.saturating_sub(1),
            PlayerAction::CursorUp => self.row = self.row.saturating_add(1),
            PlayerAction::Select | PlayerAction::Reset => {}
        }
        self.clamp(columns, rows);
        *self != before
    }

    /// Pull the cursor back inside the board after a resize.
    pub fn clamp(&mut self, columns: u8, rows: u8) {
        self.column = self.column.min(columns.saturating_sub(1));
        self.row = self.row.min(rows.saturating_sub(1));
    }
}
