use crate::types::{BoardState, ColorType, TileId, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSnapshot {
    pub id: TileId,
    pub color: ColorType,
    pub tier: Tier,
}

/// Plain-data view of a board for renderers and the protocol adapter.
///
/// `cells` is row-major with row 0 (the bottom row) first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    pub columns: u8,
    pub rows: u8,
    pub cells: Vec<Option<CellSnapshot>>,
    pub state: BoardState,
    pub board_id: u32,
    pub moves: u32,
    pub seed: u32,
    pub color_count: u8,
    pub thresholds: [u32; 3],
    pub min_match: u32,
}

impl BoardSnapshot {
    /// Reset to an empty board, keeping the cell buffer's allocation
    pub fn clear(&mut self) {
        self.columns = 0;
        self.rows = 0;
        self.cells.clear();
        self.state = BoardState::Initializing;
        self.board_id = 0;
        self.moves = 0;
        self.seed = 0;
        self.color_count = 0;
        self.thresholds = [0; 3];
        self.min_match = 0;
    }

    pub fn get(&self, column: i32, row: i32) -> Option<CellSnapshot> {
        if column < 0 || row < 0 || column >= self.columns as i32 || row >= self.rows as i32 {
            return None;
        }
        let idx = row as usize * self.columns as usize + column as usize;
        self.cells.get(idx).copied().flatten()
    }

    pub fn playable(&self) -> bool {
        self.state == BoardState::Interactive
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            state: BoardState::Initializing,
            board_id: 0,
            moves: 0,
            seed: 0,
            color_count: 0,
            thresholds: [0; 3],
            min_match: 0,
        }
    }
}
