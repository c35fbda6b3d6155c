//! Core types module - shared data structures and constants
//!
//! Plain data shared by the board engine, the terminal front end and the
//! AI protocol adapter. Nothing here depends on any other crate.
//!
//! # Coordinates
//!
//! Boards are addressed by `(column, row)`:
//!
//! - **column**: 0 is the leftmost column
//! - **row**: 0 is the bottom row; rows grow towards the spawn side
//!
//! Replacement tiles enter a column from above, so freshly spawned tiles
//! briefly report a row at or past the board height.
//!
//! # Default Level
//!
//! | Constant | Value |
//! |----------|-------|
//! | `DEFAULT_ROWS` | 5 |
//! | `DEFAULT_COLUMNS` | 5 |
//! | `DEFAULT_COLOR_COUNT` | 4 |
//! | `DEFAULT_TIER_THRESHOLDS` | 2, 4, 5 |
//! | `DEFAULT_MIN_MATCH` | 2 |
//!
//! Boards are at most `MAX_DIMENSION` (64) cells in either direction.
//!
//! # Examples
//!
//! ```
//! use tui_collapse_types::{BoardState, Coord, Tier};
//!
//! let at = Coord::new(2, 0);
//! assert_eq!(at.column, 2);
//!
//! assert!(Tier::Tier3 > Tier::Tier1);
//! assert_eq!(BoardState::Interactive.as_str(), "interactive");
//! ```

/// Rows in the default level
pub const DEFAULT_ROWS: u8 = 5;

/// Columns in the default level
pub const DEFAULT_COLUMNS: u8 = 5;

/// Number of tile colors in the default level
pub const DEFAULT_COLOR_COUNT: u8 = 4;

/// Upper bounds of tiers 1..=3 in the default level
pub const DEFAULT_TIER_THRESHOLDS: [u32; 3] = [2, 4, 5];

/// Smallest cluster a selection removes
pub const DEFAULT_MIN_MATCH: u32 = 2;

/// Largest supported row or column count.
///
/// Refill tiles are numbered past the top row, so rows stay well inside `u8`.
pub const MAX_DIMENSION: u8 = 64;

/// A tile color class in `[0, color_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorType(pub u8);

impl ColorType {
    /// Zero-based color index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Icon tier a tile shows, chosen from the size of its cluster.
///
/// - **Tier1**: base icon, small or isolated clusters
/// - **Tier2**: cluster above the first threshold
/// - **Tier3**: cluster above the second threshold
/// - **Tier4**: cluster above the third threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Tier {
    #[default]
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl Tier {
    /// All tiers, lowest first
    pub const ALL: [Tier; 4] = [Tier::Tier1, Tier::Tier2, Tier::Tier3, Tier::Tier4];

    /// Zero-based tier index (Tier1 = 0)
    pub fn index(self) -> usize {
        match self {
            Tier::Tier1 => 0,
            Tier::Tier2 => 1,
            Tier::Tier3 => 2,
            Tier::Tier4 => 3,
        }
    }
}

/// Lifecycle state of a board.
///
/// Initializing → Evaluating → Interactive ⇄ Resolving → Evaluating,
/// and Evaluating → Deadlocked when no move is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardState {
    Initializing,
    Evaluating,
    Interactive,
    Resolving,
    Deadlocked,
}

impl BoardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardState::Initializing => "initializing",
            BoardState::Evaluating => "evaluating",
            BoardState::Interactive => "interactive",
            BoardState::Resolving => "resolving",
            BoardState::Deadlocked => "deadlocked",
        }
    }
}

/// A board cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub column: u8,
    pub row: u8,
}

impl Coord {
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }
}

/// Identity of a tile, unique for the lifetime of one board value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// Outbound notification emitted by the board engine.
///
/// Events are queued in emission order and drained by the caller; a
/// presentation layer replays them at its own pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    /// A tile was created. Refill tiles report a provisional row above the board.
    TileSpawned {
        id: TileId,
        at: Coord,
        color: ColorType,
    },
    /// A tile left the board as part of a removed cluster.
    TileRemoved { id: TileId, at: Coord },
    /// A tile moved during column compaction.
    TileRepositioned { id: TileId, from: Coord, to: Coord },
    /// A tile's icon tier changed during evaluation.
    TileTierChanged { id: TileId, at: Coord, tier: Tier },
    /// Evaluation finished and the board accepts selections.
    BoardSettled,
    /// Evaluation found no removable cluster.
    BoardDeadlocked,
    /// All tiles were discarded ahead of a fresh fill.
    BoardReset,
}

impl BoardEvent {
    /// Snake-case event name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardEvent::TileSpawned { .. } => "tile_spawned",
            BoardEvent::TileRemoved { .. } => "tile_removed",
            BoardEvent::TileRepositioned { .. } => "tile_repositioned",
            BoardEvent::TileTierChanged { .. } => "tile_tier_changed",
            BoardEvent::BoardSettled => "board_settled",
            BoardEvent::BoardDeadlocked => "board_deadlocked",
            BoardEvent::BoardReset => "board_reset",
        }
    }
}

/// Player-facing actions produced by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Move the cursor one column left
    CursorLeft,
    /// Move the cursor one column right
    CursorRight,
    /// Move the cursor one row up
    CursorUp,
    /// Move the cursor one row down
    CursorDown,
    /// Select the tile under the cursor
    Select,
    /// Discard the board and deal a new one
    Reset,
}
