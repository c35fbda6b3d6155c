//! Board engine - the selection / removal / refill state machine
//!
//! A board is an owned value driven through `&mut self`; every call runs to
//! completion before it returns, so no caller ever observes a half-resolved
//! board. Transitions:
//!
//! - **Initializing**: fill every cell from the color source → Evaluating
//! - **Evaluating**: partition into clusters, apply tiers, then
//!   Interactive, or Deadlocked when no cluster reaches the minimum match
//! - **Interactive**: `select` removes a large enough cluster → Resolving
//! - **Resolving**: remove, spawn replacements above each column, compact
//!   columns downwards → Evaluating
//! - **Deadlocked**: only `reset` leaves it
//!
//! Everything a presentation layer needs is queued as [`BoardEvent`]s in
//! emission order; drain them with [`Board::take_events`].

use tracing::{debug, info};

use crate::cluster::{find_cluster, partition, Cluster};
use crate::config::{ConfigError, LevelConfig};
use crate::grid::{Grid, Tile};
use crate::rng::{ColorSource, SimpleRng};
use crate::snapshot::{BoardSnapshot, CellSnapshot};
use crate::tier::tier_for_size;
use crate::types::{BoardEvent, BoardState, ColorType, Coord, TileId};

/// Result of [`Board::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The board was not accepting selections
    NotInteractive(BoardState),
    /// No tile at the requested cell (out of bounds)
    NoTile,
    /// The tile's cluster is smaller than the minimum match
    TooSmall { size: usize },
    /// The cluster was removed and the board re-evaluated
    Resolved { removed: usize },
}

impl SelectOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SelectOutcome::Resolved { .. })
    }
}

/// A puzzle board and its owned color source.
#[derive(Debug, Clone)]
pub struct Board<R = SimpleRng> {
    config: LevelConfig,
    grid: Grid,
    rng: R,
    state: BoardState,
    events: Vec<BoardEvent>,
    next_tile_id: u32,
    board_id: u32,
    moves: u32,
}

impl Board<SimpleRng> {
    /// Board filled from a seeded [`SimpleRng`]
    pub fn with_seed(config: LevelConfig, seed: u32) -> Self {
        Self::new(config, SimpleRng::new(seed))
    }
}

impl<R: ColorSource> Board<R> {
    /// Create a board, fill it and evaluate it.
    ///
    /// The board is Interactive or Deadlocked when this returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_collapse_core::{Board, LevelConfig, ScriptedColors};
    /// use tui_collapse_types::BoardState;
    ///
    /// let level = LevelConfig::new(2, 2, 1, 1, 2, 3).unwrap();
    /// let board = Board::new(level, ScriptedColors::new([0]));
    /// assert_eq!(board.state(), BoardState::Interactive);
    /// ```
    pub fn new(config: LevelConfig, rng: R) -> Self {
        let mut board = Self {
            grid: Grid::new(config.columns(), config.rows()),
            config,
            rng,
            state: BoardState::Initializing,
            events: Vec::new(),
            next_tile_id: 0,
            board_id: 0,
            moves: 0,
        };
        board.initialize();
        board
    }

    /// Adopt a pre-built full grid, then evaluate it.
    ///
    /// A `TileSpawned` event is queued for every adopted tile. The color
    /// source is only used for later refills.
    pub fn with_grid(config: LevelConfig, grid: Grid, rng: R) -> Result<Self, ConfigError> {
        if grid.columns() != config.columns() || grid.rows() != config.rows() {
            return Err(ConfigError::GridMismatch {
                columns: config.columns(),
                rows: config.rows(),
                got_columns: grid.columns(),
                got_rows: grid.rows(),
            });
        }
        for idx in 0..grid.cell_count() {
            match grid.get_index(idx) {
                None => {
                    let at = grid.coord_of(idx).unwrap_or(Coord::new(0, 0));
                    return Err(ConfigError::GridIncomplete {
                        column: at.column,
                        row: at.row,
                    });
                }
                Some(tile) if tile.color().0 >= config.color_count() => {
                    return Err(ConfigError::ColorOutOfRange {
                        color: tile.color().0,
                        color_count: config.color_count(),
                    });
                }
                Some(_) => {}
            }
        }
        if !grid.is_consistent() {
            let mut ids: Vec<u32> = grid.tiles().map(|t| t.id().0).collect();
            ids.sort_unstable();
            let dup = ids.windows(2).find(|w| w[0] == w[1]).map_or(0, |w| w[0]);
            return Err(ConfigError::DuplicateTileId(dup));
        }
        let next_tile_id = grid.tiles().map(|t| t.id().0 + 1).max().unwrap_or(0);
        let mut events = Vec::with_capacity(grid.cell_count() + 1);
        for tile in grid.tiles() {
            events.push(BoardEvent::TileSpawned {
                id: tile.id(),
                at: tile.position(),
                color: tile.color(),
            });
        }

        let mut board = Self {
            config,
            grid,
            rng,
            state: BoardState::Initializing,
            events,
            next_tile_id,
            board_id: 0,
            moves: 0,
        };
        board.evaluate();
        Ok(board)
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn is_interactive(&self) -> bool {
        self.state == BoardState::Interactive
    }

    pub fn is_deadlocked(&self) -> bool {
        self.state == BoardState::Deadlocked
    }

    /// Episode counter, bumped by every [`Board::reset`]
    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    /// Selections resolved since the last fill
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Current cluster of the tile at `(column, row)`
    pub fn cluster_at(&self, column: i32, row: i32) -> Option<Cluster> {
        find_cluster(&self.grid, column, row)
    }

    /// Events queued since the last drain, oldest first
    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    /// Remove and return all queued events
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events in place, keeping the queue's allocation
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, BoardEvent> {
        self.events.drain(..)
    }

    /// Player selects the tile at `(column, row)`.
    ///
    /// Selections while not Interactive, on cells without a tile, or on
    /// clusters below the minimum match change nothing and queue no events.
    pub fn select(&mut self, column: i32, row: i32) -> SelectOutcome {
        if self.state != BoardState::Interactive {
            debug!(column, row, state = self.state.as_str(), "selection ignored");
            return SelectOutcome::NotInteractive(self.state);
        }
        let Some(cluster) = find_cluster(&self.grid, column, row) else {
            return SelectOutcome::NoTile;
        };
        if cluster.len() < self.config.min_match() as usize {
            return SelectOutcome::TooSmall {
                size: cluster.len(),
            };
        }

        self.state = BoardState::Resolving;
        let removed = self.resolve(&cluster);
        self.moves += 1;
        debug!(column, row, removed, moves = self.moves, "cluster resolved");
        self.evaluate();
        SelectOutcome::Resolved { removed }
    }

    /// Discard every tile and deal a fresh board. Allowed from any state.
    pub fn reset(&mut self) {
        info!(board_id = self.board_id, moves = self.moves, "board reset");
        self.events.push(BoardEvent::BoardReset);
        self.board_id = self.board_id.wrapping_add(1);
        self.moves = 0;
        self.initialize();
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.clear();
        out.columns = self.grid.columns();
        out.rows = self.grid.rows();
        out.cells.extend((0..self.grid.cell_count()).map(|idx| {
            self.grid.get_index(idx).map(|tile| CellSnapshot {
                id: tile.id(),
                color: tile.color(),
                tier: tile.tier(),
            })
        }));
        out.state = self.state;
        out.board_id = self.board_id;
        out.moves = self.moves;
        out.seed = self.rng.seed();
        out.color_count = self.config.color_count();
        out.thresholds = self.config.thresholds().as_array();
        out.min_match = self.config.min_match();
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut snap = BoardSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    fn initialize(&mut self) {
        self.state = BoardState::Initializing;
        let (columns, rows) = (self.config.columns(), self.config.rows());
        self.grid = Grid::new(columns, rows);
        for row in 0..rows {
            for column in 0..columns {
                let color = self.rng.next_color(self.config.color_count());
                let tile = self.spawn_tile(color, Coord::new(column, row));
                self.grid.set(column, row, tile);
            }
        }
        debug!(columns, rows, board_id = self.board_id, "board filled");
        self.evaluate();
    }

    fn spawn_tile(&mut self, color: ColorType, at: Coord) -> Tile {
        let id = TileId(self.next_tile_id);
        self.next_tile_id = self.next_tile_id.wrapping_add(1);
        self.events.push(BoardEvent::TileSpawned { id, at, color });
        Tile::new(id, color, at)
    }

    fn evaluate(&mut self) {
        self.state = BoardState::Evaluating;
        let thresholds = *self.config.thresholds();
        let min_match = self.config.min_match() as usize;
        let mut playable = false;

        for cluster in partition(&self.grid) {
            playable |= cluster.len() >= min_match;
            let tier = tier_for_size(cluster.len(), &thresholds);
            for &at in cluster.members() {
                let Some(tile) = self.grid.get_mut(at) else {
                    continue;
                };
                if tile.tier() != tier {
                    tile.set_tier(tier);
                    self.events.push(BoardEvent::TileTierChanged {
                        id: tile.id(),
                        at,
                        tier,
                    });
                }
            }
        }

        if playable {
            self.state = BoardState::Interactive;
            self.events.push(BoardEvent::BoardSettled);
        } else {
            info!(board_id = self.board_id, moves = self.moves, "board deadlocked");
            self.state = BoardState::Deadlocked;
            self.events.push(BoardEvent::BoardDeadlocked);
        }
    }

    /// Remove `cluster`, spawn one replacement per removed tile above its
    /// column, then pack every affected column from row 0 upwards.
    fn resolve(&mut self, cluster: &Cluster) -> usize {
        let (columns, rows) = (self.grid.columns(), self.grid.rows());
        let mut members = cluster.members().to_vec();
        members.sort_unstable();

        let mut removed_per_column = vec![0u8; columns as usize];
        for at in &members {
            if let Some(tile) = self.grid.remove(at.column, at.row) {
                self.events.push(BoardEvent::TileRemoved {
                    id: tile.id(),
                    at: *at,
                });
                removed_per_column[at.column as usize] += 1;
            }
        }

        let mut incoming: Vec<Vec<Tile>> = vec![Vec::new(); columns as usize];
        for column in 0..columns {
            for k in 0..removed_per_column[column as usize] {
                let color = self.rng.next_color(self.config.color_count());
                let tile = self.spawn_tile(color, Coord::new(column, rows + k));
                incoming[column as usize].push(tile);
            }
        }

        for (column, spawned) in incoming.into_iter().enumerate() {
            if spawned.is_empty() {
                continue;
            }
            let column = column as u8;
            let mut stack: Vec<Tile> = (0..rows)
                .filter_map(|row| self.grid.remove(column, row))
                .collect();
            stack.extend(spawned);
            assert_eq!(
                stack.len(),
                rows as usize,
                "column {column} does not refill to full height"
            );

            for (row, mut tile) in stack.into_iter().enumerate() {
                let to = Coord::new(column, row as u8);
                let from = tile.position();
                if from != to {
                    tile.set_position(to);
                    self.events.push(BoardEvent::TileRepositioned {
                        id: tile.id(),
                        from,
                        to,
                    });
                }
                self.grid.set(column, row as u8, tile);
            }
        }

        members.len()
    }
}
