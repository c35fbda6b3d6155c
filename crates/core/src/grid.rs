//! Grid module - dense column/row storage of tiles
//!
//! Cells live in a flat vector, row-major (`row * columns + column`), so the
//! `(column, row)` and flattened addressing schemes always agree.
//! Row 0 is the bottom row.
//!
//! Read access is total: any coordinate (negative or past the edge) can be
//! queried and yields `None`. Write access is a contract: writing out of
//! bounds, writing a tile whose position disagrees with its cell, or
//! overwriting a live tile panics.

use arrayvec::ArrayVec;

use crate::config::ConfigError;
use crate::types::{ColorType, Coord, Tier, TileId};

/// A live tile on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    id: TileId,
    color: ColorType,
    position: Coord,
    tier: Tier,
}

impl Tile {
    /// New tile at `position`, showing the base tier.
    pub fn new(id: TileId, color: ColorType, position: Coord) -> Self {
        Self {
            id,
            color,
            position,
            tier: Tier::Tier1,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn color(&self) -> ColorType {
        self.color
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub(crate) fn set_position(&mut self, position: Coord) {
        self.position = position;
    }

    pub(crate) fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }
}

/// Fixed-size matrix of optional tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    columns: u8,
    rows: u8,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; columns as usize * rows as usize],
        }
    }

    /// Build a full grid from a row-major color list, bottom row first.
    ///
    /// Tile ids are assigned in list order starting at 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_collapse_core::Grid;
    /// use tui_collapse_types::ColorType;
    ///
    /// let c = |v: &[u8]| v.iter().map(|&x| ColorType(x)).collect::<Vec<_>>();
    /// let grid = Grid::from_colors(2, 2, &c(&[0, 1, 2, 3])).unwrap();
    /// assert_eq!(grid.get(1, 0).map(|t| t.color()), Some(ColorType(1)));
    /// assert_eq!(grid.get(0, 1).map(|t| t.color()), Some(ColorType(2)));
    /// assert!(grid.get(-1, 0).is_none());
    /// ```
    pub fn from_colors(columns: u8, rows: u8, colors: &[ColorType]) -> Result<Self, ConfigError> {
        let mut grid = Self::new(columns, rows);
        if colors.len() < grid.cells.len() {
            let missing = grid.coord_of(colors.len()).unwrap_or(Coord::new(0, 0));
            return Err(ConfigError::GridIncomplete {
                column: missing.column,
                row: missing.row,
            });
        }
        if colors.len() > grid.cells.len() {
            return Err(ConfigError::GridMismatch {
                columns,
                rows,
                got_columns: columns,
                got_rows: (colors.len() / columns.max(1) as usize).min(u8::MAX as usize) as u8,
            });
        }
        for (i, &color) in colors.iter().enumerate() {
            let at = Coord::new((i % columns as usize) as u8, (i / columns as usize) as u8);
            grid.cells[i] = Some(Tile::new(TileId(i as u32), color, at));
        }
        Ok(grid)
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of cells (`columns * rows`)
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Flat index for `(column, row)`, or `None` when out of bounds
    #[inline(always)]
    pub fn index(&self, column: i32, row: i32) -> Option<usize> {
        if column < 0 || row < 0 || column >= self.columns as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.columns as usize + column as usize)
    }

    /// Coordinate of a flat index, or `None` when out of bounds
    pub fn coord_of(&self, index: usize) -> Option<Coord> {
        if index >= self.cells.len() {
            return None;
        }
        let columns = self.columns as usize;
        Some(Coord::new((index % columns) as u8, (index / columns) as u8))
    }

    pub fn contains(&self, column: i32, row: i32) -> bool {
        self.index(column, row).is_some()
    }

    /// Tile at `(column, row)`; `None` for empty or out-of-bounds cells
    pub fn get(&self, column: i32, row: i32) -> Option<&Tile> {
        self.index(column, row).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_at(&self, at: Coord) -> Option<&Tile> {
        self.get(at.column as i32, at.row as i32)
    }

    /// Tile at a flat index; `None` for empty or out-of-bounds cells
    pub fn get_index(&self, index: usize) -> Option<&Tile> {
        self.cells.get(index).and_then(|cell| cell.as_ref())
    }

    /// Place `tile` at `(column, row)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of bounds, already occupied, or does not
    /// match `tile.position()`.
    pub fn set(&mut self, column: u8, row: u8, tile: Tile) {
        let idx = match self.index(column as i32, row as i32) {
            Some(idx) => idx,
            None => panic!(
                "grid write out of bounds: ({column}, {row}) on {}x{}",
                self.columns, self.rows
            ),
        };
        assert_eq!(
            tile.position(),
            Coord::new(column, row),
            "tile position disagrees with its cell"
        );
        if let Some(existing) = &self.cells[idx] {
            panic!(
                "cell ({column}, {row}) already holds tile {:?}",
                existing.id()
            );
        }
        self.cells[idx] = Some(tile);
    }

    /// Take the tile at `(column, row)` out of the grid
    pub fn remove(&mut self, column: u8, row: u8) -> Option<Tile> {
        self.index(column as i32, row as i32)
            .and_then(|idx| self.cells[idx].take())
    }

    pub(crate) fn get_mut(&mut self, at: Coord) -> Option<&mut Tile> {
        self.index(at.column as i32, at.row as i32)
            .and_then(move |idx| self.cells[idx].as_mut())
    }

    /// Live tiles in row-major order, bottom row first
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().filter_map(|cell| cell.as_ref())
    }

    /// Live tiles of one column, bottom first
    pub fn column_tiles(&self, column: u8) -> impl Iterator<Item = &Tile> + '_ {
        (0..self.rows).filter_map(move |row| self.get(column as i32, row as i32))
    }

    pub fn occupied(&self) -> usize {
        self.tiles().count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// In-bounds orthogonal neighbors of `at`: left, right, below, above
    pub fn neighbors(&self, at: Coord) -> ArrayVec<Coord, 4> {
        let mut out = ArrayVec::new();
        let (c, r) = (at.column as i32, at.row as i32);
        for (dc, dr) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            if self.contains(c + dc, r + dr) {
                out.push(Coord::new((c + dc) as u8, (r + dr) as u8));
            }
        }
        out
    }

    /// Every live tile sits on the cell its position names, and no id repeats
    pub fn is_consistent(&self) -> bool {
        let mut ids: Vec<TileId> = Vec::with_capacity(self.cells.len());
        for (idx, cell) in self.cells.iter().enumerate() {
            if let Some(tile) = cell {
                if self.coord_of(idx) != Some(tile.position()) {
                    return false;
                }
                ids.push(tile.id());
            }
        }
        ids.sort_unstable();
        ids.windows(2).all(|w| w[0] != w[1])
    }
}
