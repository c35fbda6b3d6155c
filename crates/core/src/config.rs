//! Level configuration - grid size, palette and tier thresholds
//!
//! A `LevelConfig` is validated once when it is built; a board never exists
//! for an invalid configuration.

use thiserror::Error;

use crate::types::{
    DEFAULT_COLOR_COUNT, DEFAULT_COLUMNS, DEFAULT_MIN_MATCH, DEFAULT_ROWS,
    DEFAULT_TIER_THRESHOLDS, MAX_DIMENSION,
};

/// Rejected level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board must have at least one row")]
    NoRows,
    #[error("board must have at least one column")]
    NoColumns,
    #[error("board dimensions {columns}x{rows} exceed the {max}x{max} limit")]
    TooLarge { columns: u8, rows: u8, max: u8 },
    #[error("color count must be at least 1")]
    NoColors,
    #[error("tier thresholds must be positive and strictly increasing, got {0}, {1}, {2}")]
    Thresholds(u32, u32, u32),
    #[error("minimum match size must be at least 1")]
    MinMatch,
    #[error("grid is {got_columns}x{got_rows}, level expects {columns}x{rows}")]
    GridMismatch {
        columns: u8,
        rows: u8,
        got_columns: u8,
        got_rows: u8,
    },
    #[error("grid has an empty cell at column {column}, row {row}")]
    GridIncomplete { column: u8, row: u8 },
    #[error("grid holds color {color} but level has only {color_count} colors")]
    ColorOutOfRange { color: u8, color_count: u8 },
    #[error("grid holds tile id {0} more than once")]
    DuplicateTileId(u32),
}

/// Upper bounds (inclusive) of tiers 1..=3; anything larger is tier 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierThresholds {
    tier1_max: u32,
    tier2_max: u32,
    tier3_max: u32,
}

impl TierThresholds {
    pub fn new(tier1_max: u32, tier2_max: u32, tier3_max: u32) -> Result<Self, ConfigError> {
        if tier1_max == 0 || tier1_max >= tier2_max || tier2_max >= tier3_max {
            return Err(ConfigError::Thresholds(tier1_max, tier2_max, tier3_max));
        }
        Ok(Self {
            tier1_max,
            tier2_max,
            tier3_max,
        })
    }

    pub fn tier1_max(&self) -> u32 {
        self.tier1_max
    }

    pub fn tier2_max(&self) -> u32 {
        self.tier2_max
    }

    pub fn tier3_max(&self) -> u32 {
        self.tier3_max
    }

    pub fn as_array(&self) -> [u32; 3] {
        [self.tier1_max, self.tier2_max, self.tier3_max]
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        let [t1, t2, t3] = DEFAULT_TIER_THRESHOLDS;
        Self {
            tier1_max: t1,
            tier2_max: t2,
            tier3_max: t3,
        }
    }
}

/// Immutable parameters of one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelConfig {
    rows: u8,
    columns: u8,
    color_count: u8,
    thresholds: TierThresholds,
    min_match: u32,
}

impl LevelConfig {
    /// Build and validate a level with the default minimum match size.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_collapse_core::{ConfigError, LevelConfig};
    ///
    /// let level = LevelConfig::new(5, 5, 4, 2, 4, 5).unwrap();
    /// assert_eq!(level.cell_count(), 25);
    ///
    /// assert_eq!(LevelConfig::new(0, 5, 4, 2, 4, 5), Err(ConfigError::NoRows));
    /// assert!(LevelConfig::new(5, 5, 4, 4, 4, 5).is_err());
    /// ```
    pub fn new(
        rows: u8,
        columns: u8,
        color_count: u8,
        tier1_max: u32,
        tier2_max: u32,
        tier3_max: u32,
    ) -> Result<Self, ConfigError> {
        if rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if columns == 0 {
            return Err(ConfigError::NoColumns);
        }
        if rows > MAX_DIMENSION || columns > MAX_DIMENSION {
            return Err(ConfigError::TooLarge {
                columns,
                rows,
                max: MAX_DIMENSION,
            });
        }
        if color_count == 0 {
            return Err(ConfigError::NoColors);
        }
        let thresholds = TierThresholds::new(tier1_max, tier2_max, tier3_max)?;
        Ok(Self {
            rows,
            columns,
            color_count,
            thresholds,
            min_match: DEFAULT_MIN_MATCH,
        })
    }

    /// Same level with a different minimum match size.
    pub fn with_min_match(mut self, min_match: u32) -> Result<Self, ConfigError> {
        if min_match == 0 {
            return Err(ConfigError::MinMatch);
        }
        self.min_match = min_match;
        Ok(self)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    pub fn min_match(&self) -> u32 {
        self.min_match
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            color_count: DEFAULT_COLOR_COUNT,
            thresholds: TierThresholds::default(),
            min_match: DEFAULT_MIN_MATCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_valid() {
        let level = LevelConfig::default();
        let rebuilt = LevelConfig::new(5, 5, 4, 2, 4, 5).unwrap();
        assert_eq!(level, rebuilt);
        assert_eq!(level.min_match(), 2);
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(LevelConfig::new(0, 3, 2, 1, 2, 3), Err(ConfigError::NoRows));
        assert_eq!(LevelConfig::new(3, 0, 2, 1, 2, 3), Err(ConfigError::NoColumns));
        assert_eq!(LevelConfig::new(3, 3, 0, 1, 2, 3), Err(ConfigError::NoColors));
    }

    #[test]
    fn rejects_oversized_boards() {
        assert!(matches!(
            LevelConfig::new(65, 3, 2, 1, 2, 3),
            Err(ConfigError::TooLarge { rows: 65, .. })
        ));
        assert!(LevelConfig::new(64, 64, 2, 1, 2, 3).is_ok());
    }

    #[test]
    fn rejects_non_increasing_thresholds() {
        assert_eq!(
            TierThresholds::new(0, 2, 3),
            Err(ConfigError::Thresholds(0, 2, 3))
        );
        assert!(TierThresholds::new(2, 2, 3).is_err());
        assert!(TierThresholds::new(1, 3, 2).is_err());
        assert!(TierThresholds::new(1, 2, 3).is_ok());
    }

    #[test]
    fn min_match_must_be_positive() {
        let level = LevelConfig::default();
        assert_eq!(level.with_min_match(0), Err(ConfigError::MinMatch));
        assert_eq!(level.with_min_match(3).unwrap().min_match(), 3);
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = ConfigError::Thresholds(4, 4, 5);
        assert!(err.to_string().contains("strictly increasing"));
    }
}
