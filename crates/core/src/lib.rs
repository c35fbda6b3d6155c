//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the puzzle and has **no dependency** on
//! UI, networking, or I/O:
//!
//! - **Deterministic**: a seed (or a scripted color source) fixes the whole game
//! - **Sequential**: each call on a [`Board`] runs to completion
//! - **Self-contained**: no global state; boards share nothing
//!
//! # Module Structure
//!
//! - [`board`]: the state machine (select, resolve, refill, evaluate, reset)
//! - [`cluster`]: flood fill over same-color orthogonal neighbors
//! - [`config`]: validated level configuration and [`ConfigError`]
//! - [`grid`]: dense column/row tile storage
//! - [`rng`]: injectable color sources
//! - [`snapshot`]: plain-data board views for renderers and adapters
//! - [`tier`]: cluster size → icon tier
//!
//! # Rules
//!
//! - Selecting a tile removes its whole cluster when the cluster has at
//!   least `min_match` tiles (2 by default)
//! - Each removed tile is replaced by a random tile dropped into its column
//! - Survivors fall to the bottom keeping their order; replacements land on top
//! - Every tile shows the tier of its cluster's size
//! - The board deadlocks when no cluster reaches `min_match`
//!
//! # Example
//!
//! ```
//! use tui_collapse_core::{Board, LevelConfig, SelectOutcome};
//!
//! let mut board = Board::with_seed(LevelConfig::default(), 12345);
//! board.take_events();
//!
//! let outcome = board.select(0, 0);
//! if let SelectOutcome::Resolved { removed } = outcome {
//!     assert!(removed >= 2);
//!     assert!(!board.take_events().is_empty());
//! }
//! assert!(board.grid().is_full());
//! ```

pub mod board;
pub mod cluster;
pub mod config;
pub mod grid;
pub mod rng;
pub mod snapshot;
pub mod tier;

pub use tui_collapse_types as types;

pub use board::{Board, SelectOutcome};
pub use cluster::{find_cluster, partition, Cluster};
pub use config::{ConfigError, LevelConfig, TierThresholds};
pub use grid::{Grid, Tile};
pub use rng::{ColorSource, ScriptedColors, SimpleRng};
pub use snapshot::{BoardSnapshot, CellSnapshot};
pub use tier::tier_for_size;
