//! Common types used across the workspace

use serde::{Deserialize, Serialize};

/// A 0-indexed (row, column) slot on the grove grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Grid extent: row count and the length of the longest row
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridDimensions {
    pub rows: usize,
    pub cols: usize,
}

/// An occupied grid cell with its scan-order identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreePosition {
    pub row: usize,
    pub col: usize,
    /// Transient `tree-NNN` token; never persisted
    pub id: String,
}
