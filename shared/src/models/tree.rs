//! Tree models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An olive tree registered at a fixed grid position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub id: Uuid,
    /// 0-indexed grid row, fixed at creation
    pub position_row: i32,
    /// 0-indexed grid column, fixed at creation
    pub position_col: i32,
    pub variety: Option<OliveVariety>,
    pub year_planted: Option<i32>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tree {
    /// Human readable label using 1-based coordinates, e.g. "Tree 3-12"
    pub fn label(&self) -> String {
        tree_label(self.position_row, self.position_col)
    }

    pub fn is_at(&self, row: i32, col: i32) -> bool {
        self.position_row == row && self.position_col == col
    }
}

/// Label for the tree at a 0-indexed grid position
pub fn tree_label(row: i32, col: i32) -> String {
    format!("Tree {}-{}", row + 1, col + 1)
}

/// Olive varieties grown in the grove
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OliveVariety {
    #[serde(rename = "frontoyo")]
    Frontoyo,
    #[serde(rename = "kalamata")]
    Kalamata,
    #[serde(rename = "jumbo kalamata")]
    JumboKalamata,
    #[serde(rename = "spanish queen")]
    SpanishQueen,
    #[serde(rename = "burnia")]
    Burnia,
}

/// Row inserted when seeding the registry: only the position is carried
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTree {
    pub position_row: i32,
    pub position_col: i32,
}

/// Mutable tree attributes (position is fixed at creation)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeAttributes {
    pub variety: Option<OliveVariety>,
    pub year_planted: Option<i32>,
    pub supplier: Option<String>,
}
