//! Grove grid map
//!
//! The grove layout is a comma separated text grid where a cell holding `x`
//! marks a tree. Rows may be of unequal length; cells past the end of a row
//! are out of bounds and never hold a tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{tree_label, OliveVariety, Tree};
use crate::types::{GridDimensions, GridPosition, TreePosition};

/// Token that marks a tree position
pub const TREE_TOKEN: &str = "x";

pub const ROW_DELIMITER: char = '\n';
pub const FIELD_DELIMITER: char = ',';

/// Marker of an in-bounds cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellMarker {
    Occupied,
    Empty,
}

/// Occupancy of any (row, col) query, including past a row's end
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Occupied,
    Empty,
    OutOfBounds,
}

/// Parsed grove grid. Immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridMap {
    rows: Vec<Vec<CellMarker>>,
}

impl GridMap {
    /// Parse grid text. Unknown tokens are treated as empty, never as errors.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }

        let rows = text
            .split(ROW_DELIMITER)
            .map(|line| line.split(FIELD_DELIMITER).map(parse_cell).collect())
            .collect();

        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<CellMarker>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> CellState {
        match self.rows.get(row).and_then(|r| r.get(col)) {
            Some(CellMarker::Occupied) => CellState::Occupied,
            Some(CellMarker::Empty) => CellState::Empty,
            None => CellState::OutOfBounds,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions {
            rows: self.rows.len(),
            cols: self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Occupied cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| **cell == CellMarker::Occupied)
                .map(move |(c, _)| GridPosition::new(r, c))
        })
    }

    /// Occupied cells numbered from 1 in row-major scan order.
    ///
    /// The numbering only depends on the grid text, so the same text always
    /// yields the same identifiers.
    pub fn tree_positions(&self) -> Vec<TreePosition> {
        self.occupied()
            .enumerate()
            .map(|(i, pos)| TreePosition {
                row: pos.row,
                col: pos.col,
                id: scan_id(i + 1),
            })
            .collect()
    }

    pub fn tree_count(&self) -> usize {
        self.occupied().count()
    }
}

fn parse_cell(token: &str) -> CellMarker {
    if token.trim() == TREE_TOKEN {
        CellMarker::Occupied
    } else {
        CellMarker::Empty
    }
}

/// Scan-order identifier, e.g. `tree-007`
pub fn scan_id(sequence: usize) -> String {
    format!("tree-{:03}", sequence)
}

/// A cell of the rendered grove map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapCell {
    Empty,
    /// Tree position with no stored tree record
    Unregistered { label: String },
    Registered {
        tree_id: Uuid,
        label: String,
        variety: Option<OliveVariety>,
    },
}

/// Grid joined with the stored trees by position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroveMap {
    pub dimensions: GridDimensions,
    pub rows: Vec<Vec<MapCell>>,
    pub registered: usize,
    pub unregistered: usize,
}

impl GroveMap {
    /// Stored trees that do not sit on an occupied cell are not shown.
    pub fn overlay(grid: &GridMap, trees: &[Tree]) -> Self {
        let by_position: HashMap<(i32, i32), &Tree> = trees
            .iter()
            .map(|t| ((t.position_row, t.position_col), t))
            .collect();

        let mut registered = 0;
        let mut unregistered = 0;

        let rows = grid
            .rows()
            .iter()
            .enumerate()
            .map(|(r, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(c, marker)| {
                        if *marker == CellMarker::Empty {
                            return MapCell::Empty;
                        }
                        let (row, col) = (r as i32, c as i32);
                        match by_position.get(&(row, col)) {
                            Some(tree) => {
                                registered += 1;
                                MapCell::Registered {
                                    tree_id: tree.id,
                                    label: tree.label(),
                                    variety: tree.variety,
                                }
                            }
                            None => {
                                unregistered += 1;
                                MapCell::Unregistered {
                                    label: tree_label(row, col),
                                }
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            dimensions: grid.dimensions(),
            rows,
            registered,
            unregistered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tree_at(row: i32, col: i32) -> Tree {
        Tree {
            id: Uuid::new_v4(),
            position_row: row,
            position_col: col,
            variety: Some(OliveVariety::Kalamata),
            year_planted: None,
            supplier: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_example_grid_scan_order() {
        let grid = GridMap::parse("x,,x\n,x,");
        let positions = grid.tree_positions();

        let coords: Vec<(usize, usize)> = positions.iter().map(|p| (p.row, p.col)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 2), (1, 1)]);

        let ids: Vec<&str> = positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["tree-001", "tree-002", "tree-003"]);
    }

    #[test]
    fn test_only_lowercase_x_is_a_tree() {
        let grid = GridMap::parse(" x ,X,1,,\t x\t");
        assert_eq!(grid.cell(0, 0), CellState::Occupied);
        assert_eq!(grid.cell(0, 1), CellState::Empty);
        assert_eq!(grid.cell(0, 2), CellState::Empty);
        assert_eq!(grid.cell(0, 3), CellState::Empty);
        assert_eq!(grid.cell(0, 4), CellState::Occupied);
        assert_eq!(grid.tree_count(), 2);
    }

    #[test]
    fn test_jagged_rows_are_kept() {
        let grid = GridMap::parse("x\nx,x,x\n,x");
        let lengths: Vec<usize> = grid.rows().iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![1, 3, 2]);
        assert_eq!(grid.cell(0, 2), CellState::OutOfBounds);
        assert_eq!(grid.cell(7, 0), CellState::OutOfBounds);
        assert_eq!(grid.dimensions(), GridDimensions { rows: 3, cols: 3 });
    }

    #[test]
    fn test_blank_text_is_an_empty_grid() {
        let grid = GridMap::parse("  \n \n");
        assert!(grid.is_empty());
        assert_eq!(grid.dimensions(), GridDimensions { rows: 0, cols: 0 });
        assert!(grid.tree_positions().is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let grid = GridMap::parse("x,\r\n,x\r\n");
        assert_eq!(grid.tree_count(), 2);
        assert_eq!(grid.cell(0, 1), CellState::Empty);
    }

    #[test]
    fn test_scan_id_padding() {
        assert_eq!(scan_id(1), "tree-001");
        assert_eq!(scan_id(42), "tree-042");
        assert_eq!(scan_id(1234), "tree-1234");
    }

    #[test]
    fn test_overlay_marks_registration() {
        let grid = GridMap::parse("x,,x\n,x,");
        let trees = vec![tree_at(0, 0), tree_at(1, 1), tree_at(5, 5)];
        let map = GroveMap::overlay(&grid, &trees);

        assert_eq!(map.registered, 2);
        assert_eq!(map.unregistered, 1);
        assert_eq!(map.rows[0][1], MapCell::Empty);
        assert_eq!(
            map.rows[0][2],
            MapCell::Unregistered {
                label: "Tree 1-3".to_string()
            }
        );
        match &map.rows[1][1] {
            MapCell::Registered { tree_id, label, .. } => {
                assert_eq!(*tree_id, trees[1].id);
                assert_eq!(label, "Tree 2-2");
            }
            other => panic!("expected registered cell, got {:?}", other),
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn grid_text() -> impl Strategy<Value = String> {
            prop::collection::vec(prop::collection::vec(any::<bool>(), 0..10), 0..8).prop_map(
                |rows| {
                    rows.iter()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|&tree| if tree { "x" } else { "" })
                                .collect::<Vec<_>>()
                                .join(",")
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )
        }

        proptest! {
            #[test]
            fn overlay_accounts_for_every_tree(text in grid_text(), take in 0usize..40) {
                let grid = GridMap::parse(&text);
                let trees: Vec<Tree> = grid
                    .occupied()
                    .take(take)
                    .map(|p| tree_at(p.row as i32, p.col as i32))
                    .collect();

                let map = GroveMap::overlay(&grid, &trees);
                prop_assert_eq!(map.registered, trees.len());
                prop_assert_eq!(map.registered + map.unregistered, grid.tree_count());
            }
        }
    }
}
