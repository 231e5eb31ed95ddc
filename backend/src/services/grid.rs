//! Grid map source
//!
//! The grove layout is a small comma separated file read once per process.
//! An unreadable file degrades to an empty grid, and that result is memoized
//! like any other: there is no retry until the process restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::GridMap;
use tokio::sync::OnceCell;

/// Lazily loaded, memoized grid map
#[derive(Debug)]
pub struct GridSource {
    path: PathBuf,
    grid: OnceCell<Arc<GridMap>>,
}

impl GridSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            grid: OnceCell::new(),
        }
    }

    /// Source already holding the grid parsed from `text`
    pub fn from_text(text: &str) -> Self {
        Self {
            path: PathBuf::new(),
            grid: OnceCell::new_with(Some(Arc::new(GridMap::parse(text)))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.grid.initialized()
    }

    /// The parsed grid, reading the file on first use
    pub async fn load(&self) -> Arc<GridMap> {
        self.grid
            .get_or_init(|| async {
                match tokio::fs::read_to_string(&self.path).await {
                    Ok(text) => {
                        let grid = GridMap::parse(&text);
                        tracing::info!(
                            "Loaded grid map from {}: {} rows, {} trees",
                            self.path.display(),
                            grid.row_count(),
                            grid.tree_count()
                        );
                        Arc::new(grid)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Could not read grid map {}: {}. Using an empty grid",
                            self.path.display(),
                            e
                        );
                        Arc::new(GridMap::empty())
                    }
                }
            })
            .await
            .clone()
    }
}
