//! Tree registry reconciliation
//!
//! Compares the occupied cells of the grid map with the trees persisted in the
//! store and seeds the store when it holds no trees at all.

use std::sync::Arc;

use serde::Serialize;
use shared::{NewTree, Tree};
use tokio::sync::Mutex;

use crate::services::grid::GridSource;
use crate::store::{from_rows, to_row, DataStore, Query, StoreResult, Table};

/// Registry state as shown before initialization
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegistryStatus {
    pub tree_count: usize,
    /// Occupied cells in the grid map
    pub grid_positions: usize,
    pub needs_initialization: bool,
    /// False when the store could not be read
    pub store_available: bool,
}

/// Result of an initialization run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The store already held trees; nothing was written
    AlreadySeeded { existing_trees: usize },
    /// Every occupied cell was written
    Seeded { inserted: usize },
    /// A chunk failed after earlier chunks were written
    Partial {
        planned: usize,
        inserted: usize,
        error: String,
    },
    /// The first chunk failed; nothing was written
    Failed { planned: usize, error: String },
    /// The store could not be checked for existing trees
    Unavailable { error: String },
}

impl SeedOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            SeedOutcome::Seeded { inserted } | SeedOutcome::Partial { inserted, .. } => *inserted,
            _ => 0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SeedOutcome::AlreadySeeded { .. } | SeedOutcome::Seeded { .. }
        )
    }
}

/// Tree registry service
///
/// Share one registry between callers: seeding runs are serialized by an
/// internal lock, so concurrent callers see the trees the first run wrote.
pub struct TreeRegistry {
    store: Arc<dyn DataStore>,
    grid: Arc<GridSource>,
    chunk_size: usize,
    seeding: Mutex<()>,
}

impl TreeRegistry {
    pub fn new(store: Arc<dyn DataStore>, grid: Arc<GridSource>, chunk_size: usize) -> Self {
        Self {
            store,
            grid,
            chunk_size: chunk_size.max(1),
            seeding: Mutex::new(()),
        }
    }

    /// Persisted trees in row, then column order
    pub async fn trees(&self) -> StoreResult<Vec<Tree>> {
        let query = Query::new()
            .order_asc("position_row")
            .order_asc("position_col");
        let rows = self.store.select(Table::Trees, &query).await?;
        from_rows(rows)
    }

    /// Compare the grid with the store.
    ///
    /// An unreadable store is reported as holding zero trees but never as
    /// needing initialization.
    pub async fn status(&self) -> RegistryStatus {
        let grid = self.grid.load().await;
        let grid_positions = grid.tree_count();

        match self.trees().await {
            Ok(trees) => RegistryStatus {
                tree_count: trees.len(),
                grid_positions,
                needs_initialization: trees.is_empty(),
                store_available: true,
            },
            Err(e) => {
                tracing::error!("Failed to read trees for registry status: {}", e);
                RegistryStatus {
                    tree_count: 0,
                    grid_positions,
                    needs_initialization: false,
                    store_available: false,
                }
            }
        }
    }

    /// Seed one tree per occupied grid cell if the store holds none
    pub async fn initialize(&self) -> SeedOutcome {
        let _seeding = self.seeding.lock().await;

        let existing = match self.trees().await {
            Ok(trees) => trees.len(),
            Err(e) => {
                tracing::error!("Cannot check existing trees before seeding: {}", e);
                return SeedOutcome::Unavailable {
                    error: e.to_string(),
                };
            }
        };
        if existing > 0 {
            tracing::info!("Registry already holds {} trees; not seeding", existing);
            return SeedOutcome::AlreadySeeded {
                existing_trees: existing,
            };
        }

        let grid = self.grid.load().await;
        let planned: Vec<NewTree> = grid
            .occupied()
            .map(|p| NewTree {
                position_row: p.row as i32,
                position_col: p.col as i32,
            })
            .collect();

        tracing::info!(
            "Seeding {} trees in chunks of {}",
            planned.len(),
            self.chunk_size
        );

        let mut inserted = 0;
        for chunk in planned.chunks(self.chunk_size) {
            let result = match chunk.iter().map(to_row).collect::<StoreResult<Vec<_>>>() {
                Ok(rows) => self.store.insert(Table::Trees, rows).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(stored) => inserted += stored.len(),
                Err(e) if inserted == 0 => {
                    tracing::error!("Seeding failed before any tree was written: {}", e);
                    return SeedOutcome::Failed {
                        planned: planned.len(),
                        error: e.to_string(),
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Seeding stopped after {} of {} trees: {}",
                        inserted,
                        planned.len(),
                        e
                    );
                    return SeedOutcome::Partial {
                        planned: planned.len(),
                        inserted,
                        error: e.to_string(),
                    };
                }
            }
        }

        tracing::info!("Seeded {} trees", inserted);
        SeedOutcome::Seeded { inserted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry(store: &Arc<MemoryStore>, text: &str, chunk: usize) -> TreeRegistry {
        TreeRegistry::new(store.clone(), Arc::new(GridSource::from_text(text)), chunk)
    }

    #[tokio::test]
    async fn test_status_before_and_after_seeding() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry(&store, "x,,x\n,x,", 100);

        let before = registry.status().await;
        assert_eq!(before.tree_count, 0);
        assert_eq!(before.grid_positions, 3);
        assert!(before.needs_initialization);

        registry.initialize().await;
        let after = registry.status().await;
        assert_eq!(after.tree_count, 3);
        assert!(!after.needs_initialization);
    }

    #[tokio::test]
    async fn test_seeding_uses_chunks() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry(&store, "x,x,x\nx,x", 2);

        assert_eq!(registry.initialize().await, SeedOutcome::Seeded { inserted: 5 });
        assert_eq!(store.calls().inserts, 3);
    }

    #[tokio::test]
    async fn test_empty_grid_seeds_nothing() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry(&store, "", 100);

        assert_eq!(registry.initialize().await, SeedOutcome::Seeded { inserted: 0 });
        assert_eq!(store.calls().inserts, 0);
    }

    #[tokio::test]
    async fn test_unreadable_store_is_not_seeded() {
        let store = Arc::new(MemoryStore::new());
        store.fail_reads(true);
        let registry = registry(&store, "x", 100);

        let status = registry.status().await;
        assert!(!status.needs_initialization);
        assert!(!status.store_available);

        assert!(matches!(
            registry.initialize().await,
            SeedOutcome::Unavailable { .. }
        ));
        assert_eq!(store.calls().inserts, 0);
    }
}
