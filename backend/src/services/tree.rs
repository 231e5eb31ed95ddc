//! Tree records service

use std::sync::Arc;

use shared::{validate_year_planted, Tree, TreeAttributes};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{from_row, from_rows, to_row, DataStore, Query, Table};

/// Tree service for reading and updating registered trees
#[derive(Clone)]
pub struct TreeService {
    store: Arc<dyn DataStore>,
}

impl TreeService {
    /// Create a new TreeService instance
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// All trees in row, then column order; empty when the store fails
    pub async fn list_trees(&self) -> Vec<Tree> {
        let query = Query::new()
            .order_asc("position_row")
            .order_asc("position_col");

        match self.store.select(Table::Trees, &query).await {
            Ok(rows) => from_rows(rows).unwrap_or_else(|e| {
                tracing::error!("Failed to decode trees: {}", e);
                Vec::new()
            }),
            Err(e) => {
                tracing::error!("Failed to fetch trees: {}", e);
                Vec::new()
            }
        }
    }

    /// Get a tree by ID
    pub async fn get_tree(&self, tree_id: Uuid) -> AppResult<Tree> {
        let query = Query::new().eq("id", tree_id);

        match self.store.select_one(Table::Trees, &query).await {
            Ok(Some(row)) => Ok(from_row(row)?),
            Ok(None) => Err(AppError::NotFound("Tree".to_string())),
            Err(e) => {
                tracing::error!("Failed to fetch tree {}: {}", tree_id, e);
                Err(AppError::NotFound("Tree".to_string()))
            }
        }
    }

    /// Whether a tree with this ID exists; store failures propagate
    pub async fn exists(&self, tree_id: Uuid) -> AppResult<bool> {
        let query = Query::new().eq("id", tree_id);
        Ok(self.store.select_one(Table::Trees, &query).await?.is_some())
    }

    /// Replace the mutable attributes of a tree
    pub async fn update_tree(&self, tree_id: Uuid, input: TreeAttributes) -> AppResult<Tree> {
        if let Some(year) = input.year_planted {
            validate_year_planted(year).map_err(|m| AppError::validation("year_planted", m))?;
        }

        let input = TreeAttributes {
            supplier: input.supplier.filter(|s| !s.trim().is_empty()),
            ..input
        };
        let patch = to_row(&input)?;

        let updated = self
            .store
            .update(Table::Trees, tree_id, patch)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update tree {}: {}", tree_id, e);
                AppError::from(e)
            })?
            .ok_or_else(|| AppError::NotFound("Tree".to_string()))?;

        tracing::info!("Updated tree {}", tree_id);
        Ok(from_row(updated)?)
    }
}
