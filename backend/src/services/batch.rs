//! Processing batch service for oil and pickling batches
//!
//! A batch's tree list is chosen at creation and never changes afterwards.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use shared::{
    validate_pickling_details, validate_tree_selection, BatchWithTrees, NewOilProcessingBatch,
    NewPicklingBatch, OilProcessingBatch, PicklingBatch, PicklingDetails, Tree,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{from_row, from_rows, to_row, DataStore, Query, Table};

/// Batch service for oil and pickling batches
#[derive(Clone)]
pub struct BatchService {
    store: Arc<dyn DataStore>,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Oil processing batches
    // ========================================================================

    /// Oil batches, newest first
    pub async fn list_oil_batches(&self) -> Vec<OilProcessingBatch> {
        self.list(Table::OilProcessingBatches).await
    }

    pub async fn create_oil_batch(
        &self,
        input: NewOilProcessingBatch,
    ) -> AppResult<OilProcessingBatch> {
        validate_tree_selection(&input.tree_ids)
            .map_err(|m| AppError::validation("tree_ids", m))?;

        let stored = self
            .store
            .insert_one(Table::OilProcessingBatches, to_row(&input)?)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create oil batch: {}", e);
                AppError::from(e)
            })?;
        let batch: OilProcessingBatch = from_row(stored)?;

        tracing::info!(
            "Created oil batch {} with {} trees",
            batch.id,
            batch.tree_ids.len()
        );
        Ok(batch)
    }

    pub async fn get_oil_batch(
        &self,
        batch_id: Uuid,
    ) -> AppResult<BatchWithTrees<OilProcessingBatch>> {
        let batch: OilProcessingBatch = self
            .find(Table::OilProcessingBatches, batch_id, "Oil batch")
            .await?;
        let trees = self.member_trees(&batch.tree_ids).await;
        Ok(BatchWithTrees { batch, trees })
    }

    /// Whether an oil batch with this ID exists; store failures propagate
    pub async fn oil_batch_exists(&self, batch_id: Uuid) -> AppResult<bool> {
        let query = Query::new().eq("id", batch_id);
        Ok(self
            .store
            .select_one(Table::OilProcessingBatches, &query)
            .await?
            .is_some())
    }

    // ========================================================================
    // Pickling batches
    // ========================================================================

    /// Pickling batches, newest first
    pub async fn list_pickling_batches(&self) -> Vec<PicklingBatch> {
        self.list(Table::PicklingBatches).await
    }

    pub async fn create_pickling_batch(&self, input: NewPicklingBatch) -> AppResult<PicklingBatch> {
        validate_tree_selection(&input.tree_ids)
            .map_err(|m| AppError::validation("tree_ids", m))?;
        validate_pickling_details(&input.details)
            .map_err(|m| AppError::validation("salt_percentage", m))?;

        let input = NewPicklingBatch {
            details: input.details.normalized(),
            ..input
        };
        let stored = self
            .store
            .insert_one(Table::PicklingBatches, to_row(&input)?)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create pickling batch: {}", e);
                AppError::from(e)
            })?;
        let batch: PicklingBatch = from_row(stored)?;

        tracing::info!(
            "Created pickling batch {} with {} trees",
            batch.id,
            batch.tree_ids.len()
        );
        Ok(batch)
    }

    pub async fn get_pickling_batch(
        &self,
        batch_id: Uuid,
    ) -> AppResult<BatchWithTrees<PicklingBatch>> {
        let batch: PicklingBatch = self
            .find(Table::PicklingBatches, batch_id, "Pickling batch")
            .await?;
        let trees = self.member_trees(&batch.tree_ids).await;
        Ok(BatchWithTrees { batch, trees })
    }

    /// Replace the descriptive fields; date and tree list stay as created
    pub async fn update_pickling_batch(
        &self,
        batch_id: Uuid,
        input: PicklingDetails,
    ) -> AppResult<PicklingBatch> {
        validate_pickling_details(&input)
            .map_err(|m| AppError::validation("salt_percentage", m))?;

        let patch = to_row(&input.normalized())?;
        let updated = self
            .store
            .update(Table::PicklingBatches, batch_id, patch)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update pickling batch {}: {}", batch_id, e);
                AppError::from(e)
            })?
            .ok_or_else(|| AppError::NotFound("Pickling batch".to_string()))?;

        tracing::info!("Updated pickling batch {}", batch_id);
        Ok(from_row(updated)?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn list<T: DeserializeOwned>(&self, table: Table) -> Vec<T> {
        let query = Query::new().order_desc("date");
        match self.store.select(table, &query).await {
            Ok(rows) => from_rows(rows).unwrap_or_else(|e| {
                tracing::error!("Failed to decode {}: {}", table, e);
                Vec::new()
            }),
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", table, e);
                Vec::new()
            }
        }
    }

    async fn find<T: DeserializeOwned>(
        &self,
        table: Table,
        id: Uuid,
        resource: &str,
    ) -> AppResult<T> {
        let query = Query::new().eq("id", id);
        match self.store.select_one(table, &query).await {
            Ok(Some(row)) => Ok(from_row(row)?),
            Ok(None) => Err(AppError::NotFound(resource.to_string())),
            Err(e) => {
                tracing::error!("Failed to fetch {} {}: {}", resource, id, e);
                Err(AppError::NotFound(resource.to_string()))
            }
        }
    }

    /// Trees referenced by a batch, in grid order
    async fn member_trees(&self, tree_ids: &[Uuid]) -> Vec<Tree> {
        if tree_ids.is_empty() {
            return Vec::new();
        }

        let query = Query::new()
            .is_in("id", tree_ids)
            .order_asc("position_row")
            .order_asc("position_col");
        match self.store.select(Table::Trees, &query).await {
            Ok(rows) => from_rows(rows).unwrap_or_else(|e| {
                tracing::error!("Failed to decode batch trees: {}", e);
                Vec::new()
            }),
            Err(e) => {
                tracing::error!("Failed to fetch batch trees: {}", e);
                Vec::new()
            }
        }
    }
}
