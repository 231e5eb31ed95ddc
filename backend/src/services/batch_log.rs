//! Oil batch log service: processing events recorded against one oil batch

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::{validate_batch_action, BatchAction, BatchActionType, BatchLog, BatchLogEntry};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::batch::BatchService;
use crate::services::log_book::{BatchLogs, LogBook};
use crate::store::DataStore;

/// Input for creating a batch log; the detail fields sit next to `action_type`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatchLogInput {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub action: BatchAction,
}

#[derive(Clone)]
pub struct BatchLogService {
    store: Arc<dyn DataStore>,
}

impl BatchLogService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn book(&self) -> LogBook<BatchLogs> {
        LogBook::new(self.store.clone())
    }

    /// Logs of an oil batch, newest first; empty when the store fails
    pub async fn list_logs(&self, batch_id: Uuid) -> Vec<BatchLog> {
        self.book().list(batch_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch logs for batch {}: {}", batch_id, e);
            Vec::new()
        })
    }

    pub async fn create_log(
        &self,
        batch_id: Uuid,
        input: CreateBatchLogInput,
    ) -> AppResult<BatchLogEntry> {
        validate_batch_action(&input.action).map_err(|m| AppError::validation("detail", m))?;

        if !BatchService::new(self.store.clone())
            .oil_batch_exists(batch_id)
            .await?
        {
            return Err(AppError::NotFound("Oil batch".to_string()));
        }

        let log = self.book().write(batch_id, input.date, &input.action).await?;
        tracing::info!(
            "Recorded {} log {} for batch {}",
            log.action_type,
            log.id,
            batch_id
        );

        Ok(BatchLogEntry {
            log,
            detail: Some(input.action),
        })
    }

    /// Detail of a log read from the table for `kind`
    pub async fn detail(&self, log_id: Uuid, kind: BatchActionType) -> Option<BatchAction> {
        self.book().detail(log_id, kind).await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch {} detail for log {}: {}", kind, log_id, e);
            None
        })
    }

    pub async fn get_entry(
        &self,
        log_id: Uuid,
        kind: Option<BatchActionType>,
    ) -> AppResult<BatchLogEntry> {
        let log = match self.book().header(log_id).await {
            Ok(Some(log)) => log,
            Ok(None) => return Err(AppError::NotFound("Batch log".to_string())),
            Err(e) => {
                tracing::error!("Failed to fetch batch log {}: {}", log_id, e);
                return Err(AppError::NotFound("Batch log".to_string()));
            }
        };

        let detail = self.detail(log_id, kind.unwrap_or(log.action_type)).await;
        Ok(BatchLogEntry { log, detail })
    }
}
