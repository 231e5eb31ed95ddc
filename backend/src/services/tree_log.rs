//! Tree log service: horticultural events recorded against one tree

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::{validate_tree_action, TreeAction, TreeActionType, TreeLog, TreeLogEntry};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::log_book::{LogBook, TreeLogs};
use crate::services::tree::TreeService;
use crate::store::DataStore;

/// Input for creating a tree log; the detail fields sit next to `action_type`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTreeLogInput {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub action: TreeAction,
}

#[derive(Clone)]
pub struct TreeLogService {
    store: Arc<dyn DataStore>,
}

impl TreeLogService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn book(&self) -> LogBook<TreeLogs> {
        LogBook::new(self.store.clone())
    }

    /// Logs of a tree, newest first; empty when the store fails
    pub async fn list_logs(&self, tree_id: Uuid) -> Vec<TreeLog> {
        self.book().list(tree_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch logs for tree {}: {}", tree_id, e);
            Vec::new()
        })
    }

    /// Record an event against an existing tree
    pub async fn create_log(
        &self,
        tree_id: Uuid,
        input: CreateTreeLogInput,
    ) -> AppResult<TreeLogEntry> {
        validate_tree_action(&input.action)
            .map_err(|m| AppError::validation("detail", m))?;

        if !TreeService::new(self.store.clone()).exists(tree_id).await? {
            return Err(AppError::NotFound("Tree".to_string()));
        }

        let log = self.book().write(tree_id, input.date, &input.action).await?;
        tracing::info!("Recorded {} log {} for tree {}", log.action_type, log.id, tree_id);

        Ok(TreeLogEntry {
            log,
            detail: Some(input.action),
        })
    }

    /// Detail of a log read from the table for `kind`; `None` when that
    /// table holds no row for the log or the store fails
    pub async fn detail(&self, log_id: Uuid, kind: TreeActionType) -> Option<TreeAction> {
        self.book().detail(log_id, kind).await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch {} detail for log {}: {}", kind, log_id, e);
            None
        })
    }

    /// A log with its detail. Without `kind` the log's own action type is used.
    pub async fn get_entry(
        &self,
        log_id: Uuid,
        kind: Option<TreeActionType>,
    ) -> AppResult<TreeLogEntry> {
        let log = match self.book().header(log_id).await {
            Ok(Some(log)) => log,
            Ok(None) => return Err(AppError::NotFound("Tree log".to_string())),
            Err(e) => {
                tracing::error!("Failed to fetch tree log {}: {}", log_id, e);
                return Err(AppError::NotFound("Tree log".to_string()));
            }
        };

        let detail = self.detail(log_id, kind.unwrap_or(log.action_type)).await;
        Ok(TreeLogEntry { log, detail })
    }
}
