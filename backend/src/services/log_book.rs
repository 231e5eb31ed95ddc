//! Header plus detail log storage
//!
//! Tree logs and oil batch logs share one shape: a header row in a log table
//! and one detail row in a per-action table keyed by the header id. The two
//! inserts are separate store calls; a failed detail insert leaves the header
//! behind and is reported as such.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{ActionDetail, BatchAction, BatchLog, TreeAction, TreeLog};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{from_row, from_rows, DataStore, Query, Row, StoreError, StoreResult, Table};

/// Where a family of logs is stored
pub trait LogSchema: Send + Sync + 'static {
    type Action: ActionDetail;
    type Header: DeserializeOwned + Send;

    /// Table holding the headers
    const HEADER_TABLE: Table;
    /// Header column referencing the tree or batch
    const PARENT_KEY: &'static str;
    /// Detail column referencing the header
    const DETAIL_KEY: &'static str;

    fn detail_table(kind: <Self::Action as ActionDetail>::Kind) -> Table;

    fn log_id(header: &Self::Header) -> Uuid;
}

/// Per-tree horticultural logs
pub struct TreeLogs;

impl LogSchema for TreeLogs {
    type Action = TreeAction;
    type Header = TreeLog;

    const HEADER_TABLE: Table = Table::TreeLogs;
    const PARENT_KEY: &'static str = "tree_id";
    const DETAIL_KEY: &'static str = "tree_log_id";

    fn detail_table(kind: shared::TreeActionType) -> Table {
        Table::from(kind)
    }

    fn log_id(header: &TreeLog) -> Uuid {
        header.id
    }
}

/// Per-batch oil processing logs
pub struct BatchLogs;

impl LogSchema for BatchLogs {
    type Action = BatchAction;
    type Header = BatchLog;

    const HEADER_TABLE: Table = Table::OilProcessingBatchLogs;
    const PARENT_KEY: &'static str = "batch_id";
    const DETAIL_KEY: &'static str = "batch_log_id";

    fn detail_table(kind: shared::BatchActionType) -> Table {
        Table::from(kind)
    }

    fn log_id(header: &BatchLog) -> Uuid {
        header.id
    }
}

/// Failure while writing a log entry
#[derive(Error, Debug)]
pub enum LogWriteError {
    /// Nothing was written
    #[error("log header could not be written: {0}")]
    Header(#[source] StoreError),

    /// The header exists without its detail row
    #[error("log {log_id} was written without its detail: {source}")]
    Detail { log_id: Uuid, source: StoreError },
}

/// Reads and writes logs of one schema
pub struct LogBook<S: LogSchema> {
    store: Arc<dyn DataStore>,
    schema: PhantomData<S>,
}

impl<S: LogSchema> LogBook<S> {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            schema: PhantomData,
        }
    }

    /// Headers for one tree or batch, newest first
    pub async fn list(&self, parent_id: Uuid) -> StoreResult<Vec<S::Header>> {
        let query = Query::new().eq(S::PARENT_KEY, parent_id).order_desc("date");
        let rows = self.store.select(S::HEADER_TABLE, &query).await?;
        from_rows(rows)
    }

    pub async fn header(&self, log_id: Uuid) -> StoreResult<Option<S::Header>> {
        let query = Query::new().eq("id", log_id);
        self.store
            .select_one(S::HEADER_TABLE, &query)
            .await?
            .map(from_row)
            .transpose()
    }

    /// Detail of `log_id` looked up in the table for `kind`.
    ///
    /// Asking with a kind other than the one the log was written with finds
    /// no row and yields `None`.
    pub async fn detail(
        &self,
        log_id: Uuid,
        kind: <S::Action as ActionDetail>::Kind,
    ) -> StoreResult<Option<S::Action>> {
        let query = Query::new().eq(S::DETAIL_KEY, log_id);
        let Some(row) = self.store.select_one(S::detail_table(kind), &query).await? else {
            return Ok(None);
        };
        Ok(Some(S::Action::from_fields(kind, Value::Object(row))?))
    }

    /// Write the header, then the detail row referencing it
    pub async fn write(
        &self,
        parent_id: Uuid,
        date: NaiveDate,
        action: &S::Action,
    ) -> Result<S::Header, LogWriteError> {
        let kind = action.kind();

        let header_row = header_row::<S>(parent_id, date, action).map_err(LogWriteError::Header)?;
        let stored = self
            .store
            .insert_one(S::HEADER_TABLE, header_row)
            .await
            .map_err(LogWriteError::Header)?;
        let header: S::Header = from_row(stored).map_err(LogWriteError::Header)?;
        let log_id = S::log_id(&header);

        tracing::debug!("Created {} log {} for {}", kind, log_id, parent_id);

        let detail = action
            .fields()
            .map_err(StoreError::from)
            .map(|mut fields| {
                fields.insert(S::DETAIL_KEY.to_string(), Value::String(log_id.to_string()));
                fields
            });
        let result = match detail {
            Ok(fields) => self
                .store
                .insert_one(S::detail_table(kind), fields)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(source) = result {
            tracing::error!(
                "Detail for {} log {} was not stored; header remains: {}",
                kind,
                log_id,
                source
            );
            return Err(LogWriteError::Detail { log_id, source });
        }

        Ok(header)
    }
}

fn header_row<S: LogSchema>(
    parent_id: Uuid,
    date: NaiveDate,
    action: &S::Action,
) -> StoreResult<Row> {
    let mut row = Row::new();
    row.insert(S::PARENT_KEY.to_string(), serde_json::to_value(parent_id)?);
    row.insert("date".to_string(), serde_json::to_value(date)?);
    row.insert("action_type".to_string(), serde_json::to_value(action.kind())?);
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use shared::{BottlingDetail, IrrigationDetail, TreeActionType};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn test_write_stores_header_and_detail() {
        let store = Arc::new(MemoryStore::new());
        let book = LogBook::<TreeLogs>::new(store.clone());
        let tree_id = Uuid::new_v4();

        let action = TreeAction::Irrigation(IrrigationDetail {
            number_of_drippers: Some(4),
            number_of_hours: None,
        });
        let header = book.write(tree_id, date(), &action).await.unwrap();

        assert_eq!(header.tree_id, tree_id);
        assert_eq!(header.action_type, TreeActionType::Irrigation);
        assert_eq!(store.count(Table::TreeLogs).await, 1);

        let detail_rows = store.rows(Table::IrrigationLogs).await;
        assert_eq!(detail_rows.len(), 1);
        assert_eq!(
            detail_rows[0]["tree_log_id"],
            Value::String(header.id.to_string())
        );
    }

    #[tokio::test]
    async fn test_detail_failure_reports_orphaned_header() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_to(Table::BottlingLogs);
        let book = LogBook::<BatchLogs>::new(store.clone());

        let action = BatchAction::Bottling(BottlingDetail::default());
        let err = book.write(Uuid::new_v4(), date(), &action).await.unwrap_err();

        match err {
            LogWriteError::Detail { log_id, .. } => {
                let header = book.header(log_id).await.unwrap();
                assert!(header.is_some());
            }
            other => panic!("expected a detail failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_header_failure_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_to(Table::TreeLogs);
        let book = LogBook::<TreeLogs>::new(store.clone());

        let action = TreeAction::Irrigation(IrrigationDetail::default());
        let err = book.write(Uuid::new_v4(), date(), &action).await.unwrap_err();

        assert!(matches!(err, LogWriteError::Header(_)));
        assert_eq!(store.calls().inserted_rows, 0);
    }
}
