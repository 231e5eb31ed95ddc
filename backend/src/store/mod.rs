//! Data store collaborator
//!
//! All persistence goes through [`DataStore`], a generic per-table client that
//! can select, insert and update rows. Rows travel as JSON objects; typed
//! conversion happens in the services through [`to_row`] and [`from_rows`].
//! Rows are never deleted.

mod memory;
mod postgres;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};
use shared::{BatchActionType, TreeActionType};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use rest::RestStore;

/// A stored row: column name to JSON value
pub type Row = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store rejected request to {table} ({status}): {message}")]
    Rejected {
        table: &'static str,
        status: u16,
        message: String,
    },

    #[error("Store returned no row from {0}")]
    EmptyResult(&'static str),

    #[error("Malformed row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store misconfigured: {0}")]
    Configuration(String),
}

/// Every table the grove records use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Trees,
    TreeLogs,
    PruningLogs,
    IrrigationLogs,
    HarvestingLogs,
    FertilizingLogs,
    TreatmentLogs,
    FloweringLogs,
    WeatherLogs,
    OilProcessingBatches,
    OilProcessingBatchLogs,
    TransportationGroveToPlantLogs,
    ProcessingLogs,
    FilteringLogs,
    TransportationPlantToHomeLogs,
    BottlingLogs,
    PicklingBatches,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Trees => "trees",
            Table::TreeLogs => "tree_logs",
            Table::PruningLogs => "pruning_logs",
            Table::IrrigationLogs => "irrigation_logs",
            Table::HarvestingLogs => "harvesting_logs",
            Table::FertilizingLogs => "fertilizing_logs",
            Table::TreatmentLogs => "treatment_logs",
            Table::FloweringLogs => "flowering_logs",
            Table::WeatherLogs => "weather_logs",
            Table::OilProcessingBatches => "oil_processing_batches",
            Table::OilProcessingBatchLogs => "oil_processing_batch_logs",
            Table::TransportationGroveToPlantLogs => "transportation_grove_to_plant_logs",
            Table::ProcessingLogs => "processing_logs",
            Table::FilteringLogs => "filtering_logs",
            Table::TransportationPlantToHomeLogs => "transportation_plant_to_home_logs",
            Table::BottlingLogs => "bottling_logs",
            Table::PicklingBatches => "pickling_batches",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<TreeActionType> for Table {
    fn from(kind: TreeActionType) -> Self {
        match kind {
            TreeActionType::Pruning => Table::PruningLogs,
            TreeActionType::Irrigation => Table::IrrigationLogs,
            TreeActionType::Harvesting => Table::HarvestingLogs,
            TreeActionType::Fertilizing => Table::FertilizingLogs,
            TreeActionType::Treatment => Table::TreatmentLogs,
            TreeActionType::Flowering => Table::FloweringLogs,
            TreeActionType::Weather => Table::WeatherLogs,
        }
    }
}

impl From<BatchActionType> for Table {
    fn from(kind: BatchActionType) -> Self {
        match kind {
            BatchActionType::TransportationGroveToPlant => Table::TransportationGroveToPlantLogs,
            BatchActionType::Processing => Table::ProcessingLogs,
            BatchActionType::Filtering => Table::FilteringLogs,
            BatchActionType::TransportationPlantToHome => Table::TransportationPlantToHomeLogs,
            BatchActionType::Bottling => Table::BottlingLogs,
        }
    }
}

/// Row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: &'static str, value: Value },
    In { column: &'static str, values: Vec<Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// Select query: filters are combined with AND, orders apply in sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Eq {
            column,
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        });
        self
    }

    pub fn is_in<T: Serialize>(mut self, column: &'static str, values: &[T]) -> Self {
        self.filters.push(Filter::In {
            column,
            values: values
                .iter()
                .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
                .collect(),
        });
        self
    }

    pub fn order_asc(mut self, column: &'static str) -> Self {
        self.order.push(Order {
            column,
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order.push(Order {
            column,
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Generic per-table store client
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>>;

    /// Insert rows and return them as stored (with generated columns)
    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Apply `patch` to the row with this `id`; `None` when no row matched
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> StoreResult<Option<Row>>;

    /// Cheap reachability check
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_one(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.insert(table, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyResult(table.name()))
    }

    async fn select_one(&self, table: Table, query: &Query) -> StoreResult<Option<Row>> {
        let query = query.clone().limit(1);
        Ok(self.select(table, &query).await?.into_iter().next())
    }
}

/// Serialize a record into a row
pub fn to_row<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(serde::de::Error::custom(format!(
            "expected an object row, got {}",
            other
        )))),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

/// Build the store backend selected in configuration
pub async fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn DataStore>> {
    match config.backend {
        StoreBackend::Rest => {
            let store = RestStore::new(&config.url, config.api_key.clone())?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(config).await?;
            if config.run_migrations {
                store.run_migrations().await?;
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
