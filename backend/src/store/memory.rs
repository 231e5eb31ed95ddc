//! In-process store backend
//!
//! Used for local development without a database and by the test suites.
//! Generates `id`, `created_at` and `updated_at` the way the database
//! defaults do, counts calls, and can be told to fail.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DataStore, Filter, Query, Row, StoreError, StoreResult, Table};

/// Call counters of a [`MemoryStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub selects: usize,
    pub inserts: usize,
    pub updates: usize,
    /// Rows written by successful insert calls
    pub inserted_rows: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.selects + self.inserts + self.updates
    }
}

#[derive(Debug, Default)]
struct Faults {
    reads: bool,
    writes_to: HashSet<Table>,
    inserts_after: Option<usize>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    selects: AtomicUsize,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    inserted_rows: AtomicUsize,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            selects: self.selects.load(AtomicOrdering::SeqCst),
            inserts: self.inserts.load(AtomicOrdering::SeqCst),
            updates: self.updates.load(AtomicOrdering::SeqCst),
            inserted_rows: self.inserted_rows.load(AtomicOrdering::SeqCst),
        }
    }

    /// Number of rows currently held in `table`
    pub async fn count(&self, table: Table) -> usize {
        self.tables.read().await.get(&table).map_or(0, Vec::len)
    }

    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every select fail
    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.reads = fail;
        }
    }

    /// Make inserts and updates against `table` fail
    pub fn fail_writes_to(&self, table: Table) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.writes_to.insert(table);
        }
    }

    /// Let `calls` insert calls succeed, then fail every later one
    pub fn fail_inserts_after(&self, calls: usize) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.inserts_after = Some(calls);
        }
    }

    fn check_read(&self, table: Table) -> StoreResult<()> {
        let failing = self.faults.lock().map(|f| f.reads).unwrap_or(false);
        if failing {
            return Err(rejected(table, 503, "reads unavailable"));
        }
        Ok(())
    }

    fn check_write(&self, table: Table, insert_call: Option<usize>) -> StoreResult<()> {
        let Ok(faults) = self.faults.lock() else {
            return Ok(());
        };
        if faults.writes_to.contains(&table) {
            return Err(rejected(table, 400, "write rejected"));
        }
        if let (Some(limit), Some(call)) = (faults.inserts_after, insert_call) {
            if call >= limit {
                return Err(rejected(table, 500, "insert limit reached"));
            }
        }
        Ok(())
    }
}

fn rejected(table: Table, status: u16, message: &str) -> StoreError {
    StoreError::Rejected {
        table: table.name(),
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        self.selects.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_read(table)?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|o| {
                    let ord = compare_values(
                        a.get(o.column).unwrap_or(&Value::Null),
                        b.get(o.column).unwrap_or(&Value::Null),
                    );
                    if o.ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let call = self.inserts.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_write(table, Some(call))?;

        let now = serde_json::to_value(Utc::now())?;
        let stored: Vec<Row> = rows
            .into_iter()
            .map(|mut row| {
                row.entry("id")
                    .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
                row.entry("created_at").or_insert_with(|| now.clone());
                row.entry("updated_at").or_insert_with(|| now.clone());
                row
            })
            .collect();

        let mut tables = self.tables.write().await;
        let existing = tables.entry(table).or_default();
        if table == Table::Trees {
            check_tree_positions(existing, &stored)?;
        }
        existing.extend(stored.iter().cloned());
        drop(tables);
        self.inserted_rows
            .fetch_add(stored.len(), AtomicOrdering::SeqCst);

        Ok(stored)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> StoreResult<Option<Row>> {
        self.updates.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_write(table, None)?;

        let key = Value::String(id.to_string());
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| row.get("id") == Some(&key)))
        else {
            return Ok(None);
        };

        for (column, value) in patch {
            row.insert(column, value);
        }
        row.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        Ok(Some(row.clone()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

fn tree_position(row: &Row) -> Option<(i64, i64)> {
    Some((
        row.get("position_row")?.as_i64()?,
        row.get("position_col")?.as_i64()?,
    ))
}

/// Grid positions are unique across the trees table
fn check_tree_positions(existing: &[Row], incoming: &[Row]) -> StoreResult<()> {
    let mut taken: HashSet<(i64, i64)> = existing.iter().filter_map(tree_position).collect();
    for row in incoming {
        if let Some((r, c)) = tree_position(row) {
            if !taken.insert((r, c)) {
                return Err(rejected(
                    Table::Trees,
                    409,
                    &format!("a tree already occupies position ({}, {})", r, c),
                ));
            }
        }
    }
    Ok(())
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => row.get(*column).unwrap_or(&Value::Null) == value,
        Filter::In { column, values } => row
            .get(*column)
            .is_some_and(|stored| values.iter().any(|v| v == stored)),
    }
}

/// Null sorts first, then booleans, numbers and strings
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
