//! PostgreSQL store backend
//!
//! Rows are shaped through `jsonb` so the generic store contract maps onto
//! plain SQL: reads return `to_jsonb(t)` and writes go through
//! `jsonb_populate_record(set)` so PostgreSQL performs the column casts.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{DataStore, Filter, Query, Row, StoreError, StoreResult, Table};
use crate::config::StoreConfig;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        if config.url.is_empty() {
            return Err(StoreError::Configuration(
                "store.url is required for the postgres backend".to_string(),
            ));
        }

        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await?;
        tracing::info!("Database connection established");

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations completed");
        Ok(())
    }
}

fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Union of the columns present in `rows`, in a stable order
fn columns_of(rows: &[Row]) -> Vec<String> {
    let set: BTreeSet<&String> = rows.iter().flat_map(|r| r.keys()).collect();
    set.into_iter().cloned().collect()
}

fn unwrap_rows(rows: Vec<Json<Value>>) -> Vec<Row> {
    rows.into_iter()
        .filter_map(|Json(value)| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// SELECT over `to_jsonb(t)` with the query's filters, order and limit
pub(crate) fn select_sql<'a>(table: Table, query: &'a Query) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT to_jsonb(t) FROM ");
    builder.push(ident(table.name())).push(" AS t");

    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Eq { column, value } => {
                builder
                    .push("to_jsonb(t) -> ")
                    .push_bind(*column)
                    .push(" = ")
                    .push_bind(Json(value.clone()));
            }
            Filter::In { column, values } => {
                builder
                    .push("to_jsonb(t) -> ")
                    .push_bind(*column)
                    .push(" IN (SELECT jsonb_array_elements(")
                    .push_bind(Json(Value::Array(values.clone())))
                    .push("))");
            }
        }
    }

    for (i, order) in query.order.iter().enumerate() {
        builder.push(if i == 0 { " ORDER BY t." } else { ", t." });
        builder
            .push(ident(order.column))
            .push(if order.ascending { " ASC" } else { " DESC" });
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }

    builder
}

#[async_trait]
impl DataStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        let rows = select_sql(table, query)
            .build_query_scalar::<Json<Value>>()
            .fetch_all(&self.pool)
            .await?;
        Ok(unwrap_rows(rows))
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let columns: Vec<String> = columns_of(&rows).iter().map(|c| ident(c)).collect();
        if columns.is_empty() {
            return Err(StoreError::Configuration(format!(
                "cannot insert rows without columns into {}",
                table
            )));
        }

        let table_ident = ident(table.name());
        let payload = Json(Value::Array(rows.into_iter().map(Value::Object).collect()));

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder
            .push(&table_ident)
            .push(" AS t (")
            .push(columns.join(", "))
            .push(") SELECT ")
            .push(columns.join(", "))
            .push(" FROM jsonb_populate_recordset(NULL::")
            .push(&table_ident)
            .push(", ")
            .push_bind(payload)
            .push(") RETURNING to_jsonb(t)");

        let stored = builder
            .build_query_scalar::<Json<Value>>()
            .fetch_all(&self.pool)
            .await?;
        Ok(unwrap_rows(stored))
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> StoreResult<Option<Row>> {
        let table_ident = ident(table.name());
        let columns: Vec<String> = patch.keys().filter(|c| *c != "id").cloned().collect();

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
        builder.push(&table_ident).push(" AS t SET ");
        if columns.is_empty() {
            builder.push("id = t.id");
        } else {
            let assignments: Vec<String> = columns
                .iter()
                .map(|c| format!("{0} = r.{0}", ident(c)))
                .collect();
            builder.push(assignments.join(", "));
        }
        builder
            .push(" FROM jsonb_populate_record(NULL::")
            .push(&table_ident)
            .push(", ")
            .push_bind(Json(Value::Object(patch)))
            .push(") AS r WHERE t.id = ")
            .push_bind(id)
            .push(" RETURNING to_jsonb(t)");

        let updated = builder
            .build_query_scalar::<Json<Value>>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated.and_then(|row| unwrap_rows(vec![row]).into_iter().next()))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
