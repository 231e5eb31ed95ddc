//! PostgREST store backend
//!
//! Speaks the PostgREST dialect used by hosted Supabase projects:
//! `col=eq.value` and `col=in.(a,b)` filters, `order=col.asc` ordering and
//! `Prefer: return=representation` on writes.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use uuid::Uuid;

use super::{DataStore, Filter, Query, Row, StoreError, StoreResult, Table};

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestStore {
    /// `base_url` is the PostgREST root, e.g. `https://<project>.supabase.co/rest/v1`
    pub fn new(base_url: &str, api_key: Option<String>) -> StoreResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Configuration(
                "store.url is required for the rest backend".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.name())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn rows(table: Table, response: Response) -> StoreResult<Vec<Row>> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                table: table.name(),
                status,
                message,
            });
        }

        let rows: Vec<Row> = response.json().await?;
        Ok(rows)
    }
}

/// Query-string pairs for a select
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        match filter {
            Filter::Eq { column, value } => {
                params.push((column.to_string(), format!("eq.{}", plain(value))));
            }
            Filter::In { column, values } => {
                let list: Vec<String> = values.iter().map(quoted).collect();
                params.push((column.to_string(), format!("in.({})", list.join(","))));
            }
        }
    }

    if !query.order.is_empty() {
        let order: Vec<String> = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect();
        params.push(("order".to_string(), order.join(",")));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// List members are double quoted so commas inside values survive
fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

#[async_trait]
impl DataStore for RestStore {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&query_params(query));
        let response = self.authorized(request).send().await?;
        Self::rows(table, response).await
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = self.authorized(request).send().await?;
        Self::rows(table, response).await
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> StoreResult<Option<Row>> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.authorized(request).send().await?;
        Ok(Self::rows(table, response).await?.into_iter().next())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.select(Table::Trees, &Query::new().limit(1)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_dialect() {
        let id = Uuid::nil();
        let query = Query::new()
            .eq("tree_id", id)
            .order_asc("position_row")
            .order_desc("date")
            .limit(10);

        let params = query_params(&query);
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert_eq!(
            params[1],
            ("tree_id".to_string(), format!("eq.{}", id))
        );
        assert_eq!(
            params[2],
            ("order".to_string(), "position_row.asc,date.desc".to_string())
        );
        assert_eq!(params[3], ("limit".to_string(), "10".to_string()));
    }

    #[test]
    fn test_membership_values_are_quoted() {
        let query = Query::new().is_in("id", &["a,b", "c"]);
        let params = query_params(&query);
        assert_eq!(
            params[1],
            ("id".to_string(), "in.(\"a,b\",\"c\")".to_string())
        );
    }

    #[test]
    fn test_requires_url() {
        assert!(RestStore::new("", None).is_err());
        let store = RestStore::new("http://localhost:3000/", None).unwrap();
        assert_eq!(store.table_url(Table::TreeLogs), "http://localhost:3000/tree_logs");
    }
}
