//! Query-execution capability for the conversation-log warehouse
//!
//! The workflow only needs two queries: the fixed no-match retrieval template
//! and the schema-introspection query that seeds the workflow state. Both run
//! through the [`QueryExecutor`] trait so tests can substitute canned rows.

use crate::csv::Record;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// One column of a queryable table, from INFORMATION_SCHEMA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub description: String,
}

/// Inclusive date range for the retrieval query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window ending today with `start = end - days`, inclusive of both
    /// endpoints when used in a `BETWEEN` filter
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now().date_naive();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }
}

impl Default for DateWindow {
    /// Most recent 7 days, the window used when the caller gives no range
    fn default() -> Self {
        Self::last_days(7)
    }
}

/// Query-execution capability
///
/// Accepts a target project and a SQL string; returns ordered records mapping
/// column name to rendered value.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, project: &str, sql: &str) -> Result<Vec<Record>>;
}

/// The fixed no-match retrieval query
///
/// Groups transcripts by conversation id, concatenates per-turn user
/// utterances ordered by timestamp, counts turns with intent confidence 0.0
/// or absent, keeps conversations with at least one such turn, and caps the
/// result at the 10 worst conversations.
pub fn no_match_query(project: &str, dataset: &str, window: DateWindow) -> String {
    format!(
        r#"SELECT
  REGEXP_EXTRACT(conversation_name, r'[^\\/]+$') AS Convo_ID,
  STRING_AGG(JSON_VALUE(request, '$.queryInput.text.text'), '\n---\n' ORDER BY request_time) AS conversation_script,
  COUNT(CASE WHEN JSON_VALUE(request, '$.intentDetectionConfidence') = '0.0' OR JSON_VALUE(request, '$.intentDetectionConfidence') IS NULL THEN 1 END) AS no_match_count
FROM
  `{project}.{dataset}.dialogflow_bigquery_export_data`
WHERE
  DATE(request_time) BETWEEN '{start}' AND '{end}'
  AND JSON_VALUE(request, '$.queryInput.text.text') IS NOT NULL
GROUP BY
  Convo_ID
HAVING
  no_match_count > 0
ORDER BY
  no_match_count DESC
LIMIT 10"#,
        project = project,
        dataset = dataset,
        start = window.start,
        end = window.end,
    )
}

/// Introspection query for every column in the dataset
pub fn schema_metadata_query(project: &str, location: &str, dataset: &str) -> String {
    format!(
        r#"SELECT table_name, column_name, data_type, description
FROM `region-{location}.INFORMATION_SCHEMA.COLUMN_FIELD_PATHS`
WHERE table_catalog = "{project}"
AND table_schema = "{dataset}""#,
    )
}

/// Fetch schema metadata for the dataset
///
/// A data-access failure here is downgraded to an empty list with a warning;
/// the workflow proceeds without table metadata.
pub async fn fetch_schema_metadata(
    executor: &dyn QueryExecutor,
    project: &str,
    location: &str,
    dataset: &str,
) -> Vec<ColumnMetadata> {
    let sql = schema_metadata_query(project, location, dataset);
    match executor.execute(project, &sql).await {
        Ok(rows) => rows
            .iter()
            .map(|row| ColumnMetadata {
                table_name: field(row, "table_name"),
                column_name: field(row, "column_name"),
                data_type: field(row, "data_type"),
                description: field(row, "description"),
            })
            .collect(),
        Err(e) => {
            warn!("Could not fetch schema metadata: {}", e);
            Vec::new()
        }
    }
}

fn field(row: &Record, name: &str) -> String {
    row.get(name).cloned().unwrap_or_default()
}

/// BigQuery REST client
///
/// Thin shim over the synchronous `jobs.query` endpoint. Authentication is a
/// bearer token from `GOOGLE_OAUTH_ACCESS_TOKEN`; the endpoint is overridable
/// for tests.
#[derive(Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    endpoint: String,
    location: String,
    token: Option<String>,
}

impl BigQueryClient {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: "https://bigquery.googleapis.com/bigquery/v2".to_string(),
            location: location.into(),
            token: std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok(),
        }
    }

    /// Override the API endpoint (tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "useLegacySql")]
    use_legacy_sql: bool,
    location: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    schema: Option<Schema>,
    #[serde(default)]
    rows: Vec<RowWrapper>,
}

#[derive(Deserialize)]
struct Schema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Deserialize)]
struct FieldSchema {
    name: String,
}

#[derive(Deserialize)]
struct RowWrapper {
    #[serde(default)]
    f: Vec<CellWrapper>,
}

#[derive(Deserialize)]
struct CellWrapper {
    #[serde(default)]
    v: Value,
}

#[async_trait]
impl QueryExecutor for BigQueryClient {
    async fn execute(&self, project: &str, sql: &str) -> Result<Vec<Record>> {
        debug!("Executing query on project: {}", project);

        let url = format!("{}/projects/{}/queries", self.endpoint, project);
        let body = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            location: &self.location,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Query(format!("query failed ({}): {}", status, detail)));
        }

        let payload: QueryResponse = response.json().await?;
        let columns: Vec<String> = payload
            .schema
            .map(|s| s.fields.into_iter().map(|f| f.name).collect())
            .unwrap_or_default();

        let records = payload
            .rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(row.f)
                    .map(|(name, cell)| (name.clone(), render_value(&cell.v)))
                    .collect()
            })
            .collect();

        Ok(records)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_query_shape() {
        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        };
        let sql = no_match_query("demo-project", "dialogflow_export", window);

        assert!(sql.contains("`demo-project.dialogflow_export.dialogflow_bigquery_export_data`"));
        assert!(sql.contains("BETWEEN '2024-01-01' AND '2024-01-07'"));
        assert!(sql.contains("no_match_count > 0"));
        assert!(sql.contains("ORDER BY\n  no_match_count DESC"));
        assert!(sql.contains("LIMIT 10"));
    }

    #[test]
    fn test_default_window_is_seven_days() {
        let window = DateWindow::default();
        assert_eq!(window.end - window.start, Duration::days(7));
        assert_eq!(window.end, Utc::now().date_naive());
    }

    #[test]
    fn test_schema_query_targets_dataset() {
        let sql = schema_metadata_query("demo-project", "us-central1", "dialogflow_export");
        assert!(sql.contains("region-us-central1.INFORMATION_SCHEMA.COLUMN_FIELD_PATHS"));
        assert!(sql.contains(r#"table_schema = "dialogflow_export""#));
    }

    #[test]
    fn test_render_value_variants() {
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&Value::String("3".into())), "3");
        assert_eq!(render_value(&serde_json::json!(3)), "3");
    }

    #[tokio::test]
    async fn test_fetch_schema_metadata_downgrades_failure() {
        struct FailingExecutor;

        #[async_trait]
        impl QueryExecutor for FailingExecutor {
            async fn execute(&self, _project: &str, _sql: &str) -> Result<Vec<Record>> {
                Err(Error::Query("unreachable".to_string()))
            }
        }

        let metadata =
            fetch_schema_metadata(&FailingExecutor, "demo", "us-central1", "dataset").await;
        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_schema_metadata_maps_rows() {
        struct CannedExecutor;

        #[async_trait]
        impl QueryExecutor for CannedExecutor {
            async fn execute(&self, _project: &str, _sql: &str) -> Result<Vec<Record>> {
                let row: Record = [
                    ("table_name", "dialogflow_bigquery_export_data"),
                    ("column_name", "request"),
                    ("data_type", "JSON"),
                    ("description", "raw request payload"),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
                Ok(vec![row])
            }
        }

        let metadata = fetch_schema_metadata(&CannedExecutor, "demo", "us", "ds").await;
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].column_name, "request");
        assert_eq!(metadata[0].data_type, "JSON");
    }
}
