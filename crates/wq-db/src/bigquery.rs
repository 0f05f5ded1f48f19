//! BigQuery warehouse backend over the v2 REST API
//!
//! Queries go through `jobs.query`; incomplete jobs are polled with
//! `jobs.getQueryResults` until `jobComplete`, following page tokens until
//! `max_rows` rows are collected. Rows arrive in the `{"f": [{"v": ...}]}`
//! encoding and are decoded against the result schema.

use crate::error::{DbError, DbResult};
use crate::traits::{CatalogDialect, Warehouse};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use wq_core::config::{require_var, WarehouseConfig, ACCESS_TOKEN_ENV_VAR};

const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Server-side wait per `jobs.query` / `getQueryResults` call
const POLL_WAIT_MS: u64 = 10_000;

/// BigQuery warehouse backend
pub struct BigQueryBackend {
    http: reqwest::Client,
    endpoint: String,
    /// Project billed for query jobs
    billing_project: String,
    access_token: String,
    location: Option<String>,
    max_rows: usize,
}

impl std::fmt::Debug for BigQueryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryBackend")
            .field("endpoint", &self.endpoint)
            .field("billing_project", &self.billing_project)
            .field("location", &self.location)
            .finish()
    }
}

impl BigQueryBackend {
    pub fn new(
        billing_project: impl Into<String>,
        access_token: impl Into<String>,
        config: &WarehouseConfig,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            billing_project: billing_project.into(),
            access_token: access_token.into(),
            location: config.location.clone(),
            max_rows: config.max_rows,
        }
    }

    /// Build a client from environment values, failing fast on missing credentials
    pub fn from_env<F>(
        billing_project: Option<&str>,
        config: &WarehouseConfig,
        lookup: F,
    ) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project = match billing_project {
            Some(p) => p.to_string(),
            None => require_var(&lookup, wq_core::config::PROJECT_ENV_VAR)?,
        };
        let token = require_var(&lookup, ACCESS_TOKEN_ENV_VAR)?;
        Ok(Self::new(project, token, config))
    }

    /// Point the client at a different API root
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> DbResult<QueryResponse> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(DbError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<QueryResponse>().await?)
    }

    async fn start_query(&self, sql: &str) -> DbResult<QueryResponse> {
        let mut body = json!({
            "query": sql,
            "useLegacySql": false,
            "timeoutMs": POLL_WAIT_MS,
            "maxResults": self.max_rows,
        });
        if let Some(location) = &self.location {
            body["location"] = json!(location);
        }

        let url = format!("{}/projects/{}/queries", self.endpoint, self.billing_project);
        self.send(self.http.post(url).json(&body)).await
    }

    async fn fetch_results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> DbResult<QueryResponse> {
        let url = format!(
            "{}/projects/{}/queries/{}",
            self.endpoint, job.project_id, job.job_id
        );
        let mut params: Vec<(&str, String)> = vec![
            ("timeoutMs", POLL_WAIT_MS.to_string()),
            ("maxResults", self.max_rows.to_string()),
        ];
        if let Some(location) = job.location.as_ref().or(self.location.as_ref()) {
            params.push(("location", location.clone()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        self.send(self.http.get(url).query(&params)).await
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Value>> {
        let mut response = self.start_query(sql).await?;

        while !response.job_complete {
            let job = response
                .job_reference
                .clone()
                .ok_or_else(|| DbError::Decode("incomplete job without jobReference".to_string()))?;
            log::debug!("BigQuery job {} still running, polling", job.job_id);
            tokio::time::sleep(Duration::from_millis(200)).await;
            response = self.fetch_results(&job, None).await?;
        }
        response.raise_errors()?;

        let fields = response
            .schema
            .as_ref()
            .map(|s| s.fields.clone())
            .unwrap_or_default();
        let mut rows = decode_rows(&fields, response.rows.take().unwrap_or_default())?;

        while rows.len() < self.max_rows {
            let (Some(token), Some(job)) = (response.page_token.take(), response.job_reference.clone())
            else {
                break;
            };
            response = self.fetch_results(&job, Some(&token)).await?;
            response.raise_errors()?;
            rows.extend(decode_rows(&fields, response.rows.take().unwrap_or_default())?);
        }

        rows.truncate(self.max_rows);
        Ok(rows)
    }
}

#[async_trait]
impl Warehouse for BigQueryBackend {
    async fn query(&self, sql: &str) -> DbResult<Vec<Value>> {
        self.query_rows(sql).await
    }

    fn db_type(&self) -> &'static str {
        "bigquery"
    }

    fn dialect(&self) -> CatalogDialect {
        CatalogDialect::BigQuery
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    project_id: String,
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

/// One column of a result schema
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FieldSchema {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    mode: Option<String>,
    /// Sub-fields of a RECORD column
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    job_reference: Option<JobReference>,
    #[serde(default)]
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Option<Vec<Value>>,
    #[serde(default)]
    page_token: Option<String>,
    /// Warnings as well as errors; only fatal when nothing else came back
    #[serde(default)]
    errors: Vec<ErrorProto>,
    #[serde(default)]
    status: Option<JobStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    #[serde(default)]
    error_result: Option<ErrorProto>,
}

impl QueryResponse {
    /// Fail on a job-level error result, or on `errors` from a finished job
    /// that produced no result schema. Other entries are logged as warnings.
    fn raise_errors(&self) -> DbResult<()> {
        if let Some(fatal) = self.status.as_ref().and_then(|s| s.error_result.as_ref()) {
            let mut message = fatal.message.clone();
            if !self.errors.is_empty() {
                message = format!("{}; {}", message, self.joined_errors());
            }
            return Err(DbError::ExecutionError(message));
        }
        if self.errors.is_empty() {
            return Ok(());
        }
        if self.job_complete && self.schema.is_none() {
            return Err(DbError::ExecutionError(self.joined_errors()));
        }
        log::warn!("BigQuery reported warnings: {}", self.joined_errors());
        Ok(())
    }

    fn joined_errors(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Decode `{"f": [{"v": ...}]}` rows into JSON objects keyed by field name.
pub(crate) fn decode_rows(fields: &[FieldSchema], rows: Vec<Value>) -> DbResult<Vec<Value>> {
    rows.iter().map(|row| decode_record(fields, row)).collect()
}

fn decode_record(fields: &[FieldSchema], record: &Value) -> DbResult<Value> {
    let cells = record["f"]
        .as_array()
        .ok_or_else(|| DbError::Decode("row is missing its 'f' cell list".to_string()))?;
    if cells.len() != fields.len() {
        return Err(DbError::Decode(format!(
            "row has {} cells but the schema has {} fields",
            cells.len(),
            fields.len()
        )));
    }

    let mut object = Map::with_capacity(fields.len());
    for (field, cell) in fields.iter().zip(cells) {
        object.insert(field.name.clone(), decode_field(field, &cell["v"])?);
    }
    Ok(Value::Object(object))
}

fn decode_field(field: &FieldSchema, value: &Value) -> DbResult<Value> {
    if field.mode.as_deref() == Some("REPEATED") {
        let items = match value {
            Value::Null => return Ok(Value::Array(Vec::new())),
            Value::Array(items) => items,
            _ => {
                return Err(DbError::Decode(format!(
                    "repeated field '{}' is not an array",
                    field.name
                )))
            }
        };
        return items
            .iter()
            .map(|item| decode_scalar(field, &item["v"]))
            .collect::<DbResult<Vec<_>>>()
            .map(Value::Array);
    }
    decode_scalar(field, value)
}

fn decode_scalar(field: &FieldSchema, value: &Value) -> DbResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if matches!(field.field_type.as_str(), "RECORD" | "STRUCT") {
        return decode_record(&field.fields, value);
    }

    let Some(text) = value.as_str() else {
        return Ok(value.clone());
    };

    let decoded = match field.field_type.as_str() {
        "INTEGER" | "INT64" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "FLOAT" | "FLOAT64" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        "BOOLEAN" | "BOOL" => Value::Bool(text.eq_ignore_ascii_case("true")),
        "TIMESTAMP" => decode_timestamp(text),
        _ => Value::String(text.to_string()),
    };
    Ok(decoded)
}

/// TIMESTAMP cells are seconds since the epoch as a decimal string.
fn decode_timestamp(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(|secs| chrono::DateTime::<chrono::Utc>::from_timestamp_micros((secs * 1e6).round() as i64))
        .map(|ts| Value::String(ts.to_rfc3339()))
        .unwrap_or_else(|| Value::String(text.to_string()))
}

#[cfg(test)]
#[path = "bigquery_test.rs"]
mod tests;
