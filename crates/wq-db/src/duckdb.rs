//! DuckDB warehouse backend
//!
//! Catalogs stand in for projects and schemas for datasets, so
//! `memory.sales.orders` is addressed the same way as
//! `my-project.sales.orders` on BigQuery.

use crate::error::{DbError, DbResult};
use crate::traits::{CatalogDialect, Warehouse};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::{Connection, InterruptHandle};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// DuckDB warehouse backend
///
/// Queries run on the blocking thread pool. A query whose caller stops
/// waiting (for example on timeout) is interrupted.
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn from_connection(conn: Connection) -> Self {
        let interrupt = conn.interrupt_handle();
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
        }
    }

    /// Execute one or more statements, discarding results
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> DbResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| DbError::MutexPoisoned(e.to_string()))
}

/// Progress of one query, shared between the caller and the blocking task
#[derive(Debug, Default)]
struct QueryState {
    running: bool,
    abandoned: bool,
}

/// Interrupts the connection if dropped before the query finished.
///
/// `running` is only true while the task holds the connection, so the
/// interrupt can never land on another caller's statement.
struct InterruptOnDrop {
    state: Arc<Mutex<QueryState>>,
    handle: Arc<InterruptHandle>,
    armed: bool,
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.abandoned = true;
        if state.running {
            log::debug!("Interrupting abandoned DuckDB query");
            self.handle.interrupt();
        }
    }
}

/// Run `sql` on the shared connection unless the caller already gave up
fn run_tracked(conn: &Mutex<Connection>, state: &Mutex<QueryState>, sql: &str) -> DbResult<Vec<Value>> {
    let conn = lock(conn)?;
    {
        let mut state = lock(state)?;
        if state.abandoned {
            return Err(DbError::ExecutionError(
                "query abandoned before it started".to_string(),
            ));
        }
        state.running = true;
    }
    let result = query_sync(&conn, sql);
    lock(state)?.running = false;
    result
}

/// Run a query and convert every row to a JSON object.
///
/// DuckDB 1.4 panics on `stmt.column_count()` before execution, so rows
/// are collected via `query_map` first and column names read afterwards.
fn query_sync(conn: &Connection, sql: &str) -> DbResult<Vec<Value>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;

    let raw_rows: Vec<Vec<Value>> = stmt
        .query_map([], |row| {
            let col_count = row.as_ref().column_count();
            (0..col_count)
                .map(|i| column_to_json(row, i))
                .collect::<duckdb::Result<Vec<Value>>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let column_names: Vec<String> = (0..stmt.column_count())
        .map(|i| {
            stmt.column_name(i)
                .map_or_else(|_| format!("column{}", i), |name| name.to_string())
        })
        .collect();

    Ok(raw_rows
        .into_iter()
        .map(|values| {
            let object: Map<String, Value> = column_names.iter().cloned().zip(values).collect();
            Value::Object(object)
        })
        .collect())
}

#[async_trait]
impl Warehouse for DuckDbBackend {
    async fn query(&self, sql: &str) -> DbResult<Vec<Value>> {
        let conn = Arc::clone(&self.conn);
        let state = Arc::new(Mutex::new(QueryState::default()));
        let mut guard = InterruptOnDrop {
            state: Arc::clone(&state),
            handle: Arc::clone(&self.interrupt),
            armed: true,
        };
        let sql = sql.to_string();

        let joined = tokio::task::spawn_blocking(move || run_tracked(&conn, &state, &sql)).await;
        guard.armed = false;
        joined.map_err(|e| DbError::ExecutionError(format!("query task failed: {}", e)))?
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn dialect(&self) -> CatalogDialect {
        CatalogDialect::DuckDb
    }
}

/// Convert one DuckDB cell to JSON.
fn column_to_json(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<Value> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::from(n),
        ValueRef::SmallInt(n) => Value::from(n),
        ValueRef::Int(n) => Value::from(n),
        ValueRef::BigInt(n) => Value::from(n),
        ValueRef::HugeInt(n) => i64::try_from(n)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(n.to_string())),
        ValueRef::UTinyInt(n) => Value::from(n),
        ValueRef::USmallInt(n) => Value::from(n),
        ValueRef::UInt(n) => Value::from(n),
        ValueRef::UBigInt(n) => Value::from(n),
        ValueRef::Float(f) => float_to_json(f64::from(f)),
        ValueRef::Double(f) => float_to_json(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>()
                .map(float_to_json)
                .unwrap_or(Value::String(text))
        }
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Timestamp(unit, raw) => timestamp_to_json(unit, raw),
        ValueRef::Date32(days) => date_to_json(days),
        _ => match row.get::<_, Option<String>>(idx) {
            Ok(Some(s)) => Value::String(s),
            _ => {
                log::debug!("Unsupported DuckDB value in column {}, returning null", idx);
                Value::Null
            }
        },
    };
    Ok(value)
}

fn float_to_json(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn timestamp_to_json(unit: TimeUnit, raw: i64) -> Value {
    let micros = match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|ts| Value::String(ts.to_rfc3339()))
        .unwrap_or(Value::Null)
}

fn date_to_json(days_since_epoch: i32) -> Value {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days_since_epoch.into())))
        .map(|date| Value::String(date.to_string()))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
