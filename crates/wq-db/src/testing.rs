//! Scripted warehouse for tests
//!
//! Responses are matched by substring against the incoming SQL, first rule
//! wins. Every statement is recorded so tests can assert on call counts.

use crate::error::{DbError, DbResult};
use crate::traits::{CatalogDialect, Warehouse};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Rows(Vec<Value>),
    Fail(String),
}

struct Rule {
    pattern: String,
    reply: Reply,
}

/// In-memory warehouse answering from a script
pub struct ScriptedWarehouse {
    dialect: CatalogDialect,
    rules: Vec<Rule>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedWarehouse {
    pub fn new(dialect: CatalogDialect) -> Self {
        Self {
            dialect,
            rules: Vec::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer statements containing `pattern` with `rows`
    pub fn on(mut self, pattern: &str, rows: Vec<Value>) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            reply: Reply::Rows(rows),
        });
        self
    }

    /// Fail statements containing `pattern` with `message`
    pub fn fail_on(mut self, pattern: &str, message: &str) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            reply: Reply::Fail(message.to_string()),
        });
        self
    }

    /// Sleep before answering every statement
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Statements received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl Warehouse for ScriptedWarehouse {
    async fn query(&self, sql: &str) -> DbResult<Vec<Value>> {
        self.calls
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
            .push(sql.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.rules.iter().find(|r| sql.contains(&r.pattern)) {
            Some(Rule {
                reply: Reply::Rows(rows),
                ..
            }) => Ok(rows.clone()),
            Some(Rule {
                reply: Reply::Fail(message),
                ..
            }) => Err(DbError::ExecutionError(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    fn db_type(&self) -> &'static str {
        "scripted"
    }

    fn dialect(&self) -> CatalogDialect {
        self.dialect
    }
}
