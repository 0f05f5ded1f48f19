//! Generator backed by an OpenAI-compatible chat-completions endpoint

use crate::error::{GenerateError, GenerateResult};
use crate::prompt::{system_prompt, user_prompt, SqlDialect};
use crate::traits::SqlGenerator;
use async_trait::async_trait;
use serde_json::{json, Value};
use wq_core::config::{require_var, GeneratorConfig};
use wq_core::{SqlCandidate, UnifiedSchema};

/// Chat-completions SQL generator
#[derive(Clone)]
pub struct ChatSqlGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
    dialect: SqlDialect,
}

impl std::fmt::Debug for ChatSqlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSqlGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl ChatSqlGenerator {
    pub fn new(config: &GeneratorConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: api_key.into(),
            dialect: SqlDialect::default(),
        }
    }

    /// Build from config, reading the API key from the variable named by
    /// `api_key_env`
    pub fn from_config<F>(config: &GeneratorConfig, lookup: F) -> GenerateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = require_var(lookup, &config.api_key_env)?;
        Ok(Self::new(config, key))
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    fn request_body(&self, question: &str, schema: &UnifiedSchema) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system_prompt(self.dialect, schema) },
                { "role": "user", "content": user_prompt(question) },
            ],
        })
    }
}

#[async_trait]
impl SqlGenerator for ChatSqlGenerator {
    async fn generate(&self, question: &str, schema: &UnifiedSchema) -> GenerateResult<SqlCandidate> {
        let url = format!("{}/chat/completions", self.base_url);
        log::debug!("Requesting SQL from {} ({})", url, self.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(question, schema))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(GenerateError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        let candidate = parse_completion(&body)?;
        log::info!(
            "Generated SQL with confidence {:.2} using {} tables",
            candidate.confidence,
            candidate.tables_used.len()
        );
        Ok(candidate)
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}

/// Extract and validate the candidate from a chat-completions response body
pub fn parse_completion(body: &Value) -> GenerateResult<SqlCandidate> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(GenerateError::EmptyResponse)?;
    parse_candidate(content)
}

/// Parse candidate JSON, tolerating a surrounding Markdown code fence
pub fn parse_candidate(content: &str) -> GenerateResult<SqlCandidate> {
    let candidate: SqlCandidate = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| GenerateError::Unparsable(e.to_string()))?;
    candidate
        .validate()
        .map_err(GenerateError::InvalidCandidate)?;
    Ok(candidate)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
