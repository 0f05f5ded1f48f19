//! Canned generator for tests
//!
//! Replies are consumed in order; once the queue is down to its last reply,
//! that reply is repeated. Questions are recorded for assertions.

use crate::error::{GenerateError, GenerateResult};
use crate::traits::SqlGenerator;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use wq_core::{SqlCandidate, UnifiedSchema};

#[derive(Clone)]
enum Reply {
    Candidate(SqlCandidate),
    Fail(String),
}

/// Generator answering from a fixed script
pub struct CannedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    delay: Option<Duration>,
    questions: Mutex<Vec<String>>,
}

impl CannedGenerator {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            delay: None,
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with a candidate for `sql`
    pub fn answering(sql: &str) -> Self {
        Self::new().then_answer(candidate(sql, 0.9))
    }

    pub fn then_answer(self, candidate: SqlCandidate) -> Self {
        self.push(Reply::Candidate(candidate))
    }

    /// Queue a transport-style failure
    pub fn then_fail(self, message: &str) -> Self {
        self.push(Reply::Fail(message.to_string()))
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(self, reply: Reply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Questions asked so far
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.questions().len()
    }

    fn next_reply(&self) -> Option<Reply> {
        let mut replies = self.replies.lock().ok()?;
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A well-formed candidate for `sql`
pub fn candidate(sql: &str, confidence: f64) -> SqlCandidate {
    SqlCandidate {
        sql: sql.to_string(),
        explanation: "canned answer".to_string(),
        confidence,
        assumptions: Vec::new(),
        tables_used: Vec::new(),
    }
}

#[async_trait]
impl SqlGenerator for CannedGenerator {
    async fn generate(&self, question: &str, _schema: &UnifiedSchema) -> GenerateResult<SqlCandidate> {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(question.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply() {
            Some(Reply::Candidate(c)) => {
                c.validate().map_err(GenerateError::InvalidCandidate)?;
                Ok(c)
            }
            Some(Reply::Fail(message)) => Err(GenerateError::Transport(message)),
            None => Err(GenerateError::EmptyResponse),
        }
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[cfg(test)]
#[path = "testing_test.rs"]
mod tests;
