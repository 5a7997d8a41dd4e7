//! Chat-completions client used to ask for admission data in natural
//! language.
//!
//! The endpoint answers in prose; this module's only job is to produce the
//! reply text (or a failure). Parsing lives in `crate::parse` and never
//! sees HTTP concerns; retry/backoff lives here and never leaks into the
//! parsers.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config;
use crate::error::AppError;

const MAX_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can answer a natural-language query with reply text.
///
/// The interesting implementations are [`ChatClient`] (live endpoint) and
/// [`crate::data::MockService`] (offline, deterministic).
pub trait QueryService {
    fn query(&self, prompt: &str) -> Result<String, AppError>;
}

/// Blocking client for the chat-completions endpoint.
pub struct ChatClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ChatClient {
    /// Build a client from the environment (`.env` honored).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("DOUBAO_API_KEY")
            .map_err(|_| AppError::new(2, "Missing DOUBAO_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_url: config::CHAT_API_URL.to_string(),
            api_key,
        })
    }

    fn send(&self, prompt: &str) -> Result<String, AppError> {
        let payload = serde_json::json!({
            "model": config::CHAT_MODEL,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.7,
            "max_tokens": 2000,
        });

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .map_err(|e| AppError::new(4, format!("Chat request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Chat request failed with status {}.", resp.status()),
            ));
        }

        let body: ChatResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse chat response: {e}")))?;

        reply_content(body)
            .ok_or_else(|| AppError::new(4, "Chat response contained no message content."))
    }
}

impl QueryService for ChatClient {
    fn query(&self, prompt: &str) -> Result<String, AppError> {
        let mut last_err = AppError::new(4, "Chat query failed.");

        for attempt in 1..=MAX_ATTEMPTS {
            tracing::info!(attempt, prompt = %clip(prompt, 50), "sending chat query");
            match self.send(prompt) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    tracing::warn!(%err, attempt, "chat query attempt failed");
                    last_err = err;
                    if attempt < MAX_ATTEMPTS {
                        thread::sleep(RETRY_DELAY);
                    }
                }
            }
        }

        Err(last_err)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

fn reply_content(body: ChatResponse) -> Option<String> {
    body.choices.into_iter().next().map(|c| c.message.content)
}

/// Truncate on a character boundary for log lines.
fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('…');
    out
}
