use crate::Provider;
use crate::types::*;
use clioraops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted reply for deterministic runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockResponse {
    /// Reply text returned as the assistant message
    Text { content: String },
    /// Transport-level failure returned as `Error::Provider`
    Error { message: String },
}

/// Mock configuration from TOML file
#[derive(Debug, Deserialize)]
struct MockConfig {
    responses: Vec<MockResponse>,
}

/// Mock provider that replays scripted replies in order without network calls
pub struct MockProvider {
    responses: Vec<MockResponse>,
    current: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new(responses_file: Option<String>) -> Self {
        let responses = if let Some(path) = responses_file {
            Self::load_responses(&path)
        } else {
            vec![MockResponse::Text { content: "Mock response - configure responses_file in config".to_string() }]
        };

        Self::from_responses(responses)
    }

    /// Build a provider from replies held in memory
    pub fn from_responses(responses: Vec<MockResponse>) -> Self {
        Self { responses, current: AtomicUsize::new(0), requests: Mutex::new(Vec::new()) }
    }

    /// Provider that answers every call with the same text
    pub fn with_text(content: impl Into<String>) -> Self {
        Self::from_responses(vec![MockResponse::Text { content: content.into() }])
    }

    /// Provider whose every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_responses(vec![MockResponse::Error { message: message.into() }])
    }

    fn load_responses(path: &str) -> Vec<MockResponse> {
        let config_path = Path::new(path);
        if !config_path.exists() {
            tracing::warn!("Mock responses file not found: {}", path);
            return vec![MockResponse::Error { message: format!("Mock responses file not found: {}", path) }];
        }

        match fs::read_to_string(config_path) {
            Ok(content) => match toml::from_str::<MockConfig>(&content) {
                Ok(config) => config.responses,
                Err(e) => {
                    tracing::error!("Failed to parse mock responses: {}", e);
                    vec![MockResponse::Error { message: format!("Failed to parse mock responses: {}", e) }]
                }
            },
            Err(e) => {
                tracing::error!("Failed to read mock responses file: {}", e);
                vec![MockResponse::Error { message: format!("Failed to read mock responses file: {}", e) }]
            }
        }
    }

    /// Next scripted reply; a single scripted reply repeats forever
    fn next_response(&self) -> MockResponse {
        let index = self.current.fetch_add(1, Ordering::SeqCst);
        match self.responses.len() {
            0 => MockResponse::Error { message: "No mock responses configured".to_string() },
            1 => self.responses[0].clone(),
            len if index < len => self.responses[index].clone(),
            len => MockResponse::Error {
                message: format!(
                    "No more mock responses configured (requested: {}, available: {})",
                    index + 1,
                    len
                ),
            },
        }
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Most recent request received, if any
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().ok().and_then(|requests| requests.last().cloned())
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match self.next_response() {
            MockResponse::Text { content } => {
                Ok(ChatResponse::new(ChatMessage::assistant(content)).with_finish_reason("stop"))
            }
            MockResponse::Error { message } => Err(Error::Provider(message)),
        }
    }
}
