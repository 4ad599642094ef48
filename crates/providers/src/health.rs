use crate::{ChatMessage, ChatRequest, Provider};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy(latency_ms: u64) -> Self {
        Self { healthy: true, latency_ms, error: None }
    }

    pub fn unhealthy(error: String) -> Self {
        Self { healthy: false, latency_ms: 0, error: Some(error) }
    }
}

/// Probes a provider with a minimal request under a deadline
pub struct ProviderHealthChecker {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl ProviderHealthChecker {
    pub fn new(provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Perform a quick health check; failures are reported, never returned as errors
    pub async fn check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let request = ChatRequest::builder()
            .add_message(ChatMessage::user("Reply with the single word: ok"))
            .max_tokens(10)
            .build();

        match tokio::time::timeout(self.timeout, self.provider.generate(request)).await {
            Ok(Ok(_)) => HealthCheckResult::healthy(start.elapsed().as_millis() as u64),
            Ok(Err(e)) => HealthCheckResult::unhealthy(format!("Health check failed: {}", e)),
            Err(_) => HealthCheckResult::unhealthy(format!(
                "Health check failed: {} timeout after {}ms",
                self.provider.name(),
                self.timeout.as_millis()
            )),
        }
    }
}
