pub mod adapter;
pub mod health;
pub mod mock;
pub mod prompts;
pub mod retry;
pub mod types;

pub use adapter::{GeminiProvider, OllamaProvider, OpenAiProvider, Provider, ProviderFactory};
pub use health::{HealthCheckResult, ProviderHealthChecker};
pub use mock::{MockProvider, MockResponse};
pub use prompts::{explanation_system_prompt, synthesis_system_prompt, synthesis_user_prompt};
pub use retry::{is_retryable_error, is_retryable_message};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};

pub use clioraops_core::{Error, Result};
