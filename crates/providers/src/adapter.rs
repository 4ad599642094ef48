use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::mock::MockProvider;
use crate::types::*;
use clioraops_core::{Error, ProviderConfig, Result};

/// Text-generation collaborator: one prompt in, one reply out
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Backend name for logs and status output
    fn name(&self) -> &str;

    /// Send the request and wait for the complete reply
    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Turn a non-success HTTP reply into a provider error carrying status and body
async fn status_error(backend: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 429 {
        Error::Provider(format!("{} API error: {} - rate limit exceeded: {}", backend, status, body))
    } else {
        Error::Provider(format!("{} API error: {} - {}", backend, status, body))
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
        }
    }

    /// Convert ChatRequest to Gemini API format
    fn to_gemini_request(&self, request: &ChatRequest) -> GeminiRequest {
        let system_instruction = request
            .system_prompt()
            .map(|text| GeminiSystemInstruction { parts: vec![GeminiPart { text }] });

        let contents = request
            .conversation()
            .map(|msg| GeminiContent {
                role: match msg.role {
                    Role::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                },
                parts: vec![GeminiPart { text: msg.content.clone() }],
            })
            .collect();

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GeminiGenerationConfig { temperature: request.temperature, max_output_tokens: request.max_tokens })
        } else {
            None
        };

        GeminiRequest { contents, system_instruction, generation_config }
    }

    /// Convert a Gemini reply into a ChatResponse
    fn parse_response(&self, reply: GeminiResponse) -> Result<ChatResponse> {
        let candidate = reply
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| Error::Provider("Gemini returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        let mut response = ChatResponse::new(ChatMessage::assistant(text));
        if let Some(usage) = reply.usage_metadata {
            response = response.with_usage(Usage::new(usage.prompt_token_count, usage.candidates_token_count));
        }
        if let Some(reason) = candidate.finish_reason {
            response = response.with_finish_reason(reason);
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse> {
        let gemini_request = self.to_gemini_request(&request);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("Gemini", response).await);
        }

        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Unexpected Gemini response structure: {}", e)))?;

        self.parse_response(reply)
    }
}

/// Gemini API request format
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Ollama provider for a local daemon
pub struct OllamaProvider {
    client: HttpClient,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(model: String, base_url: Option<String>) -> Self {
        Self {
            client: HttpClient::new(),
            model,
            base_url: base_url.unwrap_or_else(|| "http://localhost:11434".to_string()),
        }
    }

    fn to_ollama_request(&self, request: &ChatRequest) -> OllamaRequest {
        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(OllamaOptions { temperature: request.temperature, num_predict: request.max_tokens })
        } else {
            None
        };

        OllamaRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            stream: false,
            options,
        }
    }
}

#[async_trait::async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse> {
        let ollama_request = self.to_ollama_request(&request);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Ollama connection failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let reply: OllamaResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Unexpected Ollama response structure: {}", e)))?;

        let mut chat = ChatResponse::new(ChatMessage::assistant(reply.message.content));
        if let (Some(prompt), Some(completion)) = (reply.prompt_eval_count, reply.eval_count) {
            chat = chat.with_usage(Usage::new(prompt, completion));
        }
        if let Some(reason) = reply.done_reason {
            chat = chat.with_finish_reason(reason);
        }
        Ok(chat)
    }
}

/// Message shape shared by the Ollama and OpenAI-compatible APIs
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self { role: msg.role.as_str().to_string(), content: msg.content.clone() }
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: WireMessage,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        }
    }

    fn to_openai_request(&self, request: &ChatRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            stream: false,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse> {
        let openai_request = self.to_openai_request(&request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("OpenAI", response).await);
        }

        let reply: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Unexpected OpenAI response structure: {}", e)))?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Provider("OpenAI returned no choices".to_string()))?;

        let mut chat = ChatResponse::new(ChatMessage::assistant(choice.message.content));
        if let Some(usage) = reply.usage {
            chat = chat.with_usage(usage);
        }
        if let Some(reason) = choice.finish_reason {
            chat = chat.with_finish_reason(reason);
        }
        Ok(chat)
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

/// Factory to create providers from config
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_from_config(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
        match config {
            ProviderConfig::Gemini { api_key, model, base_url } => {
                let api_key = if api_key.trim().is_empty() {
                    std::env::var("GEMINI_API_KEY").map_err(|_| {
                        Error::Config("Gemini API key missing: set provider.api_key or GEMINI_API_KEY".to_string())
                    })?
                } else {
                    api_key.clone()
                };
                Ok(Arc::new(GeminiProvider::new(api_key, model.clone(), Some(base_url.clone()))))
            }
            ProviderConfig::Ollama { model, base_url } => {
                Ok(Arc::new(OllamaProvider::new(model.clone(), Some(base_url.clone()))))
            }
            ProviderConfig::OpenAi { api_key, model, base_url } => Ok(Arc::new(OpenAiProvider::new(
                api_key.clone(),
                model.clone(),
                Some(base_url.clone()),
            ))),
            ProviderConfig::Mock { responses_file } => Ok(Arc::new(MockProvider::new(responses_file.clone()))),
        }
    }
}
