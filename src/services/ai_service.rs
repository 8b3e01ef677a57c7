//! services/ai_service.rs
//! Clientes HTTP de generación de texto (Gemini y OpenAI) detrás de un trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::config::app_config::AiConfig;
use crate::errors::OutreachError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Una llamada síncrona (desde el punto de vista del caller), sin reintentos
    async fn generate(&self, prompt: &str) -> Result<String, OutreachError>;
}

/// Elige proveedor: Gemini si hay GOOGLE_API_KEY, si no OpenAI.
pub fn build_generator(config: &AiConfig) -> Result<Arc<dyn TextGenerator>, OutreachError> {
    let http_client = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| OutreachError::Configuration(format!("HTTP client: {}", e)))?;

    if let Some(key) = &config.google_api_key {
        log::info!("(build_generator) Usando Gemini modelo={}", config.gemini_model);
        return Ok(Arc::new(GeminiClient::new(
            http_client,
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            key.clone(),
        )));
    }
    if let Some(key) = &config.openai_api_key {
        log::info!("(build_generator) Usando OpenAI modelo={}", config.openai_model);
        return Ok(Arc::new(OpenAiClient::new(
            http_client,
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            key.clone(),
        )));
    }

    log::warn!("(build_generator) No hay GOOGLE_API_KEY ni OPENAI_API_KEY configuradas");
    Ok(Arc::new(UnconfiguredGenerator))
}

// ------------------------------------------------------------------
// Gemini
// ------------------------------------------------------------------

pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(http_client: Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            http_client,
            base_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, OutreachError> {
        let url = format!(
            "{}/v1/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| OutreachError::ContentGeneration(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OutreachError::ContentGeneration(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            OutreachError::ContentGeneration(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        non_empty(text, "Gemini")
    }
}

// ------------------------------------------------------------------
// OpenAI
// ------------------------------------------------------------------

pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(http_client: Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            http_client,
            base_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, OutreachError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [ChatMessage { role: "user", content: prompt }],
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OutreachError::ContentGeneration(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OutreachError::ContentGeneration(format!(
                "OpenAI API error (status {}): {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            OutreachError::ContentGeneration(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        non_empty(text, "OpenAI")
    }
}

/// Sin credenciales: toda llamada falla con error de configuración
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, OutreachError> {
        Err(OutreachError::Configuration(
            "Missing AI API key. Set GOOGLE_API_KEY or OPENAI_API_KEY".to_string(),
        ))
    }
}

fn non_empty(text: String, provider: &str) -> Result<String, OutreachError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(OutreachError::ContentGeneration(format!(
            "{} returned an empty response",
            provider
        )));
    }
    Ok(trimmed.to_string())
}
