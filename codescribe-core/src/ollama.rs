//! # ollama: generation client for a locally hosted model
//!
//! Implements [`ModelClient`] against Ollama's `/api/generate` endpoint with
//! `stream: false`, so one HTTP request yields one complete envelope.
//!
//! - The client never retries and sets no request timeout of its own; time limits
//!   and cancellation belong to the caller (see [`crate::analyse`]).
//! - Connection failures, HTTP errors and undecodable bodies are all [`ModelError`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::ModelConfig;
use crate::contract::{ModelClient, ModelResponse, Prompt};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot connect to the model service at {endpoint}. Is Ollama running? ({source})")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Model '{model}' not found. Pull it with: ollama pull {model}")]
    ModelNotFound { model: String },

    #[error("Model service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode the model response: {0}")]
    Decode(String),

    #[error("Request to the model service failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = Client::builder().build()?;
        info!(endpoint = %config.endpoint, model = %config.name, "Initialized OllamaClient");
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.name.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &Prompt) -> Result<ModelResponse, ModelError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt.text,
            stream: false,
        };
        info!(
            url = %url,
            model = %self.model,
            task = %prompt.task,
            prompt_bytes = prompt.text.len(),
            "Sending generation request"
        );

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "Generation request could not be sent");
            if e.is_connect() {
                ModelError::Unreachable {
                    endpoint: self.endpoint.clone(),
                    source: e,
                }
            } else {
                ModelError::Request(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            error!(status = %status, message = %message, "Model service returned an error");
            if status.as_u16() == 404 && message.contains("not found") {
                return Err(ModelError::ModelNotFound {
                    model: self.model.clone(),
                });
            }
            return Err(ModelError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ModelResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, "Model response is not a JSON envelope");
            ModelError::Decode(e.to_string())
        })?;
        debug!(
            done = ?envelope.done,
            total_duration = ?envelope.total_duration,
            has_response = envelope.response.is_some(),
            "Received generation envelope"
        );
        Ok(envelope)
    }
}
