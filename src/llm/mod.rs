//! Chat model trait and the OpenAI-compatible client.

pub mod http;
pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleClient;

use async_trait::async_trait;
use bon::Builder;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;
use crate::types::{ChatMessage, StreamDelta, ToolCall};

/// Settings controlling sampling.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default)]
pub struct SamplingSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
    pub seed: Option<u64>,
}

/// Function definition sent to the model — the wire form of a declared
/// capability (name, description, JSON-Schema parameters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A request sent to a chat model.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub settings: SamplingSettings,
    pub functions: Option<Vec<FunctionDefinition>>,
}

impl ChatRequest {
    /// Create a request with default sampling and no functions.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            settings: SamplingSettings::default(),
            functions: None,
        }
    }

    /// Attach function definitions.
    pub fn with_functions(mut self, functions: Vec<FunctionDefinition>) -> Self {
        self.functions = if functions.is_empty() {
            None
        } else {
            Some(functions)
        };
        self
    }

    /// Attach sampling settings.
    pub fn with_settings(mut self, settings: SamplingSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Response from a chat model.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Why generation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

/// Core trait implemented by chat model backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model ID this client serves.
    fn model_id(&self) -> &str;

    /// Run a chat completion (non-streaming).
    async fn chat(&self, request: &ChatRequest) -> Result<ModelResponse>;

    /// Run a chat completion, streaming deltas as they arrive.
    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta>>>;
}

/// One-shot convenience: send a single user prompt, return the reply text.
pub async fn chat_once(model: &dyn ChatModel, prompt: impl Into<String>) -> Result<String> {
    let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
    let response = model.chat(&request).await?;
    Ok(response.text)
}
