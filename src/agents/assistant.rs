//! Single-agent engine with a bounded tool loop.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RoundtableError;
use crate::llm::{ChatModel, ChatRequest, FunctionDefinition, SamplingSettings};
use crate::tools::{ToolArguments, ToolRegistry};
use crate::types::{ChatMessage, ContentPart, Role, ToolResult};

use super::engine::{ChatEngine, ResponseStream};

/// Maximum tool loop iterations to prevent infinite loops.
const MAX_TOOL_ITERATIONS: usize = 20;

/// Run the model/tool loop, yielding every message it produces.
///
/// While the model keeps returning tool calls, each call is validated and
/// executed through the registry and its result fed back; the loop ends with
/// the first plain-text reply or at the iteration cap. Tool failures become
/// `is_error` results and the loop continues — model errors end the stream.
pub(crate) fn tool_loop<'a>(
    model: &'a dyn ChatModel,
    registry: &'a ToolRegistry,
    functions: Vec<FunctionDefinition>,
    mut messages: Vec<ChatMessage>,
    settings: SamplingSettings,
    speaker: Option<String>,
) -> ResponseStream<'a> {
    Box::pin(async_stream::stream! {
        for iteration in 0..MAX_TOOL_ITERATIONS {
            let request = ChatRequest {
                messages: messages.clone(),
                settings: settings.clone(),
                functions: if functions.is_empty() {
                    None
                } else {
                    Some(functions.clone())
                },
            };

            debug!(iteration, "tool loop: calling model");
            let response = match model.chat(&request).await {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            if !response.tool_calls.is_empty() {
                let mut content: Vec<ContentPart> = Vec::new();
                if !response.text.is_empty() {
                    content.push(ContentPart::Text {
                        text: response.text.clone(),
                    });
                }
                for tc in &response.tool_calls {
                    content.push(ContentPart::ToolCall(tc.clone()));
                }
                let call_msg = ChatMessage {
                    role: Role::Assistant,
                    content,
                    name: speaker.clone(),
                    timestamp: Some(chrono::Utc::now()),
                };
                messages.push(call_msg.clone());
                yield Ok(call_msg);

                for tc in &response.tool_calls {
                    let args = ToolArguments::new(tc.arguments.clone());
                    let result = match registry.call(&tc.name, &args).await {
                        Ok(val) => ToolResult {
                            tool_call_id: tc.id.clone(),
                            result: val,
                            is_error: false,
                        },
                        Err(e) => {
                            warn!(tool = %tc.name, error = %e, "tool execution failed");
                            ToolResult {
                                tool_call_id: tc.id.clone(),
                                result: serde_json::json!({ "error": e.to_string() }),
                                is_error: true,
                            }
                        }
                    };
                    let msg = ChatMessage::tool_result(
                        result.tool_call_id.clone(),
                        result.result.clone(),
                        result.is_error,
                    );
                    messages.push(msg.clone());
                    yield Ok(msg);
                }
                continue;
            }

            // Plain text: the turn is over.
            let final_msg = match speaker {
                Some(ref name) => ChatMessage::assistant_named(name.clone(), response.text),
                None => ChatMessage::assistant(response.text),
            };
            yield Ok(final_msg);
            return;
        }

        warn!("tool loop hit iteration limit");
        yield Err(RoundtableError::Stream(
            "tool loop exceeded iteration limit".into(),
        ));
    })
}

/// A single automated participant: system prompt, model, capabilities.
pub struct Assistant {
    model: Arc<dyn ChatModel>,
    registry: Arc<ToolRegistry>,
    system_prompt: Option<String>,
    settings: SamplingSettings,
}

impl Assistant {
    pub fn new(model: Arc<dyn ChatModel>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            registry,
            system_prompt: None,
            settings: SamplingSettings::default(),
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set sampling settings.
    pub fn with_settings(mut self, settings: SamplingSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl ChatEngine for Assistant {
    fn run<'a>(&'a self, history: &'a [ChatMessage]) -> ResponseStream<'a> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(ref sys) = self.system_prompt {
            messages.push(ChatMessage::system(sys.clone()));
        }
        messages.extend(history.iter().cloned());

        tool_loop(
            self.model.as_ref(),
            &self.registry,
            self.registry.definitions(),
            messages,
            self.settings.clone(),
            None,
        )
    }
}
