//! Client for any OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{Result, RoundtableError};
use crate::types::{ChatMessage, ContentPart, Role, StreamDelta, StreamEventKind, ToolCall};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ChatModel, ChatRequest, FinishReason, ModelResponse};

/// Chat-completions client for OpenAI-compatible servers (Ollama, vLLM,
/// DashScope's compatible mode, ...).
pub struct OpenAiCompatibleClient {
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Build a client from a [`ModelConfig`].
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(&config.model, &config.api_key, &config.base_url)
    }

    fn build_request_body(&self, request: &ChatRequest, stream: bool) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_wire)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": stream,
        });

        let obj = body.as_object_mut().expect("body is an object");

        if let Some(max) = request.settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(seed) = request.settings.seed {
            obj.insert("seed".into(), seed.into());
        }

        if let Some(ref functions) = request.functions {
            if !functions.is_empty() {
                let tool_defs: Vec<serde_json::Value> = functions
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": f.name,
                                "description": f.description,
                                "parameters": f.parameters,
                            }
                        })
                    })
                    .collect();
                obj.insert("tools".into(), tool_defs.into());
            }
        }

        body
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ModelResponse> {
        let body = self.build_request_body(request, false);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, "chat completion");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: WireChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RoundtableError::api(200, "No choices in chat response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(wire_tool_call)
            .collect();

        let finish_reason = choice.finish_reason.as_deref().and_then(parse_finish_reason);

        Ok(ModelResponse {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason,
        })
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta>>> {
        let body = self.build_request_body(request, true);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, "chat completion (stream)");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(RoundtableError::Network(e));
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = super::http::parse_sse_data(&line) {
                        match serde_json::from_str::<WireStreamChunk>(data) {
                            Ok(chunk) => {
                                if let Some(choice) = chunk.choices.into_iter().next() {
                                    let kind = if choice.finish_reason.is_some() {
                                        StreamEventKind::Done
                                    } else if choice.delta.tool_calls.is_some() {
                                        StreamEventKind::ToolCallDelta
                                    } else {
                                        StreamEventKind::TextDelta
                                    };
                                    yield Ok(StreamDelta {
                                        text: choice.delta.content.unwrap_or_default(),
                                        kind,
                                    });
                                }
                            }
                            Err(_) => {} // skip unparseable chunks
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

/// Tool-call arguments arrive as a JSON-encoded string; parse leniently,
/// keeping the raw string when it is not valid JSON.
fn wire_tool_call(tc: WireToolCall) -> ToolCall {
    ToolCall {
        id: tc
            .id
            .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
        name: tc.function.name,
        arguments: serde_json::from_str(&tc.function.arguments)
            .unwrap_or(serde_json::Value::String(tc.function.arguments)),
    }
}

fn message_to_wire(msg: &ChatMessage) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    // Simple single-part messages
    if msg.content.len() == 1 {
        if let ContentPart::Text { ref text } = msg.content[0] {
            let mut wire = serde_json::json!({ "role": role, "content": text });
            if let Some(ref name) = msg.name {
                wire["name"] = serde_json::Value::String(name.clone());
            }
            return wire;
        }
        if let ContentPart::ToolResult(ref tr) = msg.content[0] {
            return serde_json::json!({
                "role": "tool",
                "tool_call_id": tr.tool_call_id,
                "content": tr.result.to_string(),
            });
        }
    }

    // Assistant message carrying tool calls
    let tool_calls = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    let mut wire = serde_json::json!({ "role": role, "content": msg.text() });
    if let Some(ref name) = msg.name {
        wire["name"] = serde_json::Value::String(name.clone());
    }
    wire
}

// Wire response types (internal)

#[derive(Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: Option<String>,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireStreamChunk {
    choices: Vec<WireStreamChoice>,
}

#[derive(Deserialize)]
struct WireStreamChoice {
    delta: WireStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireStreamDelta {
    content: Option<String>,
    tool_calls: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FunctionDefinition;
    use crate::llm::SamplingSettings;
    use pretty_assertions::assert_eq;

    fn client() -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new("qwen2.5:32b", "EMPTY", "http://127.0.0.1:11434/v1")
    }

    #[test]
    fn body_includes_sampling_and_tools() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_settings(SamplingSettings::builder().top_p(0.8).build())
            .with_functions(vec![FunctionDefinition {
                name: "image_gen".into(),
                description: "paint".into(),
                parameters: serde_json::json!({ "type": "object" }),
            }]);

        let body = client().build_request_body(&request, false);

        assert_eq!(body["model"], "qwen2.5:32b");
        assert_eq!(body["stream"], false);
        assert_eq!(body["top_p"], 0.8);
        assert_eq!(body["tools"][0]["function"]["name"], "image_gen");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn named_messages_carry_sender_on_the_wire() {
        let wire = message_to_wire(&ChatMessage::user_named("小塘", "<1,1>"));

        assert_eq!(wire["role"], "user");
        assert_eq!(wire["name"], "小塘");
        assert_eq!(wire["content"], "<1,1>");
    }

    #[test]
    fn tool_result_message_maps_to_tool_role() {
        let msg = ChatMessage::tool_result("call_1", serde_json::json!({"ok": true}), false);

        let wire = message_to_wire(&msg);

        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
    }

    #[test]
    fn assistant_tool_calls_serialize_arguments_as_string() {
        let msg = ChatMessage {
            role: Role::Assistant,
            content: vec![ContentPart::ToolCall(ToolCall {
                id: "call_1".into(),
                name: "image_gen".into(),
                arguments: serde_json::json!({"prompt": "a red fox"}),
            })],
            name: None,
            timestamp: None,
        };

        let wire = message_to_wire(&msg);

        assert_eq!(wire["tool_calls"][0]["function"]["name"], "image_gen");
        assert_eq!(
            wire["tool_calls"][0]["function"]["arguments"],
            "{\"prompt\":\"a red fox\"}"
        );
        assert_eq!(wire["content"], serde_json::Value::Null);
    }

    #[test]
    fn lenient_tool_call_arguments_keep_raw_string() {
        let tc = wire_tool_call(WireToolCall {
            id: None,
            function: WireFunction {
                name: "image_gen".into(),
                arguments: "not json".into(),
            },
        });

        assert!(tc.id.starts_with("call_"));
        assert_eq!(tc.arguments, serde_json::Value::String("not json".into()));
    }
}
