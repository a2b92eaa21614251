//! Turn orchestrator: one round of interaction per loop iteration.

use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::agents::{ChatEngine, Conversation};
use crate::error::Result;
use crate::types::{ChatMessage, ContentPart};

/// Drives the session: appends the human message, submits the full history
/// to the engine, drains the turn's response stream, and extends history.
///
/// History is append-only and never reordered; its length is non-decreasing
/// across turns. There is no terminal state — the console loop ends on EOF
/// or interrupt.
pub struct TurnOrchestrator {
    engine: Arc<dyn ChatEngine>,
    conversation: Conversation,
    human_name: Option<String>,
}

impl TurnOrchestrator {
    pub fn new(engine: Arc<dyn ChatEngine>) -> Self {
        Self {
            engine,
            conversation: Conversation::new(),
            human_name: None,
        }
    }

    /// Attribute human messages to this display name.
    pub fn with_human_name(mut self, name: impl Into<String>) -> Self {
        self.human_name = Some(name.into());
        self
    }

    /// The running history.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run one turn, returning the engine's responses.
    pub async fn step(&mut self, user_text: impl Into<String>) -> Result<Vec<ChatMessage>> {
        self.step_with(user_text, |_| {}).await
    }

    /// Run one turn, invoking `sink` for each response as it arrives.
    ///
    /// Responses drained before an engine failure are still appended to
    /// history; the error then propagates to the caller unretried.
    pub async fn step_with(
        &mut self,
        user_text: impl Into<String>,
        mut sink: impl FnMut(&ChatMessage),
    ) -> Result<Vec<ChatMessage>> {
        let user_msg = match self.human_name {
            Some(ref name) => ChatMessage::user_named(name.clone(), user_text),
            None => ChatMessage::user(user_text),
        };
        self.conversation.push(user_msg);

        let mut responses = Vec::new();
        let outcome = {
            let engine = Arc::clone(&self.engine);
            let mut stream = engine.run(self.conversation.messages());
            let mut outcome = Ok(());
            while let Some(item) = stream.next().await {
                match item {
                    Ok(message) => {
                        sink(&message);
                        responses.push(message);
                    }
                    Err(e) => {
                        outcome = Err(e);
                        break;
                    }
                }
            }
            outcome
        };

        debug!(count = responses.len(), "turn produced responses");
        self.conversation.extend(responses.iter().cloned());
        outcome.map(|()| responses)
    }

    /// Console surface: one line of input per turn until EOF.
    pub async fn run_console(&mut self, suggestions: &[&str]) -> Result<()> {
        if !suggestions.is_empty() {
            println!("Try:");
            for s in suggestions {
                println!("  {s}");
            }
        }

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            prompt(self.human_name.as_deref())?;
            let Some(line) = lines.next_line().await? else {
                break; // EOF
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            self.step_with(input, |message| {
                println!("{}", render_message(message));
            })
            .await?;
        }

        Ok(())
    }
}

fn prompt(name: Option<&str>) -> std::io::Result<()> {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    match name {
        Some(name) => write!(stdout, "{name}> ")?,
        None => write!(stdout, "> ")?,
    }
    stdout.flush()
}

/// Render a response message for the console.
pub fn render_message(message: &ChatMessage) -> String {
    let mut out = String::new();
    for part in &message.content {
        match part {
            ContentPart::Text { text } => {
                match message.sender() {
                    Some(name) => out.push_str(&format!("{name}: {text}")),
                    None => out.push_str(text),
                }
            }
            ContentPart::ToolCall(tc) => {
                out.push_str(&format!("⚡ {} {}", tc.name, tc.arguments));
            }
            ContentPart::ToolResult(tr) => {
                let text = tr.result.to_string();
                let truncated = truncate_at_char_boundary(&text, 200);
                if tr.is_error {
                    out.push_str(&format!("❌ {truncated}"));
                } else {
                    out.push_str(&format!("✅ {truncated}"));
                }
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn truncate_at_char_boundary(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, ToolCall};

    #[test]
    fn render_names_the_sender() {
        let msg = ChatMessage::assistant_named("Board", "0 0 0");

        assert_eq!(render_message(&msg), "Board: 0 0 0");
    }

    #[test]
    fn render_marks_tool_calls_and_results() {
        let call = ChatMessage {
            role: Role::Assistant,
            content: vec![ContentPart::ToolCall(ToolCall {
                id: "call_1".into(),
                name: "image_gen".into(),
                arguments: serde_json::json!({"prompt": "a fox"}),
            })],
            name: None,
            timestamp: None,
        };
        let result = ChatMessage::tool_result("call_1", serde_json::json!({"ok": true}), false);

        assert!(render_message(&call).starts_with("⚡ image_gen"));
        assert!(render_message(&result).starts_with("✅"));
    }

    #[test]
    fn truncation_respects_utf8_boundaries() {
        let long = "狐".repeat(100); // 3 bytes each
        let rendered = truncate_at_char_boundary(&long, 200);

        assert!(rendered.ends_with("..."));
        assert!(rendered.len() <= 203);
    }
}
