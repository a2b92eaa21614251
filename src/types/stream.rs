//! Streaming types.

use serde::{Deserialize, Serialize};

/// A delta emitted while streaming a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDelta {
    /// The incremental text chunk.
    pub text: String,
    /// Event kind.
    pub kind: StreamEventKind,
}

/// Kind of stream event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StreamEventKind {
    /// Incremental text content.
    TextDelta,
    /// Tool call being built.
    ToolCallDelta,
    /// Stream finished.
    Done,
}
