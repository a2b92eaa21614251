//! Core message and streaming types.

pub mod message;
pub mod stream;

pub use message::{ChatMessage, ContentPart, Role, ToolCall, ToolResult};
pub use stream::{StreamDelta, StreamEventKind};
