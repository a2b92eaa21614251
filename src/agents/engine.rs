//! Chat engine boundary.

use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::ChatMessage;

/// Per-turn response stream.
pub type ResponseStream<'a> = BoxStream<'a, Result<ChatMessage>>;

/// A chat engine turns the running history into the turn's responses.
///
/// Each `run` call produces a fresh, forward-only, finite stream; the caller
/// must drain it fully before starting the next turn. Failures propagate
/// through the stream — engines do no retrying of their own.
pub trait ChatEngine: Send + Sync {
    fn run<'a>(&'a self, history: &'a [ChatMessage]) -> ResponseStream<'a>;
}
