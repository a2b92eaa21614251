//! Roundtable — multi-agent group-chat toolkit.
//!
//! Provides an append-only conversation history, a turn orchestrator, an
//! explicit tool registry, and two chat engines: a tool-calling [`Assistant`]
//! and a turn-taking [`GroupChat`], both backed by any OpenAI-compatible
//! chat-completions endpoint.
//!
//! # Quick Start
//!
//! ```no_run
//! use roundtable::config::ModelConfig;
//! use roundtable::llm::OpenAiCompatibleClient;
//!
//! # async fn example() -> roundtable::error::Result<()> {
//! let config = ModelConfig::from_env();
//! let client = OpenAiCompatibleClient::from_config(&config);
//! let response = roundtable::llm::chat_once(&client, "Hello!").await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```
//!
//! [`Assistant`]: agents::Assistant
//! [`GroupChat`]: agents::GroupChat

pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod tools;
pub mod types;
