//! CLI entry point for Roundtable.

pub mod demos;

use clap::{Args, Parser, Subcommand};

use crate::config::ModelConfig;
use crate::llm::SamplingSettings;

/// Roundtable CLI
#[derive(Parser, Debug)]
#[command(name = "roundtable", version, about = "Roundtable — multi-agent group chat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play 5x5 Gomoku against an NPC in a group chat
    Gomoku(GomokuArgs),
    /// Chat with an image-painting assistant
    Paint(PaintArgs),
    /// One-shot prompt, streamed to stdout
    Ask(AskArgs),
}

/// Model endpoint flags shared by all subcommands.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Model id served by the endpoint
    #[arg(short, long)]
    pub model: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key (placeholder accepted by local servers)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Nucleus sampling parameter
    #[arg(long)]
    pub top_p: Option<f64>,
}

impl ModelArgs {
    /// Layer these flags over the env-derived config.
    pub fn resolve(&self) -> ModelConfig {
        let mut config = ModelConfig::from_env();
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ref key) = self.api_key {
            config.api_key = key.clone();
        }
        if let Some(top_p) = self.top_p {
            config.sampling = SamplingSettings {
                top_p: Some(top_p),
                ..config.sampling
            };
        }
        config
    }
}

/// Arguments for `roundtable gomoku`.
#[derive(Args, Debug)]
pub struct GomokuArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `roundtable paint`.
#[derive(Args, Debug)]
pub struct PaintArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `roundtable ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// User prompt (positional)
    pub prompt: String,
}
