//! Roundtable CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;

use roundtable::agents::{Assistant, GroupChat};
use roundtable::cli::demos::{
    gomoku_roster, GOMOKU_HUMAN, GOMOKU_SUGGESTIONS, PAINTER_SYSTEM_PROMPT,
};
use roundtable::cli::{AskArgs, Cli, Commands, GomokuArgs, PaintArgs};
use roundtable::llm::{ChatModel, ChatRequest, OpenAiCompatibleClient};
use roundtable::orchestrator::TurnOrchestrator;
use roundtable::tools::{ImageGenTool, ToolRegistry};
use roundtable::types::ChatMessage;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Gomoku(args) => handle_gomoku(args).await,
        Commands::Paint(args) => handle_paint(args).await,
        Commands::Ask(args) => handle_ask(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_gomoku(args: GomokuArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.model.resolve();
    let client = Arc::new(OpenAiCompatibleClient::from_config(&config));
    let registry = Arc::new(ToolRegistry::new());

    let engine = GroupChat::new(gomoku_roster(), client, registry)?
        .with_settings(config.sampling.clone());

    let mut orchestrator =
        TurnOrchestrator::new(Arc::new(engine)).with_human_name(GOMOKU_HUMAN);
    orchestrator.run_console(GOMOKU_SUGGESTIONS).await?;

    Ok(())
}

async fn handle_paint(args: PaintArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.model.resolve();
    let client = Arc::new(OpenAiCompatibleClient::from_config(&config));
    let registry = Arc::new(ToolRegistry::new().with_tool(Arc::new(ImageGenTool::default())));

    let engine = Assistant::new(client, registry)
        .with_system_prompt(PAINTER_SYSTEM_PROMPT)
        .with_settings(config.sampling.clone());

    let mut orchestrator = TurnOrchestrator::new(Arc::new(engine));
    orchestrator.run_console(&[]).await?;

    Ok(())
}

async fn handle_ask(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.model.resolve();
    let client = OpenAiCompatibleClient::from_config(&config);

    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(args.prompt));

    let request = ChatRequest::new(messages).with_settings(config.sampling.clone());
    let mut stream = client.chat_stream(&request).await?;

    use std::io::Write;
    while let Some(delta) = stream.next().await {
        let delta = delta?;
        print!("{}", delta.text);
        std::io::stdout().flush()?;
    }
    println!(); // newline after streaming

    Ok(())
}
