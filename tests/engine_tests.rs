//! Engine and orchestrator tests against a scripted model.

mod common;

use std::sync::Arc;

use common::ScriptedModel;
use futures::stream::BoxStream;
use futures::StreamExt;
use pretty_assertions::assert_eq;

use roundtable::agents::{Assistant, ChatEngine, GroupChat, Participant, Roster};
use roundtable::error::{Result, RoundtableError};
use roundtable::orchestrator::TurnOrchestrator;
use roundtable::tools::{FunctionTool, ToolParameters, ToolRegistry};
use roundtable::types::{ChatMessage, Role};

fn echo_registry() -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::new().with_tool(Arc::new(FunctionTool::new(
        "echo",
        "echoes its arguments",
        ToolParameters::object()
            .string("text", "text to echo", true)
            .build(),
        |args| async move { Ok(args.raw().clone()) },
    ))))
}

fn game_roster() -> Roster {
    Roster::new(
        "A tiny board game group",
        vec![
            Participant::agent("Board", "Show the board").with_description("board updater"),
            Participant::agent("Ming", "Play white").with_description("white player"),
            Participant::human("Tang").with_description("black player"),
        ],
    )
}

#[tokio::test]
async fn assistant_yields_final_text_for_plain_reply() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_text("Hello there");
    let assistant = Assistant::new(model, Arc::new(ToolRegistry::new()));

    let history = vec![ChatMessage::user("Hi")];
    let responses: Vec<ChatMessage> = assistant
        .run(&history)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].text(), "Hello there");
    assert_eq!(responses[0].role, Role::Assistant);
}

#[tokio::test]
async fn assistant_runs_tool_loop_and_yields_every_message() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_tool_call("call_1", "echo", serde_json::json!({"text": "ping"}));
    model.queue_text("done");
    let assistant = Assistant::new(model.clone(), echo_registry());

    let history = vec![ChatMessage::user("echo ping")];
    let responses: Vec<ChatMessage> = assistant
        .run(&history)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

    // tool-call message, tool result, final text
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].tool_calls()[0].name, "echo");
    assert_eq!(responses[1].role, Role::Tool);
    assert_eq!(responses[2].text(), "done");

    // Second model call saw the tool result in its message list.
    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1]
        .messages
        .iter()
        .any(|m| m.role == Role::Tool));
}

#[tokio::test]
async fn assistant_feeds_tool_failure_back_as_error_result() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_tool_call("call_1", "echo", serde_json::json!({})); // missing required "text"
    model.queue_text("sorry");
    let assistant = Assistant::new(model, echo_registry());

    let history = vec![ChatMessage::user("echo nothing")];
    let responses: Vec<ChatMessage> = assistant
        .run(&history)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

    let result = match &responses[1].content[0] {
        roundtable::types::ContentPart::ToolResult(tr) => tr,
        other => panic!("expected tool result, got {other:?}"),
    };
    assert!(result.is_error);
    assert_eq!(responses[2].text(), "sorry");
}

#[tokio::test]
async fn assistant_sends_registered_function_definitions() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_text("ok");
    let assistant = Assistant::new(model.clone(), echo_registry());

    let _ = assistant
        .run(&[ChatMessage::user("hi")])
        .collect::<Vec<_>>()
        .await;

    let functions = model.requests()[0].functions.clone().unwrap();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "echo");
}

#[tokio::test]
async fn group_chat_lets_board_then_npc_speak() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_text("Board"); // moderator choice
    model.queue_text("0 1 0 / 0 0 0"); // Board's reply
    model.queue_text("Ming"); // moderator choice
    model.queue_text("<0,1>"); // Ming's reply
    let engine =
        GroupChat::new(game_roster(), model.clone(), Arc::new(ToolRegistry::new())).unwrap();

    let history = vec![ChatMessage::user_named("Tang", "<1,1>")];
    let responses: Vec<ChatMessage> = engine
        .run(&history)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].sender(), Some("Board"));
    assert_eq!(responses[0].text(), "0 1 0 / 0 0 0");
    assert_eq!(responses[1].sender(), Some("Ming"));
    assert_eq!(responses[1].text(), "<0,1>");

    // Turn ends after every agent spoke: no extra moderator call.
    assert_eq!(model.request_count(), 4);
}

#[tokio::test]
async fn group_chat_stops_when_moderator_names_the_human() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_text("Tang");
    let engine =
        GroupChat::new(game_roster(), model.clone(), Arc::new(ToolRegistry::new())).unwrap();

    let history = vec![ChatMessage::user_named("Tang", "hello?")];
    let responses: Vec<_> = engine.run(&history).collect::<Vec<_>>().await;

    assert!(responses.is_empty());
    assert_eq!(model.request_count(), 1);
}

#[tokio::test]
async fn group_chat_falls_back_to_roster_order_on_garbage_choice() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_text("no idea who should go"); // unrecognized
    model.queue_text("the board looks fine"); // Board's reply (fallback pick)
    model.queue_text("Tang"); // moderator yields to the human
    let engine =
        GroupChat::new(game_roster(), model.clone(), Arc::new(ToolRegistry::new())).unwrap();

    let history = vec![ChatMessage::user_named("Tang", "status?")];
    let responses: Vec<ChatMessage> = engine
        .run(&history)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].sender(), Some("Board"));
}

#[tokio::test]
async fn group_chat_rejects_invalid_roster() {
    let roster = Roster::new("bg", vec![Participant::human("only")]);

    let result = GroupChat::new(
        roster,
        Arc::new(ScriptedModel::new()),
        Arc::new(ToolRegistry::new()),
    );

    assert!(matches!(result, Err(RoundtableError::InvalidRoster(_))));
}

#[tokio::test]
async fn orchestrator_history_grows_and_keeps_order() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_text("first reply");
    model.queue_text("second reply");
    let engine = Assistant::new(model, Arc::new(ToolRegistry::new()));
    let mut orchestrator = TurnOrchestrator::new(Arc::new(engine)).with_human_name("Tang");

    let mut lengths = vec![orchestrator.conversation().len()];
    orchestrator.step("one").await.unwrap();
    lengths.push(orchestrator.conversation().len());
    orchestrator.step("two").await.unwrap();
    lengths.push(orchestrator.conversation().len());

    assert_eq!(lengths, vec![0, 2, 4]);

    let texts: Vec<String> = orchestrator
        .conversation()
        .messages()
        .iter()
        .map(|m| m.text())
        .collect();
    assert_eq!(texts, vec!["one", "first reply", "two", "second reply"]);
}

#[tokio::test]
async fn orchestrator_invokes_sink_per_response() {
    let model = Arc::new(ScriptedModel::new());
    model.queue_tool_call("call_1", "echo", serde_json::json!({"text": "hi"}));
    model.queue_text("done");
    let engine = Assistant::new(model, echo_registry());
    let mut orchestrator = TurnOrchestrator::new(Arc::new(engine));

    let mut seen = Vec::new();
    orchestrator
        .step_with("go", |message| seen.push(message.role))
        .await
        .unwrap();

    assert_eq!(seen, vec![Role::Assistant, Role::Tool, Role::Assistant]);
}

/// Engine that yields one message and then fails.
struct FlakyEngine;

impl ChatEngine for FlakyEngine {
    fn run<'a>(&'a self, _history: &'a [ChatMessage]) -> BoxStream<'a, Result<ChatMessage>> {
        Box::pin(async_stream::stream! {
            yield Ok(ChatMessage::assistant("partial"));
            yield Err(RoundtableError::Stream("backend went away".into()));
        })
    }
}

#[tokio::test]
async fn orchestrator_keeps_drained_messages_on_engine_failure() {
    let mut orchestrator = TurnOrchestrator::new(Arc::new(FlakyEngine));

    let result = orchestrator.step("hello").await;

    assert!(matches!(result, Err(RoundtableError::Stream(_))));
    // user message + the response drained before the failure
    assert_eq!(orchestrator.conversation().len(), 2);
    assert_eq!(orchestrator.conversation().messages()[1].text(), "partial");
}
