//! Multi-agent turn-taking engine.

use std::collections::HashSet;
use std::sync::Arc;

use futures::TryStreamExt;
use tracing::{debug, warn};

use crate::error::{Result, RoundtableError};
use crate::llm::{ChatModel, ChatRequest, SamplingSettings};
use crate::tools::ToolRegistry;
use crate::types::{ChatMessage, Role};

use super::assistant::tool_loop;
use super::engine::{ChatEngine, ResponseStream};
use super::participant::{Participant, ParticipantKind, Roster};

/// Group chat over an ordered roster.
///
/// Each turn, the model is asked which non-human participant should speak
/// next; the chosen agent replies with its own instructions as system
/// prompt. The turn ends when the moderator hands control back to the human
/// or once every non-human agent has spoken, whichever comes first — so the
/// per-turn response stream is always finite.
pub struct GroupChat {
    roster: Roster,
    model: Arc<dyn ChatModel>,
    registry: Arc<ToolRegistry>,
    settings: SamplingSettings,
}

impl GroupChat {
    pub fn new(
        roster: Roster,
        model: Arc<dyn ChatModel>,
        registry: Arc<ToolRegistry>,
    ) -> Result<Self> {
        roster.validate()?;
        Ok(Self {
            roster,
            model,
            registry,
            settings: SamplingSettings::default(),
        })
    }

    /// Set sampling settings used for both selection and replies.
    pub fn with_settings(mut self, settings: SamplingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Ask the model who speaks next; fall back to roster order when the
    /// answer is not a usable roster name.
    async fn select_speaker(
        &self,
        history: &[ChatMessage],
        spoken: &HashSet<String>,
    ) -> Result<Option<String>> {
        let fallback = || {
            self.roster
                .agents()
                .map(|p| p.name.clone())
                .find(|name| !spoken.contains(name))
        };

        let request = ChatRequest::new(vec![
            ChatMessage::system(self.selection_prompt()),
            ChatMessage::user(render_transcript(history)),
        ])
        .with_settings(self.settings.clone());

        let response = self.model.chat(&request).await?;
        let answer = response.text.trim();

        // Exact name first, then a name embedded in a longer reply.
        let chosen = self
            .roster
            .participants
            .iter()
            .find(|p| p.name == answer)
            .or_else(|| {
                self.roster
                    .participants
                    .iter()
                    .find(|p| answer.contains(p.name.as_str()))
            });

        match chosen {
            Some(p) if p.is_human() => {
                debug!(speaker = %p.name, "moderator handed control to the human");
                Ok(None)
            }
            Some(p) if !spoken.contains(&p.name) => Ok(Some(p.name.clone())),
            Some(p) => {
                debug!(speaker = %p.name, "already spoke this turn, using roster order");
                Ok(fallback())
            }
            None => {
                warn!(answer, "unrecognized speaker choice, using roster order");
                Ok(fallback())
            }
        }
    }

    fn selection_prompt(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.roster.background);
        prompt.push_str("\n\nParticipants:\n");
        for p in &self.roster.participants {
            let role = match p.kind {
                ParticipantKind::Human => "human player",
                ParticipantKind::Agent { .. } => "automated",
            };
            match &p.description {
                Some(desc) => prompt.push_str(&format!("- {} ({role}): {desc}\n", p.name)),
                None => prompt.push_str(&format!("- {} ({role})\n", p.name)),
            }
        }
        prompt.push_str(
            "\nYou are the moderator. Given the conversation so far, reply with \
             exactly the name of the participant who should speak next, and \
             nothing else.",
        );
        prompt
    }

    /// Run one agent's reply and return its final text message.
    async fn agent_reply(
        &self,
        agent: &Participant,
        history: &[ChatMessage],
    ) -> Result<ChatMessage> {
        let (instructions, tools) = match &agent.kind {
            ParticipantKind::Agent {
                instructions,
                tools,
            } => (instructions, tools),
            ParticipantKind::Human => {
                return Err(RoundtableError::UnknownParticipant(format!(
                    "{} is human-controlled",
                    agent.name
                )))
            }
        };

        let system = format!(
            "{}\n\nYou are {}. {}",
            self.roster.background, agent.name, instructions
        );
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(history.iter().cloned());

        let produced: Vec<ChatMessage> = tool_loop(
            self.model.as_ref(),
            &self.registry,
            self.registry.definitions_for(tools),
            messages,
            self.settings.clone(),
            Some(agent.name.clone()),
        )
        .try_collect()
        .await?;

        produced
            .into_iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.text().is_empty())
            .ok_or_else(|| {
                RoundtableError::Stream(format!("{} produced no reply", agent.name))
            })
    }
}

impl ChatEngine for GroupChat {
    fn run<'a>(&'a self, history: &'a [ChatMessage]) -> ResponseStream<'a> {
        Box::pin(async_stream::stream! {
            let agent_count = self.roster.agents().count();
            let mut spoken: HashSet<String> = HashSet::new();
            let mut turn_history: Vec<ChatMessage> = history.to_vec();

            while spoken.len() < agent_count {
                let speaker = match self.select_speaker(&turn_history, &spoken).await {
                    Ok(Some(name)) => name,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let agent = match self.roster.get(&speaker) {
                    Some(p) => p,
                    None => {
                        yield Err(RoundtableError::UnknownParticipant(speaker));
                        return;
                    }
                };

                match self.agent_reply(agent, &turn_history).await {
                    Ok(reply) => {
                        turn_history.push(reply.clone());
                        spoken.insert(speaker);
                        yield Ok(reply);
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }
}

/// Render history as a flat `name: text` transcript for the moderator.
fn render_transcript(history: &[ChatMessage]) -> String {
    if history.is_empty() {
        return "(the conversation has not started)".to_string();
    }
    history
        .iter()
        .filter(|m| !m.text().is_empty())
        .map(|m| match m.sender() {
            Some(name) => format!("{name}: {}", m.text()),
            None => m.text(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
