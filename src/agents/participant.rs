//! Participant roster for group chats.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoundtableError};

/// What drives a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantKind {
    /// Controlled by a person at the console.
    Human,
    /// Automated; responds via the model with these instructions and may
    /// invoke the named capabilities.
    Agent {
        instructions: String,
        #[serde(default)]
        tools: Vec<String>,
    },
}

/// A named entity in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ParticipantKind,
}

impl Participant {
    /// Create a human-controlled participant.
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: ParticipantKind::Human,
        }
    }

    /// Create an automated participant with behavior instructions.
    pub fn agent(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: ParticipantKind::Agent {
                instructions: instructions.into(),
                tools: Vec::new(),
            },
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the capabilities an agent may invoke. No-op for humans.
    pub fn with_tools(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        if let ParticipantKind::Agent { ref mut tools, .. } = self.kind {
            *tools = names.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, ParticipantKind::Human)
    }
}

/// Ordered participant list plus the shared scenario description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Roster {
    pub background: String,
    pub participants: Vec<Participant>,
}

impl Roster {
    pub fn new(background: impl Into<String>, participants: Vec<Participant>) -> Self {
        Self {
            background: background.into(),
            participants,
        }
    }

    /// Check roster consistency: unique names, at least one agent, at most
    /// one human.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for p in &self.participants {
            if !seen.insert(p.name.as_str()) {
                return Err(RoundtableError::InvalidRoster(format!(
                    "duplicate participant name '{}'",
                    p.name
                )));
            }
        }
        if self.agents().next().is_none() {
            return Err(RoundtableError::InvalidRoster(
                "roster needs at least one automated participant".into(),
            ));
        }
        if self.participants.iter().filter(|p| p.is_human()).count() > 1 {
            return Err(RoundtableError::InvalidRoster(
                "roster supports at most one human participant".into(),
            ));
        }
        Ok(())
    }

    /// Look up a participant by name.
    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    /// The human participant's display name, if any.
    pub fn human_name(&self) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.is_human())
            .map(|p| p.name.as_str())
    }

    /// Automated participants, in roster order.
    pub fn agents(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| !p.is_human())
    }
}
