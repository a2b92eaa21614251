//! Participants, conversation history, and chat engines.

pub mod assistant;
pub mod conversation;
pub mod engine;
pub mod group_chat;
pub mod participant;

pub use assistant::Assistant;
pub use conversation::Conversation;
pub use engine::ChatEngine;
pub use group_chat::GroupChat;
pub use participant::{Participant, ParticipantKind, Roster};
