//! Conversation state for the assistant, scoped to one endpoint selection.

use crate::{
    assistant::application::request::generation_request::{ConversationTurn, GenerationRequest},
    core::domain::model::chat_message::{ChatMessage, Sender},
};
use std::collections::VecDeque;

pub const CHAT_CLEARED_MESSAGE: &str = "Chat history cleared.";

/// Model-facing conversation: the system instruction plus prior turns.
///
/// Every [`reset`](Self::reset) starts a new epoch. A reply that belongs to an
/// earlier epoch is rejected by [`record`](Self::record), so a slow request
/// cannot leak into the conversation of a different endpoint.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: String,
    turns: Vec<ConversationTurn>,
    epoch: u64,
}

impl ChatSession {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            turns: Vec::new(),
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Builds the request for `prompt` and returns it with the current epoch.
    pub fn prepare(&self, prompt: impl Into<String>) -> (GenerationRequest, u64) {
        let request = GenerationRequest {
            system_instruction: Some(self.system_instruction.clone()),
            history: self.turns.clone(),
            prompt: prompt.into(),
        };
        (request, self.epoch)
    }

    /// Like [`prepare`](Self::prepare), but only if the session is still at
    /// `epoch`. Use it when the prompt was built from state read under that epoch.
    pub fn prepare_at(&self, epoch: u64, prompt: impl Into<String>) -> Option<GenerationRequest> {
        (epoch == self.epoch).then(|| self.prepare(prompt).0)
    }

    /// Appends a completed exchange. Returns `false` if `epoch` is stale.
    pub fn record(&mut self, epoch: u64, prompt: String, reply: String) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.turns.push(ConversationTurn::user(prompt));
        self.turns.push(ConversationTurn::model(reply));
        true
    }

    pub fn reset(&mut self) {
        self.turns.clear();
        self.epoch += 1;
    }
}

/// User-visible chat log, capped to the most recent `capacity` messages.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
    next_id: u64,
}

impl Transcript {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    /// Appends a message, evicting the oldest one past capacity.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(format!("msg-{}", self.next_id), sender, text);
        self.next_id += 1;
        self.messages.push_back(message.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        message
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Drops everything and leaves a single system notice.
    pub fn clear_with_notice(&mut self) -> ChatMessage {
        self.clear();
        self.push(Sender::System, CHAT_CLEARED_MESSAGE)
    }
}
