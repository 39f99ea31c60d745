use tokio::sync::broadcast;

use crate::api::ChatMessage;
use crate::core::message::{Role, Turn, TurnId};

const EVENT_CAPACITY: usize = 64;

/// Append-only conversation log.
///
/// Every append is published to subscribers so a front end can redraw
/// incrementally instead of re-reading the whole history.
pub struct Transcript {
    turns: Vec<Turn>,
    next_id: u64,
    events: broadcast::Sender<Turn>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            turns: Vec::new(),
            next_id: 1,
            events,
        }
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Turn {
        let turn = Turn::new(TurnId::new(self.next_id), role, content);
        self.next_id += 1;
        self.turns.push(turn.clone());
        // No subscribers is fine.
        let _ = self.events.send(turn.clone());
        turn
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Turn> {
        self.events.subscribe()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_assistant())
    }

    /// Wire messages for every turn, in conversation order.
    pub fn to_api_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| ChatMessage::new(turn.role(), turn.content()))
            .collect()
    }
}
