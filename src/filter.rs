//! Trigger-keyword filtering for inbound chat messages.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{MessageEvent, OutboundMessage};

/// Title used on replies to a trigger.
pub const REPLY_TITLE: &str = "Echo";

/// Fixed set of replies; selection is uniform over the entries.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    entries: Vec<String>,
}

impl ResponseTable {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    #[cfg(test)]
    fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e == text)
    }

    /// `None` when the table is empty.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.entries.choose(rng).map(String::as_str)
    }
}

/// Case-sensitive literal prefix match, no whitespace trimming.
#[derive(Debug, Clone)]
pub struct Trigger {
    keyword: String,
}

impl Trigger {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        content.starts_with(&self.keyword)
    }
}

/// Outcome of running a chat message through the trigger filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Reply(OutboundMessage),
    NotTriggered,
    /// Trigger matched but there is nothing to answer with.
    NoResponses,
}

/// Decide the reply for a chat message.
pub fn reply_for<R: Rng + ?Sized>(
    event: &MessageEvent,
    trigger: &Trigger,
    responses: &ResponseTable,
    rng: &mut R,
) -> Decision {
    if !trigger.matches(&event.content) {
        return Decision::NotTriggered;
    }
    match responses.pick(rng) {
        Some(text) => Decision::Reply(OutboundMessage::new(
            event.space_id.clone(),
            REPLY_TITLE,
            text,
            None,
        )),
        None => Decision::NoResponses,
    }
}
