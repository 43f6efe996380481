// src/core/message.rs — Ordered conversation log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    System,
}

impl Sender {
    pub fn tag(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
            Sender::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

/// The visible conversation. Ids derive from the sender tag and creation
/// time; a log-local sequence breaks same-millisecond ties so they stay
/// unique within one log.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    seq: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        let timestamp = Utc::now();
        self.seq += 1;
        let id = format!(
            "{}-{}-{}",
            sender.tag(),
            timestamp.timestamp_millis(),
            self.seq
        );
        self.messages.push(Message {
            id,
            text: text.into(),
            sender,
            timestamp,
        });
    }

    /// Replace the whole log with a single system entry. Prior turns are
    /// discarded: the session context they belonged to no longer exists.
    pub fn reset_with_system(&mut self, text: impl Into<String>) {
        self.messages.clear();
        self.push(Sender::System, text);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_appends_in_order() {
        let mut log = MessageLog::new();
        log.push(Sender::User, "hola");
        log.push(Sender::Bot, "buenas");
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].sender, Sender::User);
        assert_eq!(log.messages()[1].sender, Sender::Bot);
    }

    #[test]
    fn test_ids_unique_within_a_log() {
        // Same sender, same millisecond: the sequence component keeps ids apart.
        let mut log = MessageLog::new();
        for _ in 0..50 {
            log.push(Sender::User, "x");
        }
        let mut ids: Vec<&str> = log.messages().iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_id_carries_sender_tag() {
        let mut log = MessageLog::new();
        log.push(Sender::System, "inicio");
        assert!(log.messages()[0].id.starts_with("system-"));
    }

    #[test]
    fn test_reset_leaves_exactly_one_system_entry() {
        let mut log = MessageLog::new();
        log.push(Sender::User, "hola");
        log.push(Sender::Bot, "buenas");
        log.reset_with_system("Chat iniciado/actualizado.");
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].sender, Sender::System);
        assert_eq!(log.messages()[0].text, "Chat iniciado/actualizado.");
    }

    #[test]
    fn test_empty_log() {
        let log = MessageLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }
}
