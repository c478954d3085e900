use chrono::{Local, NaiveTime};

use super::{ChatMessage, MessageView, User};

const TIME_FORMAT: &str = "%H:%M";

/// Append-only, in-memory message history. Creation order is display order.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message stamped with the current local time.
    /// Empty text is accepted as-is.
    pub fn send(&mut self, author: User, text: impl Into<String>) -> &ChatMessage {
        self.send_at(author, text, Local::now().time())
    }

    pub fn send_at(&mut self, author: User, text: impl Into<String>, at: NaiveTime) -> &ChatMessage {
        let message = ChatMessage::new(author, text.into(), at.format(TIME_FORMAT).to_string());
        tracing::debug!("Message {} sent by {} at {}", message.id, author, message.time);
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Marks every message not written by `viewer` as read.
    /// Returns how many messages flipped from unread to read.
    pub fn mark_read(&mut self, viewer: User) -> usize {
        let mut changed = 0;
        for message in self.messages.iter_mut().filter(|m| m.user != viewer) {
            if !message.is_read {
                message.is_read = true;
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::debug!("{} opened the chat: {} message(s) marked read", viewer, changed);
        }
        changed
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The message list as `viewer`'s chat screen shows it
    pub fn conversation_for(&self, viewer: User) -> Vec<MessageView> {
        self.messages
            .iter()
            .map(|message| {
                let is_mine = message.user == viewer;
                MessageView {
                    message: message.clone(),
                    is_mine,
                    show_read_receipt: is_mine && message.is_read,
                }
            })
            .collect()
    }
}
