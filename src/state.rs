use std::sync::Mutex;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::chat::{ChatEvent, ChatMessage, MessageStore, MessageView, User, VoiceSelector};
use crate::engine::{BackendKind, SpeechEngine};

type Subscriber = Box<dyn Fn(&ChatEvent) + Send>;

pub struct AppState {
    pub chat: Mutex<ChatState>,
    pub speech_engine: Mutex<Option<SpeechEngine>>,
    pub settings: Mutex<Settings>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            chat: Mutex::new(ChatState::new()),
            speech_engine: Mutex::new(None),
            settings: Mutex::new(Settings::default()),
        }
    }
}

/// Messages and voice choices, with change notification for the screens
pub struct ChatState {
    pub store: MessageStore,
    pub voices: VoiceSelector,
    subscribers: Vec<Subscriber>,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            store: MessageStore::new(),
            voices: VoiceSelector::new(),
            subscribers: Vec::new(),
        }
    }

    /// Registers a callback run after every mutation.
    pub fn subscribe(&mut self, subscriber: impl Fn(&ChatEvent) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn publish(&self, event: ChatEvent) {
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }

    pub fn send_message(&mut self, from: User, text: impl Into<String>) -> ChatMessage {
        let message = self.store.send(from, text).clone();
        tracing::debug!("Conversation now holds {} message(s)", self.store.len());
        self.publish(ChatEvent::MessageSent { id: message.id, user: from });
        message
    }

    /// Called when `viewer`'s chat screen becomes active.
    pub fn open_chat(&mut self, viewer: User) -> usize {
        if self.store.is_empty() {
            return 0;
        }
        let count = self.store.mark_read(viewer);
        if count > 0 {
            self.publish(ChatEvent::MessagesRead { viewer, count });
        }
        count
    }

    pub fn select_voice(&mut self, user: User, voice_id: Option<String>) {
        self.voices.set_selection(user, voice_id.clone());
        self.publish(ChatEvent::VoiceSelected { user, voice_id });
    }

    pub fn conversation_for(&self, viewer: User) -> Vec<MessageView> {
        self.store.conversation_for(viewer)
    }

    pub fn message(&self, id: Uuid) -> Option<&ChatMessage> {
        self.store.messages().iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub voices: VoiceDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub rate_wpm: Option<u32>,
}

fn default_volume() -> f32 {
    1.0
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            volume: default_volume(),
            rate_wpm: None,
        }
    }
}

/// Voices preselected for each user at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceDefaults {
    pub lena: Option<String>,
    pub hwangmin: Option<String>,
}

impl VoiceDefaults {
    pub fn for_user(&self, user: User) -> Option<&str> {
        match user {
            User::Lena => self.lena.as_deref(),
            User::Hwangmin => self.hwangmin.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use super::*;

    fn recorded(chat: &mut ChatState) -> Arc<Mutex<Vec<ChatEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        chat.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn every_send_notifies_subscribers() {
        let mut chat = ChatState::new();
        let events = recorded(&mut chat);

        let message = chat.send_message(User::Lena, "안녕");

        assert_eq!(*events.lock().unwrap(), vec![ChatEvent::MessageSent { id: message.id, user: User::Lena }]);
    }

    #[test]
    fn opening_a_chat_notifies_only_when_something_changed() {
        let mut chat = ChatState::new();
        chat.send_message(User::Lena, "안녕");
        let events = recorded(&mut chat);

        assert_eq!(chat.open_chat(User::Hwangmin), 1);
        assert_eq!(chat.open_chat(User::Hwangmin), 0);
        assert_eq!(chat.open_chat(User::Lena), 0);

        assert_eq!(*events.lock().unwrap(), vec![ChatEvent::MessagesRead { viewer: User::Hwangmin, count: 1 }]);
    }

    #[test]
    fn selecting_a_voice_updates_selector_and_notifies() {
        let mut chat = ChatState::new();
        let events = recorded(&mut chat);

        chat.select_voice(User::Hwangmin, Some("ja".into()));

        assert_eq!(chat.voices.selection(User::Hwangmin), Some("ja"));
        assert_eq!(chat.voices.selection(User::Lena), None);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn finds_messages_by_id() {
        let mut chat = ChatState::new();
        let id = chat.send_message(User::Hwangmin, "find me").id;
        assert_eq!(chat.message(id).map(|m| m.text.as_str()), Some("find me"));
        assert!(chat.message(Uuid::new_v4()).is_none());
    }

    #[test]
    fn opening_an_empty_chat_changes_nothing() {
        let mut chat = ChatState::new();
        let events = recorded(&mut chat);
        assert_eq!(chat.open_chat(User::Lena), 0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"speech": {"backend": "espeak"}}"#).unwrap();
        assert_eq!(settings.speech.backend, BackendKind::Espeak);
        assert_eq!(settings.speech.volume, 1.0);
        assert_eq!(settings.speech.rate_wpm, None);
        assert_eq!(settings.voices.for_user(User::Lena), None);
    }
}
