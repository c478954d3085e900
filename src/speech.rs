use crate::chat::{User, VoiceSelector};
use crate::engine::{default_voice_for, SpeechEngine, Utterance, Voice};

/// Routes a tap on a message to the speech engine with the right voice.
/// Holds its own copy of the voice choices so the chat state need not stay
/// locked while the catalog is queried.
pub struct SpeechDispatcher<'a> {
    engine: &'a SpeechEngine,
    voices: VoiceSelector,
}

impl<'a> SpeechDispatcher<'a> {
    pub fn new(engine: &'a SpeechEngine, voices: VoiceSelector) -> Self {
        Self { engine, voices }
    }

    /// The user's picked voice if it still exists, else the default for `language`.
    /// Both lookups run against a single catalog snapshot.
    pub fn resolve_voice(&self, language: &str, user: User) -> Option<Voice> {
        let catalog = self.engine.all_voices();
        if let Some(id) = self.voices.selection(user) {
            match catalog.iter().find(|v| v.identifier == id) {
                Some(voice) => return Some(voice.clone()),
                None => tracing::debug!("Voice '{}' picked by {} is no longer installed", id, user),
            }
        }
        default_voice_for(&catalog, language).cloned()
    }

    /// Queues `text` for playback. Returns the voice used, or `None` when no
    /// voice could be resolved and nothing was queued.
    pub fn speak(&self, text: &str, language: &str, user: User) -> Option<Voice> {
        let Some(voice) = self.resolve_voice(language, user) else {
            tracing::debug!("No voice available for '{}'; skipping speech for {}", language, user);
            return None;
        };

        let utterance = Utterance {
            text: text.to_string(),
            voice: voice.clone(),
        };
        if let Err(e) = self.engine.enqueue(utterance) {
            tracing::error!("Failed to queue speech: {}", e);
            return None;
        }
        tracing::info!("Queued {} chars for {} with voice '{}'", text.chars().count(), user, voice.identifier);
        Some(voice)
    }
}
