use super::User;

/// Per-user voice choice, kept for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct VoiceSelector {
    lena: Option<String>,
    hwangmin: Option<String>,
}

impl VoiceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self, user: User) -> Option<&str> {
        match user {
            User::Lena => self.lena.as_deref(),
            User::Hwangmin => self.hwangmin.as_deref(),
        }
    }

    /// `None` clears the choice so speech falls back to the language default.
    pub fn set_selection(&mut self, user: User, voice_id: Option<String>) {
        tracing::debug!("Voice for {} set to {:?}", user, voice_id);
        match user {
            User::Lena => self.lena = voice_id,
            User::Hwangmin => self.hwangmin = voice_id,
        }
    }
}
