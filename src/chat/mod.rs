pub mod store;
pub mod voices;

use serde::{Serialize, Deserialize};
use uuid::Uuid;

pub use store::MessageStore;
pub use voices::VoiceSelector;

/// The two fixed participants of the practice chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum User {
    Lena,
    Hwangmin,
}

impl User {
    pub const ALL: [User; 2] = [User::Lena, User::Hwangmin];

    pub fn id(&self) -> &'static str {
        match self {
            User::Lena => "lena",
            User::Hwangmin => "hwangmin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            User::Lena => "레나",
            User::Hwangmin => "황민",
        }
    }

    pub fn profile_image(&self) -> &'static str {
        match self {
            User::Lena => "person.circle.fill",
            User::Hwangmin => "person.circle.fill",
        }
    }

    /// The conversation partner shown in the chat header
    pub fn other(&self) -> User {
        match self {
            User::Lena => User::Hwangmin,
            User::Hwangmin => User::Lena,
        }
    }

    /// Language prefix used to fill this user's voice picker
    pub fn voice_language(&self) -> &'static str {
        match self {
            User::Lena => "ko",
            User::Hwangmin => "ja",
        }
    }

    /// Language hint used when this user taps a message to hear it
    pub fn speech_locale(&self) -> &'static str {
        match self {
            User::Lena => "ko-KR",
            User::Hwangmin => "ja-JP",
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for User {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lena" => Ok(User::Lena),
            "hwangmin" => Ok(User::Hwangmin),
            other => anyhow::bail!("Unknown user: {}", other),
        }
    }
}

/// Profile data handed to the user-select screen
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: User,
    pub name: &'static str,
    /// Whose name the chat header shows on this user's screen
    pub partner: User,
    pub profile_image: &'static str,
    pub voice_language: &'static str,
    pub speech_locale: &'static str,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user,
            name: user.display_name(),
            partner: user.other(),
            profile_image: user.profile_image(),
            voice_language: user.voice_language(),
            speech_locale: user.speech_locale(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// UI identity only
    pub id: Uuid,
    pub user: User,
    pub text: String,
    /// Sent time, 24-hour "HH:MM"
    pub time: String,
    #[serde(default)]
    pub is_read: bool,
}

impl ChatMessage {
    pub fn new(user: User, text: String, time: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text,
            time,
            is_read: false,
        }
    }
}

/// A message as one user's chat screen renders it
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub is_mine: bool,
    /// The "읽음" label: only on the viewer's own messages once read
    pub show_read_receipt: bool,
}

/// Published after every state mutation so the screen can re-render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    MessageSent { id: Uuid, user: User },
    MessagesRead { viewer: User, count: usize },
    VoiceSelected { user: User, voice_id: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_are_each_others_partner() {
        for user in User::ALL {
            assert_ne!(user.other(), user);
            assert_eq!(user.other().other(), user);
        }
    }

    #[test]
    fn user_ids_round_trip_through_strings_and_serde() {
        for user in User::ALL {
            assert_eq!(user.id().parse::<User>().unwrap(), user);
            assert_eq!(serde_json::to_string(&user).unwrap(), format!("\"{}\"", user.id()));
        }
        assert!("nobody".parse::<User>().is_err());
    }

    #[test]
    fn profiles_name_the_chat_partner() {
        let lena = UserProfile::from(User::Lena);
        assert_eq!(lena.partner, User::Hwangmin);
        assert_eq!(lena.name, "레나");

        let json = serde_json::to_value(UserProfile::from(User::Hwangmin)).unwrap();
        assert_eq!(json["id"], "hwangmin");
        assert_eq!(json["partner"], "lena");
    }

    #[test]
    fn practice_languages_match_the_picker_and_tap_locales() {
        assert_eq!(User::Lena.voice_language(), "ko");
        assert_eq!(User::Hwangmin.voice_language(), "ja");
        for user in User::ALL {
            assert!(user.speech_locale().starts_with(user.voice_language()));
        }
    }

    #[test]
    fn new_messages_start_unread_with_distinct_ids() {
        let a = ChatMessage::new(User::Lena, "안녕".into(), "09:30".into());
        let b = ChatMessage::new(User::Lena, "안녕".into(), "09:30".into());
        assert!(!a.is_read);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn message_view_flattens_message_fields() {
        let message = ChatMessage::new(User::Hwangmin, "こんにちは".into(), "10:05".into());
        let view = MessageView { message, is_mine: true, show_read_receipt: false };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"], "hwangmin");
        assert_eq!(json["time"], "10:05");
        assert_eq!(json["is_mine"], true);
        assert_eq!(json["is_read"], false);
    }
}
