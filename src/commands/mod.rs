pub mod chat;
pub mod settings;
pub mod tts;
pub mod voice;
