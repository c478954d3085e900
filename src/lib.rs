mod audio;
mod chat;
mod commands;
mod config;
mod engine;
mod speech;
mod state;

use anyhow::Result;
use chat::User;
use engine::SpeechEngine;
use state::{AppState, SpeechSettings};
use tauri::{Emitter, Manager};
use tracing_subscriber::EnvFilter;

/// Starts the shared speech engine for the configured backend
fn start_speech_engine(settings: &SpeechSettings) -> Result<SpeechEngine> {
    let backend = engine::create_backend(settings.backend, settings.rate_wpm)?;
    let output = audio::CpalOutput::new(settings.volume);
    SpeechEngine::spawn(backend, Box::new(output))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Language Exchange v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            commands::chat::get_users,
            commands::chat::get_messages,
            commands::chat::send_message,
            commands::chat::mark_messages_read,
            commands::voice::list_voices,
            commands::voice::get_selected_voice,
            commands::voice::set_selected_voice,
            commands::tts::speak,
            commands::tts::speak_message,
            commands::tts::stop_speaking,
            commands::settings::get_settings,
            commands::settings::get_speech_backend,
            commands::settings::get_app_version,
        ])
        .setup(|app| {
            let settings = config::load_settings(app.handle());
            tracing::info!("Settings loaded from store");

            let state = app.state::<AppState>();
            {
                let mut chat = state.chat.lock().unwrap();
                for user in User::ALL {
                    if let Some(voice_id) = settings.voices.for_user(user) {
                        chat.voices.set_selection(user, Some(voice_id.to_string()));
                    }
                }

                // Every mutation re-renders the webview
                let handle = app.handle().clone();
                chat.subscribe(move |event| {
                    if let Err(e) = handle.emit("chat-updated", event) {
                        tracing::warn!("Failed to emit chat update: {}", e);
                    }
                });
            }

            match start_speech_engine(&settings.speech) {
                Ok(engine) => {
                    *state.speech_engine.lock().unwrap() = Some(engine);
                }
                Err(e) => {
                    tracing::error!("Speech is unavailable: {}", e);
                }
            }

            *state.settings.lock().unwrap() = settings;
            tracing::info!("App setup complete");

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
