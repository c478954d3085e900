use tauri::{AppHandle, Manager};
use anyhow::Result;
use uuid::Uuid;

use crate::chat::User;
use crate::engine::Voice;
use crate::speech::SpeechDispatcher;
use crate::state::AppState;

/// Tauri command: speak arbitrary text for `user`. Resolves to the voice
/// used, or null when no voice was available and nothing was queued.
#[tauri::command]
pub fn speak(app_handle: AppHandle, text: String, language: String, user: User) -> Result<Option<Voice>, String> {
    do_speak(&app_handle, &text, &language, user).map_err(|e| e.to_string())
}

/// Tauri command: `viewer` tapped a message bubble
#[tauri::command]
pub fn speak_message(app_handle: AppHandle, message_id: Uuid, viewer: User) -> Result<Option<Voice>, String> {
    let state = app_handle.state::<AppState>();
    let text = state.chat.lock().unwrap()
        .message(message_id)
        .map(|m| m.text.clone())
        .ok_or_else(|| format!("Unknown message: {}", message_id))?;
    do_speak(&app_handle, &text, viewer.speech_locale(), viewer).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn stop_speaking(app_handle: AppHandle) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    if let Some(engine) = state.speech_engine.lock().unwrap().as_ref() {
        engine.stop_pending();
    }
    Ok(())
}

/// Internal: resolve a voice and queue one utterance
pub fn do_speak(app_handle: &AppHandle, text: &str, language: &str, user: User) -> Result<Option<Voice>> {
    let state = app_handle.state::<AppState>();
    // Copy the voice choices so chat commands aren't blocked behind catalog queries
    let voices = state.chat.lock().unwrap().voices.clone();
    let engine_guard = state.speech_engine.lock().unwrap();

    let Some(engine) = engine_guard.as_ref() else {
        tracing::debug!("Speech engine unavailable; ignoring speak request from {}", user);
        return Ok(None);
    };

    Ok(SpeechDispatcher::new(engine, voices).speak(text, language, user))
}
