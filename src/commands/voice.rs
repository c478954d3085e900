use tauri::{AppHandle, Manager};

use crate::chat::User;
use crate::engine::Voice;
use crate::state::AppState;

/// Tauri command: voices whose language starts with `language` ("ko", "ja")
#[tauri::command]
pub fn list_voices(app_handle: AppHandle, language: String) -> Result<Vec<Voice>, String> {
    let state = app_handle.state::<AppState>();
    let engine = state.speech_engine.lock().unwrap();
    Ok(engine.as_ref().map(|e| e.voices(&language)).unwrap_or_default())
}

#[tauri::command]
pub fn get_selected_voice(app_handle: AppHandle, user: User) -> Result<Option<String>, String> {
    let state = app_handle.state::<AppState>();
    let chat = state.chat.lock().unwrap();
    Ok(chat.voices.selection(user).map(str::to_string))
}

#[tauri::command]
pub fn set_selected_voice(app_handle: AppHandle, user: User, voice_id: Option<String>) -> Result<(), String> {
    let state = app_handle.state::<AppState>();
    let mut chat = state.chat.lock().unwrap();
    chat.select_voice(user, voice_id);
    Ok(())
}
