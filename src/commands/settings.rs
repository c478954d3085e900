use tauri::{AppHandle, Manager};
use crate::state::{AppState, Settings};

#[tauri::command]
pub fn get_settings(app_handle: AppHandle) -> Result<Settings, String> {
    let state = app_handle.state::<AppState>();
    let settings = state.settings.lock().unwrap().clone();
    Ok(settings)
}

/// Tauri command: name of the active speech backend, if one started
#[tauri::command]
pub fn get_speech_backend(app_handle: AppHandle) -> Result<Option<String>, String> {
    let state = app_handle.state::<AppState>();
    let engine = state.speech_engine.lock().unwrap();
    Ok(engine.as_ref().map(|e| e.backend_name().to_string()))
}

#[tauri::command]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
