use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use crate::state::Settings;

pub const SETTINGS_FILE: &str = "settings.json";
const SETTINGS_KEY: &str = "settings";

/// Reads settings from the app store, falling back to defaults when the
/// store is missing, unreadable or holds something that isn't `Settings`.
pub fn load_settings(app_handle: &AppHandle) -> Settings {
    let store = match app_handle.store(SETTINGS_FILE) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to open settings store: {}. Using defaults.", e);
            return Settings::default();
        }
    };

    settings_from_value(store.get(SETTINGS_KEY))
}

pub fn settings_from_value(value: Option<serde_json::Value>) -> Settings {
    match value {
        Some(value) => match serde_json::from_value::<Settings>(value) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
                Settings::default()
            }
        },
        None => {
            tracing::info!("No stored settings found. Using defaults.");
            Settings::default()
        }
    }
}
