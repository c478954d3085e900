use tauri::{AppHandle, Manager};

use crate::chat::{ChatMessage, MessageView, User, UserProfile};
use crate::state::AppState;

#[tauri::command]
pub fn get_users() -> Vec<UserProfile> {
    User::ALL.into_iter().map(UserProfile::from).collect()
}

/// Tauri command: the message list as `viewer`'s screen renders it
#[tauri::command]
pub fn get_messages(app_handle: AppHandle, viewer: User) -> Result<Vec<MessageView>, String> {
    let state = app_handle.state::<AppState>();
    let chat = state.chat.lock().unwrap();
    Ok(chat.conversation_for(viewer))
}

#[tauri::command]
pub fn send_message(app_handle: AppHandle, from: User, text: String) -> Result<ChatMessage, String> {
    let state = app_handle.state::<AppState>();
    let mut chat = state.chat.lock().unwrap();
    Ok(chat.send_message(from, text))
}

/// Tauri command: the viewer's chat screen appeared
#[tauri::command]
pub fn mark_messages_read(app_handle: AppHandle, viewer: User) -> Result<usize, String> {
    let state = app_handle.state::<AppState>();
    let mut chat = state.chat.lock().unwrap();
    Ok(chat.open_chat(viewer))
}
