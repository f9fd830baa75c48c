//! Tauri command surface. Each command borrows the managed state and defers
//! to the functions in `commands`; native file dialogs are resolved here.

use std::path::PathBuf;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;
use tauri_plugin_opener::OpenerExt;

use crate::commands::library::LibraryView;
use crate::commands::settings::ApiKeyStatus;
use crate::commands::{chat, library, settings};
use crate::llm::gemini::GeminiClient;
use crate::state::AppState;
use crate::store::models::{AiModelConfig, Folder, Message, NewSource, Preview, Source};

type App = AppState<GeminiClient>;

fn pick_folder(app: &AppHandle, title: &str) -> Result<Option<PathBuf>, String> {
    match app.dialog().file().set_title(title).blocking_pick_folder() {
        Some(dir) => dir.into_path().map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

// ── Chat ──

#[tauri::command]
pub fn get_messages(state: State<'_, App>) -> Vec<Message> {
    chat::get_messages(state.inner())
}

#[tauri::command]
pub async fn send_message(state: State<'_, App>, text: String) -> Result<Message, String> {
    Ok(chat::send_message(state.inner(), text).await?)
}

#[tauri::command]
pub fn export_transcript(state: State<'_, App>) -> Option<String> {
    chat::export_transcript(state.inner())
}

/// Asks for a target folder, then writes the dated transcript into it.
#[tauri::command]
pub async fn export_chat(app: AppHandle, state: State<'_, App>) -> Result<Option<String>, String> {
    let Some(dir) = pick_folder(&app, "Export chat")? else {
        return Ok(None);
    };
    let written = chat::export_chat(state.inner(), &dir).await?;
    Ok(written.map(|path| path.display().to_string()))
}

// ── Library ──

#[tauri::command]
pub fn list_library(state: State<'_, App>) -> LibraryView {
    library::list_library(state.inner())
}

#[tauri::command]
pub fn add_folder(state: State<'_, App>, name: String) -> Folder {
    library::add_folder(state.inner(), name)
}

#[tauri::command]
pub fn delete_folder(state: State<'_, App>, id: String) -> Vec<String> {
    library::delete_folder(state.inner(), id)
}

#[tauri::command]
pub fn add_source(state: State<'_, App>, source: NewSource) -> Result<Source, String> {
    Ok(library::add_source(state.inner(), source)?)
}

#[tauri::command]
pub async fn add_file_source(
    app: AppHandle,
    state: State<'_, App>,
    folder_id: Option<String>,
) -> Result<Option<Source>, String> {
    let Some(picked) = app.dialog().file().blocking_pick_file() else {
        return Ok(None);
    };
    let path = picked.into_path().map_err(|e| e.to_string())?;
    Ok(Some(library::add_file_source(state.inner(), path, folder_id).await?))
}

#[tauri::command]
pub fn delete_source(state: State<'_, App>, id: String) -> bool {
    library::delete_source(state.inner(), id)
}

#[tauri::command]
pub fn toggle_source(state: State<'_, App>, id: String) -> bool {
    library::toggle_source(state.inner(), id)
}

#[tauri::command]
pub fn update_source(state: State<'_, App>, source: Source) -> Result<(), String> {
    Ok(library::update_source(state.inner(), source)?)
}

#[tauri::command]
pub fn edit_source(
    state: State<'_, App>,
    id: String,
    name: String,
    folder_id: Option<String>,
) -> Result<Source, String> {
    Ok(library::edit_source(state.inner(), id, name, folder_id)?)
}

#[tauri::command]
pub fn view_source(state: State<'_, App>, id: String) -> Result<Preview, String> {
    Ok(library::view_source(state.inner(), id)?)
}

/// Opens a URL source in the system browser.
#[tauri::command]
pub fn open_source(app: AppHandle, state: State<'_, App>, id: String) -> Result<(), String> {
    match library::view_source(state.inner(), id)? {
        Preview::Link(address) => app
            .opener()
            .open_url(address, None::<&str>)
            .map_err(|e| e.to_string()),
        _ => Err("Only URL sources can be opened in the browser.".to_string()),
    }
}

#[tauri::command]
pub async fn download_source(
    app: AppHandle,
    state: State<'_, App>,
    id: String,
) -> Result<Option<String>, String> {
    let Some(dir) = pick_folder(&app, "Download source")? else {
        return Ok(None);
    };
    let written = library::download_source(state.inner(), id, &dir).await?;
    Ok(Some(written.display().to_string()))
}

// ── Settings ──

#[tauri::command]
pub fn api_key_status(state: State<'_, App>) -> ApiKeyStatus {
    settings::api_key_status(state.inner())
}

#[tauri::command]
pub fn get_model_configs(state: State<'_, App>) -> Vec<AiModelConfig> {
    settings::get_model_configs(state.inner())
}

#[tauri::command]
pub fn save_model_configs(state: State<'_, App>, configs: Vec<AiModelConfig>) -> Result<(), String> {
    Ok(settings::save_model_configs(state.inner(), configs)?)
}

#[tauri::command]
pub fn set_model_active(state: State<'_, App>, id: String, active: bool) -> Result<(), String> {
    Ok(settings::set_model_active(state.inner(), id, active)?)
}

#[tauri::command]
pub fn add_custom_endpoint(state: State<'_, App>, name: String, url: String) -> AiModelConfig {
    settings::add_custom_endpoint(state.inner(), name, url)
}
