pub mod commands;
pub mod config;
#[cfg(feature = "desktop")]
mod desktop;
pub mod grounding;
pub mod ingest;
pub mod llm;
pub mod state;
pub mod store;

use config::AppConfig;
use grounding::GroundedRequester;
use llm::gemini::GeminiClient;
use state::{AppState, Session};
use store::LibraryStore;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,grounded_chat_lib=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}

/// Builds the app state a host manages: config from the environment, the
/// Gemini backend, and a freshly seeded session.
pub fn setup() -> AppState<GeminiClient> {
    let config = AppConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("no Gemini API key configured; requests will report an authentication error");
    }
    let requester = GroundedRequester::new(GeminiClient::new(config.gemini()));
    AppState::new(config, requester, Session::new(LibraryStore::with_defaults()))
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(setup())
        .invoke_handler(tauri::generate_handler![
            desktop::get_messages,
            desktop::send_message,
            desktop::export_transcript,
            desktop::export_chat,
            desktop::list_library,
            desktop::add_folder,
            desktop::delete_folder,
            desktop::add_source,
            desktop::add_file_source,
            desktop::delete_source,
            desktop::toggle_source,
            desktop::update_source,
            desktop::edit_source,
            desktop::view_source,
            desktop::open_source,
            desktop::download_source,
            desktop::api_key_status,
            desktop::get_model_configs,
            desktop::save_model_configs,
            desktop::set_model_active,
            desktop::add_custom_endpoint,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::grounding::testing::FakeModel;

    /// App state over an empty library, without a credential.
    pub fn app_with(model: FakeModel) -> AppState<FakeModel> {
        AppState::new(
            AppConfig::default(),
            GroundedRequester::new(model),
            Session::new(LibraryStore::default()),
        )
    }
}
