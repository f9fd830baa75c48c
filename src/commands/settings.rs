use serde::Serialize;

use super::CommandError;
use crate::state::AppState;
use crate::store::models::AiModelConfig;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ApiKeyStatus {
    pub provided: bool,
    /// Masked for display, e.g. `AIza...9xQk`.
    pub masked: Option<String>,
}

fn mask_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "*".repeat(chars.len())
    }
}

pub fn api_key_status<M>(app: &AppState<M>) -> ApiKeyStatus {
    match app.config.api_key.as_deref() {
        Some(key) => ApiKeyStatus {
            provided: true,
            masked: Some(mask_key(key)),
        },
        None => ApiKeyStatus {
            provided: false,
            masked: None,
        },
    }
}

pub fn get_model_configs<M>(app: &AppState<M>) -> Vec<AiModelConfig> {
    app.session().library.model_configs().to_vec()
}

pub fn save_model_configs<M>(
    app: &AppState<M>,
    configs: Vec<AiModelConfig>,
) -> Result<(), CommandError> {
    app.session().library.replace_model_configs(configs)?;
    Ok(())
}

pub fn set_model_active<M>(app: &AppState<M>, id: String, active: bool) -> Result<(), CommandError> {
    app.session().library.set_model_active(&id, active)?;
    Ok(())
}

pub fn add_custom_endpoint<M>(app: &AppState<M>, name: String, url: String) -> AiModelConfig {
    tracing::warn!(%url, "custom endpoint registered; it will not be used for requests");
    app.session().library.add_custom_endpoint(&name, &url)
}
