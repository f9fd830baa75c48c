use super::{Attachment, GenerateRequest, GenerateResponse, GenerativeModel, LlmError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct GeminiRequest {
    contents: GeminiContent,
}

#[derive(Serialize, Debug, PartialEq)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

fn build_request(request: &GenerateRequest) -> GeminiRequest {
    let mut parts = vec![GeminiPart::Text {
        text: request.prompt.clone(),
    }];
    parts.extend(request.attachments.iter().map(|a: &Attachment| GeminiPart::Inline {
        inline_data: GeminiInlineData {
            mime_type: a.mime_type.clone(),
            data: a.data.clone(),
        },
    }));
    // Single-turn, multi-part: one content object holding every part.
    GeminiRequest {
        contents: GeminiContent { parts },
    }
}

fn extract_text(response: GeminiResponse) -> Result<String, LlmError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| LlmError::Parse("response contained no candidates".to_string()))?;
    Ok(content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect())
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        let body = build_request(request);

        tracing::debug!(
            model = %self.config.model,
            attachments = request.attachments.len(),
            "sending generateContent request"
        );

        let resp = self
            .client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status,
                message: text,
            });
        }

        let data: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(GenerateResponse {
            text: extract_text(data)?,
            model: self.config.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            prompt: "question".into(),
            attachments: vec![Attachment {
                mime_type: "image/png".into(),
                data: "AQID".into(),
            }],
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": {
                    "parts": [
                        { "text": "question" },
                        { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_extract_text_joins_text_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello, " }, { "text": "world" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GeminiResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(matches!(extract_text(response), Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = GeminiConfig {
            api_key: None,
            base_url: "http://localhost:8080/".into(),
            model: "gemini-2.5-flash".into(),
        };
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".into(),
            model: DEFAULT_MODEL.into(),
        });
        let request = GenerateRequest {
            prompt: "hi".into(),
            attachments: vec![],
        };
        assert!(matches!(
            client.generate(&request).await,
            Err(LlmError::MissingApiKey)
        ));
    }
}
