//! Turns a question and the selected sources into one grounded generation
//! request, and maps the outcome to the text shown in the chat.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

use crate::llm::{Attachment, GenerateRequest, GenerativeModel, LlmError};
use crate::store::models::{Source, SourceKind};

pub const NO_SOURCES_MESSAGE: &str =
    "Please select at least one source for me to answer from. (لطفا حداقل یک منبع برای پاسخگویی انتخاب کنید)";
pub const NOT_FOUND_PHRASE: &str = "I could not find an answer in the provided sources.";
pub const AUTH_ERROR_MESSAGE: &str = "Authentication Error: Your API key is invalid or missing. Please make sure it is configured correctly as an environment variable.";
pub const GENERIC_ERROR_MESSAGE: &str = "I'm sorry, I encountered an error processing your request. The file might be unsupported or too large.";

static AUTH_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b401\b|UNAUTHENTICATED|PERMISSION_DENIED|api key not valid|invalid api key")
        .expect("auth failure pattern is valid")
});

/// How a failed request is reported back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Authentication,
    Generic,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::Authentication => AUTH_ERROR_MESSAGE,
            FailureKind::Generic => GENERIC_ERROR_MESSAGE,
        }
    }
}

pub fn classify(err: &LlmError) -> FailureKind {
    if matches!(err, LlmError::MissingApiKey) || matches!(err.status(), Some(401 | 403)) {
        return FailureKind::Authentication;
    }
    if AUTH_FAILURE.is_match(&err.to_string()) {
        FailureKind::Authentication
    } else {
        FailureKind::Generic
    }
}

/// Assemble the prompt and inline attachments for `sources`, in order.
pub fn build_request(question: &str, sources: &[Source]) -> GenerateRequest {
    let mut attachments = Vec::new();
    let mut source_list = String::new();

    for source in sources {
        match &source.kind {
            SourceKind::File { mime_type, data } if !data.is_empty() && !mime_type.is_empty() => {
                attachments.push(Attachment {
                    mime_type: mime_type.clone(),
                    data: STANDARD.encode(data),
                });
                let _ = writeln!(
                    source_list,
                    "- FILE: {} (Content is attached and ready for analysis)",
                    source.name
                );
            }
            SourceKind::Url { address } => {
                let _ = writeln!(source_list, "- URL: {}", address);
            }
            other => {
                let _ = writeln!(source_list, "- {}: {}", other.label(), source.name);
            }
        }
    }

    let prompt = format!(
        r#"
You are an expert assistant. Your knowledge is strictly limited to the information provided in the "SOURCES" section and any attached files. You MUST NOT use any external knowledge.

Your task is to answer the user's question based *ONLY* on the provided sources.

- If the answer is in the sources, provide a clear and concise answer.
- If the answer cannot be found in the provided sources, you must state: "{not_found}"
- Do not make up information.

SOURCES:
{source_list}

USER'S QUESTION:
{question}

ANSWER:
  "#,
        not_found = NOT_FOUND_PHRASE,
    );

    GenerateRequest {
        prompt,
        attachments,
    }
}

/// Answers questions from a fixed set of sources through one backend call.
pub struct GroundedRequester<M> {
    model: M,
}

impl<M: GenerativeModel> GroundedRequester<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the answer text, or the user-facing message for whatever went
    /// wrong. Makes at most one call and never retries.
    pub async fn respond(&self, question: &str, sources: &[Source]) -> String {
        if sources.is_empty() {
            return NO_SOURCES_MESSAGE.to_string();
        }

        let request = build_request(question, sources);
        match self.model.generate(&request).await {
            Ok(response) => {
                tracing::info!(
                    model = %response.model,
                    sources = sources.len(),
                    "grounded answer received"
                );
                response.text
            }
            Err(err) => {
                let kind = classify(&err);
                tracing::error!(error = %err, ?kind, "grounded request failed");
                kind.message().to_string()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::llm::GenerateResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Records every request and replays a canned outcome.
    pub struct FakeModel {
        pub requests: Mutex<Vec<GenerateRequest>>,
        outcome: Box<dyn Fn() -> Result<String, LlmError> + Send + Sync>,
        delay: Option<Duration>,
    }

    impl FakeModel {
        pub fn answering(text: &str) -> Self {
            let text = text.to_string();
            Self::with(move || Ok(text.clone()))
        }

        pub fn failing(status: u16, message: &str) -> Self {
            let message = message.to_string();
            Self::with(move || {
                Err(LlmError::Api {
                    status,
                    message: message.clone(),
                })
            })
        }

        pub fn with(outcome: impl Fn() -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                outcome: Box::new(outcome),
                delay: None,
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
            self.requests.lock().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.outcome)().map(|text| GenerateResponse {
                text,
                model: "fake".to_string(),
            })
        }
    }
}
