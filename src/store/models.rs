use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub folder_id: Option<String>,
    #[serde(flatten)]
    pub kind: SourceKind,
}

/// What a source points at. Each kind carries only the fields it needs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SourceKind {
    #[serde(rename = "URL")]
    Url { address: String },
    #[serde(rename = "File")]
    File {
        mime_type: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    Telegram { handle: String },
    Twitter { handle: String },
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Url { .. } => "URL",
            SourceKind::File { .. } => "File",
            SourceKind::Telegram { .. } => "Telegram",
            SourceKind::Twitter { .. } => "Twitter",
        }
    }
}

/// Fields for a source that has not been assigned an id yet.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewSource {
    pub name: String,
    pub folder_id: Option<String>,
    #[serde(flatten)]
    pub kind: SourceKind,
}

/// How the view dialog should render a source.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Preview {
    Link(String),
    Handle(String),
    Image { data_url: String },
    Pdf { data_url: String },
    Unsupported { mime_type: String },
}

impl Source {
    pub fn preview(&self) -> Preview {
        match &self.kind {
            SourceKind::Url { address } => Preview::Link(address.clone()),
            SourceKind::Telegram { handle } | SourceKind::Twitter { handle } => {
                Preview::Handle(handle.clone())
            }
            SourceKind::File { mime_type, data } => {
                if mime_type.starts_with("image/") {
                    Preview::Image {
                        data_url: crate::ingest::to_data_url(mime_type, data),
                    }
                } else if mime_type == "application/pdf" {
                    Preview::Pdf {
                        data_url: crate::ingest::to_data_url(mime_type, data),
                    }
                } else {
                    Preview::Unsupported {
                        mime_type: mime_type.clone(),
                    }
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelKind {
    Gemini,
    Custom { url: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AiModelConfig {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ModelKind,
    pub is_active: bool,
}

impl AiModelConfig {
    pub fn gemini_default() -> Self {
        Self {
            id: "gemini-default".to_string(),
            name: "Google Gemini (gemini-2.5-flash)".to_string(),
            kind: ModelKind::Gemini,
            is_active: true,
        }
    }
}

mod base64_bytes {
    use super::{Engine, STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_serializes_payload_as_base64() {
        let source = Source {
            id: "s1".into(),
            name: "pixel.png".into(),
            folder_id: None,
            kind: SourceKind::File {
                mime_type: "image/png".into(),
                data: vec![1, 2, 3],
            },
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["type"], "File");
        assert_eq!(json["data"], "AQID");
        let back: Source = serde_json::from_value(json).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn test_preview_by_kind() {
        let mut source = Source {
            id: "s1".into(),
            name: "doc".into(),
            folder_id: None,
            kind: SourceKind::File {
                mime_type: "application/pdf".into(),
                data: b"%PDF".to_vec(),
            },
        };
        assert!(matches!(source.preview(), Preview::Pdf { data_url } if data_url.starts_with("data:application/pdf;base64,")));

        source.kind = SourceKind::File {
            mime_type: "text/csv".into(),
            data: b"a,b".to_vec(),
        };
        assert_eq!(
            source.preview(),
            Preview::Unsupported {
                mime_type: "text/csv".into()
            }
        );

        source.kind = SourceKind::Twitter {
            handle: "@rustlang".into(),
        };
        assert_eq!(source.preview(), Preview::Handle("@rustlang".into()));
    }

    #[test]
    fn test_preview_wire_shape() {
        let link = serde_json::to_value(Preview::Link("https://example.com".into())).unwrap();
        assert_eq!(link["kind"], "link");
        assert_eq!(link["data"], "https://example.com");

        let other = serde_json::to_value(Preview::Unsupported {
            mime_type: "text/csv".into(),
        })
        .unwrap();
        assert_eq!(other["kind"], "unsupported");
        assert_eq!(other["data"]["mime_type"], "text/csv");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::new(Sender::User, "hi");
        let b = Message::new(Sender::Bot, "hello");
        assert_ne!(a.id, b.id);
    }
}
