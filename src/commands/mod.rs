pub mod chat;
pub mod library;
pub mod settings;

use serde::Serialize;

use crate::ingest::IngestError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Please type a question first.")]
    EmptyQuestion,
    #[error("A request is already in progress.")]
    Busy,
    #[error("The source {0} cannot be empty.")]
    EmptySourceField(&'static str),
    #[error("Source not found: {0}")]
    SourceNotFound(String),
    #[error("Source '{0}' has no file to download")]
    NotAFile(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<CommandError> for String {
    fn from(value: CommandError) -> Self {
        value.to_string()
    }
}
