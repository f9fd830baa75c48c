use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::CommandError;
use crate::llm::GenerativeModel;
use crate::state::{AppState, Session};
use crate::store::models::{Message, Sender};

pub const MODEL_INACTIVE_MESSAGE: &str =
    "The default Gemini model is not active. Please enable it in the settings to get a response.";
pub const SEND_FAILED_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

const TRANSCRIPT_DELIMITER: &str = "\n\n---\n\n";

/// Clears the busy flag when dropped, so every exit path releases it.
struct BusyGuard<'a, M> {
    app: &'a AppState<M>,
}

impl<'a, M> BusyGuard<'a, M> {
    fn acquire(app: &'a AppState<M>, session: &mut Session) -> Self {
        session.busy = true;
        Self { app }
    }
}

impl<M> Drop for BusyGuard<'_, M> {
    fn drop(&mut self) {
        self.app.session().busy = false;
    }
}

pub fn get_messages<M>(app: &AppState<M>) -> Vec<Message> {
    app.messages()
}

/// Posts a user question and, once the backend settles, the bot's reply.
/// Returns the bot message that was appended.
pub async fn send_message<M>(app: &AppState<M>, text: String) -> Result<Message, CommandError>
where
    M: GenerativeModel + 'static,
{
    if text.trim().is_empty() {
        return Err(CommandError::EmptyQuestion);
    }

    // 1. Record the question and snapshot the selection (no await inside)
    let (sources, _busy) = {
        let mut session = app.session();
        if session.busy {
            return Err(CommandError::Busy);
        }
        session.messages.push(Message::new(Sender::User, text.clone()));

        if !session.library.primary_model_active() {
            let reply = Message::new(Sender::Bot, MODEL_INACTIVE_MESSAGE);
            session.messages.push(reply.clone());
            return Ok(reply);
        }

        let guard = BusyGuard::acquire(app, &mut session);
        (session.library.selected_sources(), guard)
    }; // lock released here

    // 2. The single suspend point: one grounded request on its own task
    let requester = Arc::clone(&app.requester);
    let reply_text = match tokio::spawn(async move { requester.respond(&text, &sources).await }).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(error = %e, "grounded request task did not complete");
            SEND_FAILED_MESSAGE.to_string()
        }
    };

    // 3. Append the reply; `_busy` drops after this and clears the flag
    let reply = Message::new(Sender::Bot, reply_text);
    app.session().messages.push(reply.clone());
    Ok(reply)
}

/// Plain-text transcript of `messages`, or `None` when there is nothing to export.
pub fn transcript(messages: &[Message]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }
    let blocks: Vec<String> = messages
        .iter()
        .map(|msg| {
            format!(
                "[{}] {}\n{}",
                msg.sender.as_str().to_uppercase(),
                msg.sent_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                msg.text
            )
        })
        .collect();
    Some(blocks.join(TRANSCRIPT_DELIMITER))
}

pub fn export_transcript<M>(app: &AppState<M>) -> Option<String> {
    transcript(&app.messages())
}

/// Writes the transcript to `chatbot-session-<date>.txt` in `dir`. Nothing is
/// written for an empty log.
pub async fn export_chat<M>(app: &AppState<M>, dir: &Path) -> Result<Option<PathBuf>, CommandError> {
    let Some(content) = export_transcript(app) else {
        return Ok(None);
    };
    let path = dir.join(format!(
        "chatbot-session-{}.txt",
        Local::now().format("%Y-%m-%d")
    ));
    tokio::fs::write(&path, content).await?;
    tracing::info!(path = %path.display(), "chat transcript exported");
    Ok(Some(path))
}
