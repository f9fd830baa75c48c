use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::grounding::GroundedRequester;
use crate::store::models::{Message, Sender};
use crate::store::LibraryStore;

pub const WELCOME_MESSAGE: &str = "Hello! I am a chatbot that answers questions based on the sources you provide.\n\nسلام! من یک ربات گفتگو هستم که به سوالات شما بر اساس منابعی که ارائه می‌دهید پاسخ می‌دهم.";

/// Everything the UI mutates during a session.
#[derive(Debug)]
pub struct Session {
    pub library: LibraryStore,
    pub messages: Vec<Message>,
    pub busy: bool,
}

impl Session {
    pub fn new(library: LibraryStore) -> Self {
        Self {
            library,
            messages: vec![Message::new(Sender::Bot, WELCOME_MESSAGE)],
            busy: false,
        }
    }
}

/// Owned by the host for the lifetime of the app; every command goes through it.
pub struct AppState<M> {
    session: Mutex<Session>,
    pub(crate) requester: Arc<GroundedRequester<M>>,
    pub config: AppConfig,
}

impl<M> AppState<M> {
    pub fn new(config: AppConfig, requester: GroundedRequester<M>, session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            requester: Arc::new(requester),
            config,
        }
    }

    /// Short synchronous access. Never hold the guard across an `.await`.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.session.lock().busy
    }

    pub fn messages(&self) -> Vec<Message> {
        self.session.lock().messages.clone()
    }
}
