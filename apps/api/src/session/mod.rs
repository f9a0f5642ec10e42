//! Per-session context: the uploaded résumé and the append-only chat history.
//!
//! Sessions live in memory only. Each one sits behind its own mutex and
//! handlers hold that lock for the whole interaction, so two requests for the
//! same session never interleave.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::{ImagePart, UploadedDocument};
use crate::errors::AppError;
use crate::llm_client::{Part, Turn, TurnRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
    /// The résumé image sent with a turn. Stored but never rendered.
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub parts: Vec<Part>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, vec![Part::text(text)])
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, vec![Part::text(text)])
    }

    pub fn image(images: Vec<ImagePart>) -> Self {
        Self::new(ChatRole::Image, images.into_iter().map(Part::image).collect())
    }

    fn new(role: ChatRole, parts: Vec<Part>) -> Self {
        Self {
            role,
            parts,
            created_at: Utc::now(),
        }
    }

    /// Gemini only knows `user` and `model`; image entries travel as user content.
    pub fn to_turn(&self) -> Turn {
        let role = match self.role {
            ChatRole::Model => TurnRole::Model,
            ChatRole::User | ChatRole::Image => TurnRole::User,
        };
        Turn {
            role,
            parts: self.parts.clone(),
        }
    }

    /// Text parts joined, for display.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// Everything one user accumulates while using the page.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub document: Option<UploadedDocument>,
    chat_history: Vec<ChatMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            document: None,
            chat_history: Vec::new(),
        }
    }

    /// Replaces any previously uploaded document.
    pub fn attach_document(&mut self, document: UploadedDocument) {
        self.document = Some(document);
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// The only way to grow the history. Entries are never removed.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.chat_history.push(message);
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    pub fn history_turns(&self) -> Vec<Turn> {
        self.chat_history.iter().map(ChatMessage::to_turn).collect()
    }

    /// Display lines: `You:` for user entries, `Bot:` for model entries.
    pub fn transcript(&self) -> Vec<String> {
        self.chat_history
            .iter()
            .filter_map(|m| match m.role {
                ChatRole::User => Some(format!("You: {}", m.text())),
                ChatRole::Model => Some(format!("Bot: {}", m.text())),
                ChatRole::Image => None,
            })
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

struct StoreEntry {
    session: Arc<Mutex<Session>>,
    last_active: Instant,
}

/// In-memory registry of live sessions.
///
/// Sessions idle for longer than `idle_ttl` are dropped the next time any
/// session is created or looked up.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoreEntry>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;

        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);
        sessions.insert(
            id,
            StoreEntry {
                session: Arc::new(Mutex::new(session)),
                last_active: Instant::now(),
            },
        );
        info!("Session {id} created ({} live)", sessions.len());
        id
    }

    /// Looks up a session and marks it active.
    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);

        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_active = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Session {id} ended"))
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, StoreEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active.elapsed() < self.idle_ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle session(s)");
        }
    }
}
