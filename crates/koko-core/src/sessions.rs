//! Session-keyed conversation store.
//!
//! Conversations are keyed by a `SessionId` behind a store lock. Requests
//! without a session id share a single default session, so the existing
//! frontend keeps one shared transcript while concurrent appends stay
//! serialized.

use crate::Conversation;
use crate::error::KokoCoreError;
use koko_protocol::{Message, Role, SessionId};
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Conversation storage keyed by session id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Conversation>>>,
    default_id: SessionId,
    system_prompt: String,
    max_messages: usize,
}

impl SessionStore {
    /// Create a store seeded with the default shared session.
    pub fn new(system_prompt: impl Into<String>, max_messages: usize) -> Self {
        let system_prompt = system_prompt.into();
        let default_id = Uuid::new_v4();
        let mut sessions = HashMap::new();
        sessions.insert(default_id, Conversation::new(&system_prompt, max_messages));
        info!("created session store (default_session_id={})", default_id);
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            default_id,
            system_prompt,
            max_messages,
        }
    }

    /// Id of the default shared session.
    pub fn default_session(&self) -> SessionId {
        self.default_id
    }

    /// Resolve a requested session id, creating its conversation on first
    /// use; requests without one share the default session.
    pub fn resolve(&self, requested: Option<SessionId>) -> SessionId {
        let Some(session_id) = requested else {
            return self.default_id;
        };
        let mut sessions = self.sessions.write();
        sessions.entry(session_id).or_insert_with(|| {
            debug!("created session (session_id={})", session_id);
            Conversation::new(&self.system_prompt, self.max_messages)
        });
        session_id
    }

    /// Append a message to a session.
    pub fn append(&self, session_id: SessionId, message: Message) -> Result<(), KokoCoreError> {
        let mut sessions = self.sessions.write();
        let conversation = sessions
            .get_mut(&session_id)
            .ok_or(KokoCoreError::UnknownSession(session_id))?;
        debug!(
            "appending message (session_id={}, role={}, content_len={})",
            session_id,
            message.role.as_str(),
            message.content.as_deref().map(str::len).unwrap_or(0)
        );
        conversation.push(message);
        Ok(())
    }

    /// Inject out-of-band context (a document or sheet) as a system note.
    pub fn inject_note(
        &self,
        session_id: SessionId,
        note: impl Into<String>,
    ) -> Result<(), KokoCoreError> {
        self.append(session_id, Message::text(Role::System, note))
    }

    /// Snapshot a session's transcript.
    pub fn transcript(&self, session_id: SessionId) -> Result<Vec<Message>, KokoCoreError> {
        let sessions = self.sessions.read();
        let conversation = sessions
            .get(&session_id)
            .ok_or(KokoCoreError::UnknownSession(session_id))?;
        Ok(conversation.messages().to_vec())
    }

    /// Number of messages in a session.
    pub fn message_count(&self, session_id: SessionId) -> Result<usize, KokoCoreError> {
        let sessions = self.sessions.read();
        let conversation = sessions
            .get(&session_id)
            .ok_or(KokoCoreError::UnknownSession(session_id))?;
        Ok(conversation.len())
    }
}
