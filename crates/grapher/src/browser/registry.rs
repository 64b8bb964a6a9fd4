//! Running sessions keyed by canvas id.

use crate::error::ControlError;
use grapher_core::StartupError;
use std::collections::HashMap;

/// At most one session per canvas.
#[derive(Debug)]
pub struct SessionRegistry<T> {
    sessions: HashMap<String, T>,
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<T> SessionRegistry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if `canvas_id` already has a session.
    pub fn ensure_vacant(&self, canvas_id: &str) -> Result<(), StartupError> {
        if self.sessions.contains_key(canvas_id) {
            return Err(StartupError::AlreadyRunning(canvas_id.to_string()));
        }
        Ok(())
    }

    /// Bind `session` to `canvas_id`.
    pub fn insert(&mut self, canvas_id: &str, session: T) -> Result<(), StartupError> {
        self.ensure_vacant(canvas_id)?;
        self.sessions.insert(canvas_id.to_string(), session);
        Ok(())
    }

    /// The session bound to `canvas_id`.
    pub fn get(&self, canvas_id: &str) -> Result<&T, ControlError> {
        self.sessions
            .get(canvas_id)
            .ok_or_else(|| ControlError::NotRunning(canvas_id.to_string()))
    }

    /// Unbind and return the session on `canvas_id`.
    pub fn remove(&mut self, canvas_id: &str) -> Option<T> {
        self.sessions.remove(canvas_id)
    }

    /// Number of running sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
