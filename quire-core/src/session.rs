//! Session context: who is signed in and what is being edited

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Snapshot of a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Access token for the remote content store
    pub token: Option<String>,

    /// When the token was set
    pub connected_at: Option<DateTime<Utc>>,

    /// Book currently open in the editor
    pub current_book: Option<String>,

    /// Chapter currently being edited within `current_book`
    pub current_chapter: Option<String>,
}

/// Shared session state, created at start-up and cleared on disconnect
#[derive(Debug, Default)]
pub struct SessionContext {
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that is already connected with `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                token: Some(token.into()),
                connected_at: Some(Utc::now()),
                ..SessionState::default()
            }),
        }
    }

    pub async fn connect(&self, token: impl Into<String>) {
        let mut state = self.state.write().await;
        state.token = Some(token.into());
        state.connected_at = Some(Utc::now());
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Open a book; the chapter selection is reset
    pub async fn select_book(&self, book_id: Option<String>) {
        let mut state = self.state.write().await;
        if state.current_book != book_id {
            state.current_chapter = None;
        }
        state.current_book = book_id;
    }

    pub async fn select_chapter(&self, chapter_id: Option<String>) {
        self.state.write().await.current_chapter = chapter_id;
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Forget the token and every selection
    pub async fn clear(&self) {
        *self.state.write().await = SessionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_clear() {
        let session = SessionContext::new();
        assert!(!session.is_connected().await);

        session.connect("ghp_secret").await;
        session.select_book(Some("b1".to_string())).await;
        assert_eq!(session.token().await.as_deref(), Some("ghp_secret"));

        session.clear().await;
        assert_eq!(session.snapshot().await, SessionState::default());
    }

    #[tokio::test]
    async fn test_switching_book_resets_chapter() {
        let session = SessionContext::with_token("t");
        session.select_book(Some("b1".to_string())).await;
        session.select_chapter(Some("c1".to_string())).await;

        session.select_book(Some("b1".to_string())).await;
        assert_eq!(session.snapshot().await.current_chapter.as_deref(), Some("c1"));

        session.select_book(Some("b2".to_string())).await;
        assert!(session.snapshot().await.current_chapter.is_none());
    }
}
