use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use loanline_core::domain::session::{Session, SessionId};
use loanline_core::errors::ApplicationError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session backend error: {0}")]
    Backend(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// Keyed storage of conversation state. Callers serialize writes per session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;
    async fn put(&self, session: Session) -> Result<(), StoreError>;
    async fn delete(&self, id: &SessionId) -> Result<bool, StoreError>;
    async fn count(&self) -> Result<usize, StoreError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id.as_str()).cloned())
    }

    async fn put(&self, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id().as_str().to_owned(), session);
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(id.as_str()).is_some())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.sessions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use loanline_core::domain::session::{Session, SessionId};

    use crate::sessions::{InMemorySessionStore, SessionStore};

    #[tokio::test]
    async fn in_memory_session_store_round_trip() {
        let store = InMemorySessionStore::default();
        let mut session = Session::new(SessionId::new("sess-1"));
        session.push_user("I need a loan of 2 lakh");

        store.put(session.clone()).await.expect("save session");
        let found = store.get(session.id()).await.expect("find session");

        assert_eq!(found, Some(session));
        assert_eq!(store.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_session_existed() {
        let store = InMemorySessionStore::default();
        let id = SessionId::new("sess-2");
        store.put(Session::new(id.clone())).await.expect("save session");

        assert!(store.delete(&id).await.expect("delete"));
        assert!(!store.delete(&id).await.expect("second delete"));
        assert_eq!(store.get(&id).await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn distinct_sessions_do_not_interfere() {
        let store = Arc::new(InMemorySessionStore::default());
        let mut handles = Vec::new();
        for index in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut session = Session::new(SessionId::new(format!("sess-{index}")));
                session.push_user(format!("message {index}"));
                store.put(session).await.expect("save session");
            }));
        }
        for handle in handles {
            handle.await.expect("task joined");
        }

        assert_eq!(store.count().await.expect("count"), 32);
        let session = store.get(&SessionId::new("sess-7")).await.expect("lookup").expect("present");
        assert_eq!(session.user_messages().collect::<Vec<_>>(), vec!["message 7"]);
    }
}
