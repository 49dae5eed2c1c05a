use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::session::ChallengeSession;

#[derive(Debug, Error)]
#[error("Session limit reached ({capacity} active sessions)")]
pub struct SessionLimitReached {
    pub capacity: usize,
}

const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(100);

/// Live sessions keyed by id. Each session sits behind its own mutex, so one
/// query is in flight per session while different sessions run independently.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<ChallengeSession>>>>,
    capacity: usize,
    /// Sessions untouched for this long are closed. `None` keeps them until
    /// they are deleted.
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(capacity: usize, idle_ttl: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
            idle_ttl,
        }
    }

    /// Takes ownership of `session`. A full store first expires idle
    /// sessions; if still full, the session is closed and handed back as an
    /// error.
    pub async fn insert(&self, session: ChallengeSession) -> Result<Uuid, SessionLimitReached> {
        if self.len().await >= self.capacity {
            self.evict_idle().await;
        }

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.capacity {
            drop(sessions);
            session.close().await;
            return Err(SessionLimitReached {
                capacity: self.capacity,
            });
        }
        let id = session.id();
        sessions.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<ChallengeSession>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes the session and closes its database. Returns `false` when the
    /// id is unknown.
    pub async fn remove(&self, id: Uuid) -> bool {
        let Some(entry) = self.sessions.write().await.remove(&id) else {
            return false;
        };
        // A handler still holding the session finishes first; the database is
        // released when the last reference drops.
        if let Ok(session) = Arc::try_unwrap(entry) {
            session.into_inner().close().await;
        }
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Closes and removes every session idle for at least the store's TTL.
    /// Sessions in the middle of a submission are skipped.
    pub async fn evict_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let expired: Vec<Arc<Mutex<ChallengeSession>>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| {
                    session
                        .try_lock()
                        .map(|s| s.idle_for() >= ttl)
                        .unwrap_or(false)
                })
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        let evicted = expired.len();
        for entry in expired {
            if let Ok(session) = Arc::try_unwrap(entry) {
                session.into_inner().close().await;
            }
        }
        if evicted > 0 {
            info!(evicted, "Idle sessions expired");
        }
        evicted
    }

    /// Runs [`SessionStore::evict_idle`] periodically. Nothing is spawned
    /// when idle expiry is disabled.
    pub fn spawn_idle_sweeper(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let ttl = self.idle_ttl?;
        let period = (ttl / 2).max(MIN_SWEEP_PERIOD);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.evict_idle().await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    async fn new_session() -> ChallengeSession {
        let catalog = Catalog::builtin();
        ChallengeSession::start(catalog.get("challenge-2").unwrap(), catalog.seed(), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = SessionStore::new(4, None);
        let id = store.insert(new_session().await).await.unwrap();

        let session = store.get(id).await.expect("stored");
        assert_eq!(session.lock().await.id(), id);
        drop(session);

        assert!(store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(!store.remove(id).await);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let store = SessionStore::new(1, Some(Duration::from_secs(3600)));
        store.insert(new_session().await).await.unwrap();
        let err = store.insert(new_session().await).await.unwrap_err();
        assert_eq!(err.capacity, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(4, Some(Duration::ZERO));
        store.insert(new_session().await).await.unwrap();
        store.insert(new_session().await).await.unwrap();

        assert_eq!(store.evict_idle().await, 2);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_active_sessions_survive_eviction() {
        let store = SessionStore::new(4, Some(Duration::from_secs(3600)));
        store.insert(new_session().await).await.unwrap();
        assert_eq!(store.evict_idle().await, 0);

        let never = SessionStore::new(4, None);
        never.insert(new_session().await).await.unwrap();
        assert_eq!(never.evict_idle().await, 0);
        assert_eq!(never.len().await, 1);
    }

    #[tokio::test]
    async fn test_busy_session_is_not_evicted() {
        let store = SessionStore::new(4, Some(Duration::ZERO));
        let id = store.insert(new_session().await).await.unwrap();

        let session = store.get(id).await.unwrap();
        let guard = session.lock().await;
        assert_eq!(store.evict_idle().await, 0);
        drop(guard);
        drop(session);

        assert_eq!(store.evict_idle().await, 1);
    }

    #[tokio::test]
    async fn test_full_store_reclaims_idle_slot() {
        let store = SessionStore::new(1, Some(Duration::ZERO));
        let first = store.insert(new_session().await).await.unwrap();
        let second = store.insert(new_session().await).await.unwrap();

        assert_ne!(first, second);
        assert!(store.get(first).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_expires_abandoned_sessions() {
        let store = Arc::new(SessionStore::new(4, Some(Duration::from_millis(50))));
        store.insert(new_session().await).await.unwrap();

        let sweeper = Arc::clone(&store).spawn_idle_sweeper().expect("expiry enabled");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.len().await, 0);
        sweeper.abort();

        assert!(Arc::new(SessionStore::new(1, None)).spawn_idle_sweeper().is_none());
    }
}
