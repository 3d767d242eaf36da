// In-memory session repository implementation
use crate::application::session_repository::{FormSession, SessionRepository};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Sessions live in process memory; nothing is persisted. A session that has
/// not been changed for `ttl` is removed the next time a session is opened.
#[derive(Debug)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, FormSession>>,
    ttl: TimeDelta,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl InMemorySessionRepository {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    fn prune_expired(&self, sessions: &mut HashMap<Uuid, FormSession>) {
        let Some(cutoff) = Utc::now().checked_sub_signed(self.ttl) else {
            return;
        };
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active >= cutoff);

        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!("Dropped {} expired form sessions", removed);
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: FormSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        self.prune_expired(&mut sessions);
        if sessions.contains_key(&session.id) {
            anyhow::bail!("session {} already exists", session.id);
        }
        sessions.insert(session.id, session);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FormSession>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        apply: &mut (dyn for<'s> FnMut(&'s mut FormSession) + Send),
    ) -> Result<Option<FormSession>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(&id).map(|session| {
            apply(session);
            session.last_active = Utc::now();
            session.clone()
        }))
    }
}
