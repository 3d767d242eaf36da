// Repository trait for form session storage
use crate::domain::form::FormController;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One browser page's calculator form.
#[derive(Debug, Clone)]
pub struct FormSession {
    pub id: Uuid,
    pub form: FormController,
    pub created_at: DateTime<Utc>,
    /// Last time the form was changed; sessions idle for too long are dropped.
    pub last_active: DateTime<Utc>,
}

impl FormSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            form: FormController::new(),
            created_at: now,
            last_active: now,
        }
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a newly opened session, dropping sessions that have expired
    async fn insert(&self, session: FormSession) -> anyhow::Result<()>;

    /// Fetch a copy of a session
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<FormSession>>;

    /// Apply `apply` to the stored session atomically and return the updated copy.
    /// Returns `None` if no session has this id.
    async fn update(
        &self,
        id: Uuid,
        apply: &mut (dyn for<'s> FnMut(&'s mut FormSession) + Send),
    ) -> anyhow::Result<Option<FormSession>>;
}
