// Calculator service - Use cases for the horsepower form
use crate::application::session_repository::{FormSession, SessionRepository};
use crate::domain::field::{validate, FieldKind, ValidationError};
use crate::domain::form::{CalculationRejected, FieldErrors};
use crate::domain::horsepower::{estimate, CalculationResult};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("a calculation is already running for session {0}")]
    CalculationInProgress(Uuid),

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

/// What a calculate request did to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationOutcome {
    Completed(CalculationResult),
    /// Nothing was calculated; the field errors are now shown on the form.
    Rejected(FieldErrors),
    /// The form was reset while the calculation was pending; no result was stored.
    Discarded,
}

#[derive(Clone)]
pub struct CalculatorService {
    repository: Arc<dyn SessionRepository>,
    delay: Duration,
}

impl CalculatorService {
    pub fn new(repository: Arc<dyn SessionRepository>, delay: Duration) -> Self {
        Self { repository, delay }
    }

    pub async fn open_session(&self) -> Result<FormSession, ServiceError> {
        let session = FormSession::new();
        self.repository.insert(session.clone()).await?;
        tracing::info!("Opened form session {} at {}", session.id, session.created_at);
        Ok(session)
    }

    pub async fn session(&self, id: Uuid) -> Result<FormSession, ServiceError> {
        self.repository
            .get(id)
            .await?
            .ok_or(ServiceError::SessionNotFound(id))
    }

    /// Field text changed.
    pub async fn edit(
        &self,
        id: Uuid,
        field: FieldKind,
        text: String,
    ) -> Result<FormSession, ServiceError> {
        tracing::debug!("Session {}: edit {} = {:?}", id, field, text);
        let mut text = Some(text);
        self.modify(id, &mut |session: &mut FormSession| {
            if let Some(text) = text.take() {
                session.form.edit(field, text);
            }
        })
        .await
    }

    /// Field lost focus.
    pub async fn blur(&self, id: Uuid, field: FieldKind) -> Result<FormSession, ServiceError> {
        self.modify(id, &mut |session: &mut FormSession| session.form.blur(field)).await
    }

    /// Validate both fields and, if they pass, run the estimate after the
    /// configured delay. While one calculation is pending, further requests
    /// for the same session fail with `CalculationInProgress`. A reset in the
    /// meantime abandons the pending calculation.
    pub async fn calculate(&self, id: Uuid) -> Result<CalculationOutcome, ServiceError> {
        let mut started = None;
        self.modify(id, &mut |session: &mut FormSession| {
            started = Some(session.form.begin_calculation());
        })
        .await?;

        let inputs = match started {
            Some(Ok(inputs)) => inputs,
            Some(Err(CalculationRejected::Invalid(errors))) => {
                tracing::debug!("Session {}: calculation rejected: {:?}", id, errors);
                return Ok(CalculationOutcome::Rejected(errors));
            }
            Some(Err(CalculationRejected::InProgress)) => {
                tracing::warn!("Session {}: calculation already in progress", id);
                return Err(ServiceError::CalculationInProgress(id));
            }
            None => return Err(ServiceError::SessionNotFound(id)),
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut completed = None;
        self.modify(id, &mut |session: &mut FormSession| {
            completed = session.form.complete_calculation(inputs);
        })
        .await?;

        let Some(result) = completed else {
            tracing::debug!("Session {}: reset during calculation, result discarded", id);
            return Ok(CalculationOutcome::Discarded);
        };
        tracing::debug!(
            "Session {}: {} lb @ {} mph -> {} hp",
            id,
            result.weight,
            result.trap_speed,
            result.horsepower
        );
        Ok(CalculationOutcome::Completed(result))
    }

    pub async fn reset(&self, id: Uuid) -> Result<FormSession, ServiceError> {
        tracing::debug!("Session {}: reset", id);
        self.modify(id, &mut |session: &mut FormSession| session.form.reset()).await
    }

    /// Stateless single-field check.
    pub fn validate_field(&self, field: FieldKind, raw: &str) -> Result<f64, ValidationError> {
        validate(field, raw)
    }

    /// Stateless calculation from raw text, applying the same rules as the form.
    pub fn estimate_raw(
        &self,
        weight: &str,
        trap_speed: &str,
    ) -> Result<CalculationResult, FieldErrors> {
        let weight = validate(FieldKind::Weight, weight);
        let trap_speed = validate(FieldKind::TrapSpeed, trap_speed);

        match (weight, trap_speed) {
            (Ok(weight), Ok(trap_speed)) => Ok(estimate(weight, trap_speed)),
            (weight, trap_speed) => Err(FieldErrors {
                weight: weight.err(),
                trap_speed: trap_speed.err(),
            }),
        }
    }

    async fn modify(
        &self,
        id: Uuid,
        apply: &mut (dyn for<'s> FnMut(&'s mut FormSession) + Send),
    ) -> Result<FormSession, ServiceError> {
        self.repository
            .update(id, apply)
            .await?
            .ok_or(ServiceError::SessionNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{FormController, Phase};
    use crate::infrastructure::memory_repository::InMemorySessionRepository;
    use pretty_assertions::assert_eq;

    fn service(delay: Duration) -> CalculatorService {
        CalculatorService::new(Arc::new(InMemorySessionRepository::default()), delay)
    }

    #[tokio::test]
    async fn test_open_and_fetch_session() {
        let service = service(Duration::ZERO);
        let session = service.open_session().await.unwrap();

        let fetched = service.session(session.id).await.unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.form, FormController::new());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let service = service(Duration::ZERO);
        let id = Uuid::new_v4();

        assert!(matches!(
            service.calculate(id).await,
            Err(ServiceError::SessionNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            service.edit(id, FieldKind::Weight, "1".to_string()).await,
            Err(ServiceError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_calculate_flow() {
        let service = service(Duration::ZERO);
        let id = service.open_session().await.unwrap().id;

        service.edit(id, FieldKind::Weight, "3500".to_string()).await.unwrap();
        let session = service
            .edit(id, FieldKind::TrapSpeed, "115".to_string())
            .await
            .unwrap();
        assert!(session.form.can_calculate());

        let outcome = service.calculate(id).await.unwrap();
        let CalculationOutcome::Completed(result) = outcome else {
            panic!("expected a result, got {outcome:?}");
        };
        assert_eq!(result.horsepower, 415);

        let session = service.session(id).await.unwrap();
        assert_eq!(session.form.result(), Some(&result));
        assert_eq!(session.form.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_calculate_with_invalid_inputs_is_noop() {
        let service = service(Duration::ZERO);
        let id = service.open_session().await.unwrap().id;
        service.edit(id, FieldKind::Weight, "0".to_string()).await.unwrap();

        let outcome = service.calculate(id).await.unwrap();
        assert_eq!(
            outcome,
            CalculationOutcome::Rejected(FieldErrors {
                weight: Some(ValidationError::NotPositive(FieldKind::Weight)),
                trap_speed: Some(ValidationError::Required(FieldKind::TrapSpeed)),
            })
        );

        let session = service.session(id).await.unwrap();
        assert_eq!(session.form.result(), None);
        assert_eq!(
            session.form.field(FieldKind::TrapSpeed).error,
            Some(ValidationError::Required(FieldKind::TrapSpeed))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calculation_rejected() {
        let service = service(Duration::from_millis(300));
        let id = service.open_session().await.unwrap().id;
        service.edit(id, FieldKind::Weight, "3000".to_string()).await.unwrap();
        service.edit(id, FieldKind::TrapSpeed, "100".to_string()).await.unwrap();

        let running = tokio::spawn({
            let service = service.clone();
            async move { service.calculate(id).await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        let session = service.session(id).await.unwrap();
        assert_eq!(session.form.phase(), Phase::Calculating);
        assert!(matches!(
            service.calculate(id).await,
            Err(ServiceError::CalculationInProgress(_))
        ));

        let outcome = running.await.unwrap().unwrap();
        assert!(matches!(outcome, CalculationOutcome::Completed(r) if r.horsepower == 234));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_calculation_discards_result() {
        let service = service(Duration::from_millis(300));
        let id = service.open_session().await.unwrap().id;
        service.edit(id, FieldKind::Weight, "3000".to_string()).await.unwrap();
        service.edit(id, FieldKind::TrapSpeed, "100".to_string()).await.unwrap();

        let running = tokio::spawn({
            let service = service.clone();
            async move { service.calculate(id).await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert_eq!(service.session(id).await.unwrap().form.phase(), Phase::Calculating);

        service.reset(id).await.unwrap();

        let outcome = running.await.unwrap().unwrap();
        assert_eq!(outcome, CalculationOutcome::Discarded);
        let session = service.session(id).await.unwrap();
        assert_eq!(session.form, FormController::new());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calculation_after_reset_is_not_clobbered() {
        let service = service(Duration::from_millis(300));
        let id = service.open_session().await.unwrap().id;
        service.edit(id, FieldKind::Weight, "3000".to_string()).await.unwrap();
        service.edit(id, FieldKind::TrapSpeed, "100".to_string()).await.unwrap();

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.calculate(id).await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        service.reset(id).await.unwrap();

        service.edit(id, FieldKind::Weight, "3500".to_string()).await.unwrap();
        service.edit(id, FieldKind::TrapSpeed, "115".to_string()).await.unwrap();
        let second = service.calculate(id).await.unwrap();

        assert_eq!(first.await.unwrap().unwrap(), CalculationOutcome::Discarded);
        assert!(matches!(second, CalculationOutcome::Completed(r) if r.horsepower == 415));
        let session = service.session(id).await.unwrap();
        assert_eq!(session.form.result().map(|r| r.horsepower), Some(415));
        assert_eq!(session.form.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_calculation_keeps_snapshot() {
        let service = service(Duration::from_millis(300));
        let id = service.open_session().await.unwrap().id;
        service.edit(id, FieldKind::Weight, "3500".to_string()).await.unwrap();
        service.edit(id, FieldKind::TrapSpeed, "115".to_string()).await.unwrap();

        let running = tokio::spawn({
            let service = service.clone();
            async move { service.calculate(id).await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        service.edit(id, FieldKind::Weight, "1000".to_string()).await.unwrap();

        let outcome = running.await.unwrap().unwrap();
        assert!(matches!(outcome, CalculationOutcome::Completed(r) if r.weight == 3500.0));
        let session = service.session(id).await.unwrap();
        assert_eq!(session.form.field(FieldKind::Weight).value, "1000");
        assert_eq!(session.form.result().map(|r| r.horsepower), Some(415));
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let service = service(Duration::ZERO);
        let id = service.open_session().await.unwrap().id;
        service.edit(id, FieldKind::Weight, "3500".to_string()).await.unwrap();
        service.edit(id, FieldKind::TrapSpeed, "115".to_string()).await.unwrap();
        service.calculate(id).await.unwrap();

        let session = service.reset(id).await.unwrap();
        assert_eq!(session.form, FormController::new());
    }

    #[test]
    fn test_estimate_raw() {
        let service = service(Duration::ZERO);

        assert_eq!(service.estimate_raw("3000", "100").unwrap().horsepower, 234);
        assert_eq!(
            service.estimate_raw("3000", "abc").unwrap_err(),
            FieldErrors {
                weight: None,
                trap_speed: Some(ValidationError::NotANumber(FieldKind::TrapSpeed)),
            }
        );
    }
}
