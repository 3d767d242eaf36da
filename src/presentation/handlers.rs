// HTTP request handlers
use crate::application::calculator_service::{CalculationOutcome, ServiceError};
use crate::application::session_repository::FormSession;
use crate::domain::field::FieldKind;
use crate::domain::form::FieldErrors;
use crate::presentation::app_state::AppState;
use crate::presentation::page::{render_page, Footer};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::SessionNotFound(_) | ServiceError::UnknownField(_) => StatusCode::NOT_FOUND,
            ServiceError::CalculationInProgress(_) => StatusCode::CONFLICT,
            ServiceError::Repository(e) => {
                tracing::error!("Session storage error: {:#}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateForm {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub trap_speed: String,
}

/// Field state returned to the page after an edit or blur.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldResponse {
    pub field: &'static str,
    pub value: String,
    pub error: Option<String>,
    pub can_calculate: bool,
}

impl FieldResponse {
    fn from_session(session: &FormSession, kind: FieldKind) -> Self {
        let field = session.form.field(kind);
        Self {
            field: kind.id(),
            value: field.value.clone(),
            error: field.error.map(|e| e.to_string()),
            can_calculate: session.form.can_calculate(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub field: FieldKind,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub trap_speed: String,
}

#[derive(Debug, Serialize)]
pub struct EstimateErrors {
    pub errors: FieldErrors,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Open a fresh form and send the browser to it
pub async fn new_session(State(state): State<Arc<AppState>>) -> Result<Redirect, ServiceError> {
    let session = state.calculator_service.open_session().await?;
    Ok(Redirect::to(&session_path(session.id)))
}

/// Render the calculator page for a session
pub async fn show_session(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ServiceError> {
    let session = state.calculator_service.session(id).await?;
    Ok(Html(render_page(&session, &footer(&headers))))
}

/// Field text changed
pub async fn edit_field(
    Path((id, field)): Path<(Uuid, String)>,
    State(state): State<Arc<AppState>>,
    Form(edit): Form<FieldEdit>,
) -> Result<Json<FieldResponse>, ServiceError> {
    let kind = parse_field(&field)?;
    let session = state.calculator_service.edit(id, kind, edit.value).await?;
    Ok(Json(FieldResponse::from_session(&session, kind)))
}

/// Field lost focus
pub async fn blur_field(
    Path((id, field)): Path<(Uuid, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FieldResponse>, ServiceError> {
    let kind = parse_field(&field)?;
    let session = state.calculator_service.blur(id, kind).await?;
    Ok(Json(FieldResponse::from_session(&session, kind)))
}

/// Submit both fields and calculate; the page shows either the result or the errors
pub async fn calculate(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Form(form): Form<CalculateForm>,
) -> Result<Redirect, ServiceError> {
    let service = &state.calculator_service;
    service.edit(id, FieldKind::Weight, form.weight).await?;
    service.edit(id, FieldKind::TrapSpeed, form.trap_speed).await?;

    if let CalculationOutcome::Rejected(errors) = service.calculate(id).await? {
        tracing::debug!("Calculation for {} rejected: {:?}", id, errors);
    }
    Ok(Redirect::to(&session_path(id)))
}

pub async fn reset(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Redirect, ServiceError> {
    state.calculator_service.reset(id).await?;
    Ok(Redirect::to(&session_path(id)))
}

/// Stateless validation of one raw value
pub async fn validate_value(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    let response = match state
        .calculator_service
        .validate_field(request.field, &request.value)
    {
        Ok(value) => ValidateResponse {
            valid: true,
            value: Some(value),
            error: None,
        },
        Err(e) => ValidateResponse {
            valid: false,
            value: None,
            error: Some(e.to_string()),
        },
    };
    Json(response)
}

/// Stateless estimate from raw values
pub async fn estimate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EstimateRequest>,
) -> Response {
    match state
        .calculator_service
        .estimate_raw(&request.weight, &request.trap_speed)
    {
        Ok(result) => Json(result).into_response(),
        Err(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(EstimateErrors { errors })).into_response()
        }
    }
}

fn parse_field(field: &str) -> Result<FieldKind, ServiceError> {
    field
        .parse()
        .map_err(|_| ServiceError::UnknownField(field.to_string()))
}

fn session_path(id: Uuid) -> String {
    format!("/sessions/{}", id)
}

fn footer(headers: &HeaderMap) -> Footer {
    Footer {
        year: chrono::Utc::now().year(),
        host: headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}
