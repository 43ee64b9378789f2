//! HTTP handlers

use super::AppState;
use crate::core::{Client, ClientProfile, DashboardStats, EnrollOutcome, NewClient, NewProgram, Program};
use crate::domain::model::{EnrollmentRequest, EnrollmentResponse};
use crate::utils::error::RegistryError;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// Maps registry errors onto status codes and JSON bodies.
pub struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            RegistryError::ValidationError { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "field": field, "message": message })),
            )
                .into_response(),
            err @ RegistryError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": err.user_friendly_message() })),
            )
                .into_response(),
            err => {
                tracing::error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Unwraps a JSON body, reporting malformed payloads as validation errors.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(RegistryError::validation("body", rejection.body_text()).into())
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct ClientQuery {
    search: Option<String>,
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> ApiResult<Json<Vec<Client>>> {
    let clients = match query.search {
        Some(search) => state.registry.search_clients(&search).await?,
        None => state.registry.list_clients().await?,
    };
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ClientProfile>> {
    match state.registry.get_client(&id).await? {
        Some(profile) => Ok(Json(profile)),
        None => Err(RegistryError::NotFound {
            entity: "Client".to_string(),
            id,
        }
        .into()),
    }
}

pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let input = json_body(payload)?;
    let client = state.registry.create_client(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_programs(State(state): State<AppState>) -> ApiResult<Json<Vec<Program>>> {
    Ok(Json(state.registry.list_programs().await?))
}

pub async fn create_program(
    State(state): State<AppState>,
    payload: Result<Json<NewProgram>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Program>)> {
    let input = json_body(payload)?;
    let program = state.registry.create_program(input).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

pub async fn clients_in_program(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(state.registry.clients_in_program(&id).await?))
}

pub async fn enroll(
    State(state): State<AppState>,
    payload: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EnrollmentResponse>)> {
    let req = json_body(payload)?;
    let outcome = state
        .registry
        .enroll_client(&req.client_id, &req.program_id)
        .await?;

    let status = match outcome {
        EnrollOutcome::Enrolled(_) => StatusCode::CREATED,
        EnrollOutcome::AlreadyEnrolled => StatusCode::CONFLICT,
        EnrollOutcome::NotFound(_) => StatusCode::NOT_FOUND,
    };
    Ok((status, Json(EnrollmentResponse::from(&outcome))))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.registry.dashboard_stats().await?))
}
