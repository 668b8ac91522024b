use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    app::Ack,
    applications::{
        dto::{
            ApplicationListResponse, ApplicationResponse, CreateApplicationRequest,
            UpdateApplicationRequest,
        },
        services::{validate_create, validate_update},
    },
    auth::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(list_applications).post(create_application),
        )
        .route("/applications/", patch(missing_id).delete(missing_id))
        .route(
            "/applications/:id",
            patch(update_application).delete(delete_application),
        )
}

/// `/applications/` with an empty id segment never matches `/:id`.
async fn missing_id(AuthUser(_): AuthUser) -> AppResult<Json<Ack>> {
    Err(AppError::validation("Missing id"))
}

/// Blank ids are a malformed request; ids that cannot be UUIDs cannot exist.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation("Missing id"));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

#[instrument(skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ApplicationListResponse>> {
    let applications = state.applications.list(user_id).await?;
    Ok(Json(ApplicationListResponse { applications }))
}

#[instrument(skip(state, payload))]
pub async fn create_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApplicationResponse>)> {
    let Json(payload) = payload?;
    let new = validate_create(payload)?;
    let application = state.applications.create(user_id, new).await?;
    info!(%user_id, id = %application.id, "application created");
    Ok((StatusCode::CREATED, Json(ApplicationResponse { application })))
}

#[instrument(skip(state, payload))]
pub async fn update_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    raw_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateApplicationRequest>, JsonRejection>,
) -> AppResult<Json<ApplicationResponse>> {
    let Path(raw_id) = raw_id?;
    let id = parse_id(&raw_id)?;
    let Json(payload) = payload?;
    let patch = validate_update(payload)?;

    state
        .applications
        .find_owned(id, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let application = state
        .applications
        .update(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(%user_id, %id, status = %application.status, "application updated");
    Ok(Json(ApplicationResponse { application }))
}

#[instrument(skip(state))]
pub async fn delete_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    raw_id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Ack>> {
    let Path(raw_id) = raw_id?;
    let id = parse_id(&raw_id)?;

    state
        .applications
        .find_owned(id, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.applications.delete(id).await?;
    info!(%user_id, %id, "application deleted");
    Ok(Json(Ack::ok()))
}
