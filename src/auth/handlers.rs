use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    app::Ack,
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        extractors::AuthUser,
        repo_types::Identity,
        services,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Ack>)> {
    let Json(payload) = payload?;
    services::register(state.users.as_ref(), &state.passwords, payload).await?;
    Ok((StatusCode::CREATED, Json(Ack::ok())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    // A malformed body is just another failed login.
    let Ok(Json(payload)) = payload else {
        return Err(AppError::InvalidCredentials);
    };

    let identity = services::authenticate(state.users.as_ref(), &state.passwords, &payload)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let token = state.jwt.sign(identity.id)?;
    info!(user_id = %identity.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: identity,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Identity>> {
    // A valid token for a user that no longer exists is not a session.
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user.into()))
}
