use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRef, Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{RegisterRequest, TokenResponse, UsernameResponse},
        extractors::BasicUser,
        jwt::JwtKeys,
        services::{issue_token, register},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(login))
        .route("/tokens", post(create_token))
}

#[instrument(skip(state, id))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<UsernameResponse>> {
    // Ids are numeric; anything else cannot name a user.
    let Path(id) = id.map_err(|_| AppError::NotFound("user not found".into()))?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    Ok(Json(UsernameResponse {
        username: user.username,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, &'static str)> {
    let Json(payload) = payload?;
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    register(state.users.as_ref(), &username, &password).await?;
    Ok((StatusCode::CREATED, "create success"))
}

#[instrument(skip_all)]
pub async fn login(BasicUser(user): BasicUser) -> Json<UsernameResponse> {
    info!(user_id = user.id, "user logged in");
    Json(UsernameResponse {
        username: user.username,
    })
}

#[instrument(skip_all)]
pub async fn create_token(
    State(state): State<AppState>,
    BasicUser(user): BasicUser,
) -> AppResult<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let token = issue_token(&keys, &user)?;
    info!(user_id = user.id, "token issued");
    Ok(Json(TokenResponse { token }))
}
