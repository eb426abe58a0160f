use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{
    claims::Claims,
    jwt::JwtKeys,
    password::{check_password, hash_password},
    repo::{CreateUserError, UserStore},
    repo_types::User,
};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(e) => AppError::Internal(e),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// Usernames travel inside basic credentials, which split on the first colon.
pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[^:]+$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub async fn register(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::bad_request("username and password are required"));
    }
    if !is_valid_username(username) {
        warn!(username, "invalid username");
        return Err(AppError::bad_request("username must not contain ':'"));
    }

    let hash = hash_password(password)?;
    match users.create(username, &hash).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(CreateUserError::UsernameTaken) => {
            warn!(username, "username already registered");
            Err(AppError::Conflict("user existed.".into()))
        }
        Err(CreateUserError::Other(e)) => Err(AppError::Internal(e)),
    }
}

pub async fn authenticate(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let Some(user) = users.find_by_username(username).await? else {
        warn!(username, "login unknown username");
        return Err(AuthError::InvalidCredentials);
    };
    check_password(&user, password)?;
    Ok(user)
}

pub fn issue_token(keys: &JwtKeys, user: &User) -> anyhow::Result<String> {
    keys.sign(user.id, &user.username)
}

/// Signature and expiry check against `now`. A token is still valid at
/// exactly `exp`.
pub fn check_token_at(
    keys: &JwtKeys,
    token: &str,
    now: OffsetDateTime,
) -> Result<Claims, AuthError> {
    let claims = keys.decode(token).map_err(|e| {
        debug!(error = %e, "jwt rejected");
        AuthError::InvalidToken
    })?;
    if now.unix_timestamp() > claims.exp {
        return Err(AuthError::TokenExpired);
    }
    Ok(claims)
}

pub async fn validate_token(
    keys: &JwtKeys,
    users: &dyn UserStore,
    token: &str,
) -> Result<User, AuthError> {
    validate_token_at(keys, users, token, OffsetDateTime::now_utc()).await
}

pub async fn validate_token_at(
    keys: &JwtKeys,
    users: &dyn UserStore,
    token: &str,
    now: OffsetDateTime,
) -> Result<User, AuthError> {
    let claims = check_token_at(keys, token, now)?;
    users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)
}
