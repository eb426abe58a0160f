use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64ct::{Base64, Encoding};
use tracing::warn;

use super::{
    jwt::JwtKeys,
    repo_types::User,
    services::{authenticate, validate_token},
};
use crate::{error::AppError, state::AppState};

/// User resolved from an `Authorization: Bearer <token>` header.
pub struct BearerUser(pub User);

/// User resolved from an `Authorization: Basic <base64(user:pass)>` header.
pub struct BasicUser(pub User);

/// Basic-auth failure. A 401 carries a `WWW-Authenticate: Basic` challenge.
#[derive(Debug)]
pub struct BasicRejection(pub AppError);

impl From<AppError> for BasicRejection {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BasicRejection {
    fn into_response(self) -> Response {
        let mut res = self.0.into_response();
        if res.status() == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="trainlog""#),
            );
        }
        res
    }
}

fn credentials<'a>(parts: &'a Parts, scheme: &str) -> Result<&'a str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

    match header.split_once(' ') {
        Some((given, value)) if given.eq_ignore_ascii_case(scheme) => Ok(value.trim()),
        _ => Err(AppError::Unauthorized("invalid auth scheme".into())),
    }
}

fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let raw = Base64::decode_vec(encoded).ok()?;
    let text = String::from_utf8(raw).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for BearerUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = credentials(parts, "Bearer")?;
        let keys = JwtKeys::from_ref(state);
        let user = validate_token(&keys, state.users.as_ref(), token)
            .await
            .map_err(|e| {
                warn!(error = %e, "bearer auth rejected");
                e
            })?;
        Ok(BearerUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BasicUser {
    type Rejection = BasicRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let encoded = credentials(parts, "Basic")?;
        let (username, password) = decode_basic(encoded)
            .ok_or_else(|| AppError::Unauthorized("malformed basic credentials".into()))?;
        let user = authenticate(state.users.as_ref(), &username, &password)
            .await
            .map_err(AppError::from)?;
        Ok(BasicUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_basic_splits_on_first_colon() {
        let encoded = Base64::encode_string(b"alice:pa:ss");
        assert_eq!(
            decode_basic(&encoded),
            Some(("alice".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn decode_basic_rejects_missing_colon_and_bad_base64() {
        assert_eq!(decode_basic(&Base64::encode_string(b"alice")), None);
        assert_eq!(decode_basic("%%%"), None);
    }

    #[test]
    fn basic_rejection_challenges_only_on_unauthorized() {
        let res = BasicRejection(AppError::Unauthorized("x".into())).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers()[header::WWW_AUTHENTICATE],
            r#"Basic realm="trainlog""#
        );

        let res = BasicRejection(AppError::Internal(anyhow::anyhow!("db down"))).into_response();
        assert!(res.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn credentials_scheme_is_case_insensitive() {
        let req = axum::http::Request::builder()
            .header("authorization", "bearer abc.def")
            .body(())
            .expect("request");
        let (parts, _) = req.into_parts();
        assert_eq!(credentials(&parts, "Bearer").expect("token"), "abc.def");
        assert!(credentials(&parts, "Basic").is_err());
    }
}
