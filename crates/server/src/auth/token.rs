use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Cookie, HeaderMapExt};
use tracing::debug;

use crate::error::{RequestError, SessionError, ValidationError};
use crate::models::user::{UserId, UserRole};
use crate::server::state::AppState;

/// Session cookies set by the identity provider, plain and `__Secure-` prefixed.
pub const SESSION_COOKIES: [&str; 2] = [
    "better-auth.session_token",
    "__Secure-better-auth.session_token",
];

/// Any signed-in user.
#[derive(Debug)]
pub struct Claims {
    pub user_id: UserId,
}

/// A signed-in user whose role is `admin`.
#[derive(Debug)]
pub struct AdminClaims {
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(|| {
            debug!("request carries no session token");
            SessionError::BadToken
        })?;
        let user_id = state.db_connection.resolve_session(&token).await?;
        Ok(Claims { user_id })
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminClaims {
    type Rejection = RequestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Claims { user_id } = Claims::from_request_parts(parts, state).await?;
        let role = state.db_connection.get_user_role(&user_id).await?;
        if role != UserRole::Admin {
            debug!("user {user_id} with role {role} denied admin action");
            return Err(ValidationError::InsufficientPermissions {
                required: UserRole::Admin,
                current: role,
            }
            .into());
        }
        Ok(AdminClaims { user_id })
    }
}

/// Bearer token first, then the session cookies.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    let cookies = headers.typed_get::<Cookie>()?;
    SESSION_COOKIES
        .iter()
        .find_map(|name| cookies.get(name))
        .and_then(token_from_cookie_value)
}

/// Cookie values are `<token>.<signature>`, possibly percent-encoded.
pub fn token_from_cookie_value(value: &str) -> Option<String> {
    let decoded = urlencoding::decode(value).ok()?;
    let token = decoded.split('.').next().unwrap_or_default().trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn strips_cookie_signature() {
        assert_eq!(
            token_from_cookie_value("abc123.c2lnbmF0dXJl").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            token_from_cookie_value("abc123%2Esig%3D").as_deref(),
            Some("abc123")
        );
        assert_eq!(token_from_cookie_value(".sig"), None);
    }

    #[test]
    fn bearer_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("better-auth.session_token=from-cookie.sig"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn reads_secure_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; __Secure-better-auth.session_token=tok.sig"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn no_credentials_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
