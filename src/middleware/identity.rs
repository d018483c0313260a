//! Caller identity from the authenticating reverse proxy.
//!
//! Sessions are handled upstream. The proxy forwards the authenticated
//! subject in a single trusted header (`auth.identity_header`, default
//! `X-User-Id`); this service must only be reachable through that proxy.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{AppState, middleware::RequestId, routes::ApiError};

/// The authenticated user, inserted as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject identifier issued by the auth provider
    pub user_id: String,
}

/// Read the identity header. Missing, non-UTF-8, or blank values yield `None`.
fn extract_identity(headers: &HeaderMap, header_name: &str) -> Option<Identity> {
    let user_id = headers.get(header_name)?.to_str().ok()?.trim();
    if user_id.is_empty() {
        return None;
    }
    Some(Identity {
        user_id: user_id.to_string(),
    })
}

/// Middleware that requires a user identity on every request it wraps.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_name = &state.config.auth.identity_header;

    let Some(identity) = extract_identity(req.headers(), header_name) else {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|r| r.as_str().to_string());
        tracing::debug!(
            request_id = ?request_id,
            identity_header = %header_name,
            "Request without user identity"
        );
        return Err(ApiError::Unauthorized(
            "Authentication required".to_string(),
        ));
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_identity() {
        let identity = extract_identity(&headers("user-42"), "X-User-Id").unwrap();
        assert_eq!(identity.user_id, "user-42");
    }

    #[test]
    fn test_extract_identity_trims() {
        let identity = extract_identity(&headers("  user-42 "), "X-User-Id").unwrap();
        assert_eq!(identity.user_id, "user-42");
    }

    #[test]
    fn test_blank_identity_rejected() {
        assert!(extract_identity(&headers("   "), "X-User-Id").is_none());
    }

    #[test]
    fn test_missing_identity_rejected() {
        assert!(extract_identity(&HeaderMap::new(), "X-User-Id").is_none());
        assert!(extract_identity(&headers("user-42"), "X-Forwarded-User").is_none());
    }
}
