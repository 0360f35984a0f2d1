use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type holding the user resolved from the bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that resolves the bearer token to an active user and adds it to
/// request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)
        .map_err(IntoResponse::into_response)?
        .to_string();

    let user = state
        .user_service
        .resolve_session(&token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Session resolution failed");
            ApiError::from(e).into_response()
        })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/users/me");
        if let Some(value) = authorization {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let req = request(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_token_from_header(&req), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_extract_missing_header() {
        let req = request(None);
        assert!(matches!(
            extract_token_from_header(&req),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_extract_wrong_scheme() {
        let req = request(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            extract_token_from_header(&req),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
