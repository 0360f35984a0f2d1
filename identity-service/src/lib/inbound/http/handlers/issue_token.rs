use axum::extract::State;
use axum::Form;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::inbound::http::router::AppState;

/// OAuth2 password grant: the token response is returned bare, without the
/// usual response envelope, so standard OAuth2 clients can read it.
pub async fn issue_token(
    State(state): State<AppState>,
    Form(body): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access = state
        .user_service
        .login(&body.username, &body.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token: access.token,
        token_type: "bearer".to_string(),
    }))
}

/// Form body of `POST /token`; `username` carries the email.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
