use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::verify_password;
use crate::error::FountainError;
use crate::router::FountainState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/login — exchange the account credential pair for a bearer
/// token. Password comparison happens inside argon2 (constant-time).
pub async fn login(
    State(state): State<FountainState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, FountainError> {
    let account = state
        .storage
        .find_account(&req.email)
        .await?
        .ok_or(FountainError::LoginFailed("user not found"))?;

    if !verify_password(&req.password, &account.password_hash)? {
        return Err(FountainError::LoginFailed("invalid password"));
    }

    let token = state.tokens.issue(&account.email)?;
    info!(email = %account.email, "issued admin token");
    Ok(Json(LoginResponse { token }))
}
