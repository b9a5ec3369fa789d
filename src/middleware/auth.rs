use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::error::FountainError;
use crate::router::FountainState;

/// Verified admin identity, extracted from `Authorization: Bearer <token>`.
///
/// Protected handlers take this as an argument; extraction runs before the
/// handler body, so no side effects happen on a failed verification.
/// A missing header rejects with 401, a bad or expired token with 403.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub email: String,
}

impl FromRequestParts<FountainState> for AdminIdentity {
    type Rejection = FountainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FountainState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(FountainError::Unauthenticated)?;

        let auth = auth.trim();
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(FountainError::Unauthenticated)?;

        let claims = state.tokens.verify(token)?;
        Ok(Self { email: claims.sub })
    }
}
