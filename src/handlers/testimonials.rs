//! Public testimonials: newest-first listing and unauthenticated append.
//! There is deliberately no moderation gate here; see DESIGN.md.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::db::Testimonial;
use crate::error::FountainError;
use crate::router::FountainState;

/// GET /api/testimonials — public, newest-first.
pub async fn list_testimonials(
    State(state): State<FountainState>,
) -> Result<Json<Vec<Testimonial>>, FountainError> {
    Ok(Json(state.storage.list_testimonials().await?))
}

#[derive(Debug, Deserialize)]
pub struct TestimonialRequest {
    pub author: Option<String>,
    pub relation: Option<String>,
    pub text: Option<String>,
}

/// POST /api/testimonials — public; all three fields required non-empty.
pub async fn submit_testimonial(
    State(state): State<FountainState>,
    Json(req): Json<TestimonialRequest>,
) -> Result<(StatusCode, Json<Testimonial>), FountainError> {
    let author = req.author.as_deref().map(str::trim).unwrap_or_default();
    let relation = req.relation.as_deref().map(str::trim).unwrap_or_default();
    let text = req.text.as_deref().map(str::trim).unwrap_or_default();
    if author.is_empty() || relation.is_empty() || text.is_empty() {
        return Err(FountainError::validation(
            "author, relation and text are all required",
        ));
    }

    let testimonial = state
        .storage
        .insert_testimonial(author, relation, text)
        .await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}
