//! Contact-form submission (public) and the admin inquiry workflow:
//! list, forward-only status transitions, and email reply.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::db::{Inquiry, InquiryStatus};
use crate::error::FountainError;
use crate::middleware::AdminIdentity;
use crate::router::FountainState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub tour_date: Option<String>,
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub message: String,
    pub data: Inquiry,
}

/// POST /api/contact — public.
pub async fn submit_inquiry(
    State(state): State<FountainState>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), FountainError> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(FountainError::validation("name is required"));
    }
    if !is_valid_email(email) {
        return Err(FountainError::validation(
            "a syntactically valid email is required",
        ));
    }

    let inquiry = state
        .storage
        .insert_inquiry(
            name,
            email,
            req.phone.as_deref(),
            req.message.as_deref(),
            req.tour_date.as_deref(),
        )
        .await?;

    // Best-effort operator notification; logged, not sent over a transport.
    info!(
        id = inquiry.id,
        name = %inquiry.name,
        email = %inquiry.email,
        tour_date = inquiry.tour_date.as_deref().unwrap_or("<none>"),
        "new inquiry received"
    );

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            message: "Inquiry received successfully.".to_string(),
            data: inquiry,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<InquiryStatus>,
}

/// GET /api/inquiries — admin, newest-first, optional status filter.
pub async fn list_inquiries(
    _admin: AdminIdentity,
    State(state): State<FountainState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Inquiry>>, FountainError> {
    let inquiries = state.storage.list_inquiries(params.status).await?;
    Ok(Json(inquiries))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// PATCH /api/inquiries/{id}/status — admin.
///
/// Transitions only move forward (new < read < replied). Requesting the
/// current or an earlier status is an idempotent no-op that returns the
/// row unchanged, which is what makes the mark-read-on-open pattern safe
/// to call repeatedly.
pub async fn update_status(
    _admin: AdminIdentity,
    State(state): State<FountainState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Inquiry>, FountainError> {
    // Parsed by hand so an unknown status reports 400, not a decode 422.
    let requested =
        InquiryStatus::from_str(req.status.trim()).map_err(FountainError::Validation)?;

    let mut inquiry = state
        .storage
        .get_inquiry(id)
        .await?
        .ok_or(FountainError::NotFound("inquiry"))?;

    if requested > inquiry.status {
        state.storage.set_inquiry_status(id, requested).await?;
        inquiry.status = requested;
    }
    Ok(Json(inquiry))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_message: Option<String>,
}

#[derive(Serialize)]
pub struct ReplyResponse {
    pub message: String,
}

const REPLY_SUBJECT: &str = "Re: Your inquiry to Fountain of Peace";

/// POST /api/inquiries/{id}/reply — admin.
///
/// Dispatches the reply through the mailer, then transitions to `replied`
/// only if the dispatch succeeded. A failed dispatch leaves the status
/// untouched and surfaces the error; nothing is queued for retry.
pub async fn reply_to_inquiry(
    _admin: AdminIdentity,
    State(state): State<FountainState>,
    Path(id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<ReplyResponse>, FountainError> {
    let body = req
        .reply_message
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if body.is_empty() {
        return Err(FountainError::validation("replyMessage must not be empty"));
    }

    let inquiry = state
        .storage
        .get_inquiry(id)
        .await?
        .ok_or(FountainError::NotFound("inquiry"))?;

    state
        .mailer
        .send(&inquiry.email, REPLY_SUBJECT, body)
        .await?;

    if inquiry.status < InquiryStatus::Replied {
        state
            .storage
            .set_inquiry_status(id, InquiryStatus::Replied)
            .await?;
    }

    Ok(Json(ReplyResponse {
        message: "Reply sent successfully.".to_string(),
    }))
}

/// Standard address shape: one `@`, non-empty local part, dotted domain,
/// no whitespace. Intentionally permissive beyond that.
pub(crate) fn is_valid_email(s: &str) -> bool {
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane@.com"));
        assert!(!is_valid_email("jane@exam ple.com"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email("jane@example."));
    }
}
