use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::auth::TokenService;
use crate::db::Storage;
use crate::handlers::{auth, chat, images, inquiries, testimonials};
use crate::service::chat::ChatCompleter;
use crate::service::mailer::Mailer;
use crate::service::object_store::ObjectStore;

/// Whole-request cap; comfortably above a ten-file image upload.
const BODY_LIMIT_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for all handlers. Collaborators sit behind trait objects
/// so tests can swap in doubles without the network.
#[derive(Clone)]
pub struct FountainState {
    pub storage: Storage,
    pub tokens: TokenService,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn ObjectStore>,
    pub chat: Arc<dyn ChatCompleter>,
    pub folder_prefix: Arc<str>,
}

impl FountainState {
    pub fn new(
        storage: Storage,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
        store: Arc<dyn ObjectStore>,
        chat: Arc<dyn ChatCompleter>,
        folder_prefix: &str,
    ) -> Self {
        Self {
            storage,
            tokens,
            mailer,
            store,
            chat,
            folder_prefix: Arc::from(folder_prefix),
        }
    }
}

pub fn fountain_router(state: FountainState) -> Router {
    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/images", get(images::list_images))
        .route("/api/images/{id}", delete(images::delete_image))
        .route("/api/upload", post(images::upload_images))
        .route("/api/contact", post(inquiries::submit_inquiry))
        .route("/api/inquiries", get(inquiries::list_inquiries))
        .route("/api/inquiries/{id}/status", patch(inquiries::update_status))
        .route("/api/inquiries/{id}/reply", post(inquiries::reply_to_inquiry))
        .route(
            "/api/testimonials",
            get(testimonials::list_testimonials).post(testimonials::submit_testimonial),
        )
        .route("/api/chat", post(chat::relay_chat))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// CORS for the configured front-end origins.
///
/// # Panics
///
/// Panics at startup on a malformed origin; a bad origin list is a
/// deployment error, not a runtime condition.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
