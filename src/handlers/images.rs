//! Image-asset management: public category listing, admin multipart upload
//! to the external host, and admin delete by row id.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

use crate::db::ImageCategory;
use crate::error::FountainError;
use crate::middleware::AdminIdentity;
use crate::router::FountainState;

/// Matches the original client's `upload.array('images', 10)` cap.
pub const MAX_UPLOAD_FILES: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    #[serde(rename = "type")]
    pub category: Option<String>,
}

/// GET /api/images?type= — public. Returns URL strings newest-first.
pub async fn list_images(
    State(state): State<FountainState>,
    Query(query): Query<ImagesQuery>,
) -> Result<Json<Vec<String>>, FountainError> {
    let category = query
        .category
        .as_deref()
        .map(parse_category)
        .transpose()?;
    let images = state.storage.list_images(category).await?;
    Ok(Json(images.into_iter().map(|img| img.url).collect()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_paths: Vec<String>,
    #[serde(rename = "type")]
    pub category: ImageCategory,
    pub count: usize,
}

/// POST /api/upload — admin, multipart with a `type` field and `images[]`
/// file parts.
///
/// Per-file commit: each file is pushed to the host and its row written
/// before the next file starts. A failure surfaces as `StorageError` and
/// leaves earlier files of the same request committed.
pub async fn upload_images(
    _admin: AdminIdentity,
    State(state): State<FountainState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, FountainError> {
    let mut category = ImageCategory::Gallery;
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FountainError::validation(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("type") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| FountainError::validation(e.to_string()))?;
                category = parse_category(raw.trim())?;
            }
            Some("images") => {
                if files.len() >= MAX_UPLOAD_FILES {
                    return Err(FountainError::validation(format!(
                        "at most {MAX_UPLOAD_FILES} files per upload"
                    )));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FountainError::validation(e.to_string()))?;
                files.push((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(FountainError::validation("no files uploaded"));
    }

    let folder = format!("{}/{}", state.folder_prefix, category);
    let mut file_paths = Vec::with_capacity(files.len());
    for (filename, bytes) in files {
        let stored = state.store.upload(bytes, &filename, &folder).await?;
        state
            .storage
            .insert_image(&stored.url, Some(&stored.public_id), category)
            .await?;
        file_paths.push(stored.url);
    }

    info!(count = file_paths.len(), category = %category, "uploaded images");
    let count = file_paths.len();
    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        file_paths,
        category,
        count,
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// DELETE /api/images/{id} — admin.
///
/// Takes the row's exact id (the old substring match against URL or
/// deletion handle could select the wrong row). An id with no matching
/// asset is treated as already deleted. The external destroy is
/// best-effort: a failure there is logged and the row still goes away.
pub async fn delete_image(
    _admin: AdminIdentity,
    State(state): State<FountainState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, FountainError> {
    let Some(image) = state.storage.get_image(id).await? else {
        return Ok(Json(DeleteResponse {
            message: "Image already deleted/not found".to_string(),
        }));
    };

    if let Some(public_id) = image.public_id.as_deref() {
        if let Err(e) = state.store.delete(public_id).await {
            warn!(public_id = %public_id, error = %e, "external image delete failed");
        }
    }

    state.storage.delete_image(id).await?;
    Ok(Json(DeleteResponse {
        message: "Image deleted successfully".to_string(),
    }))
}

fn parse_category(raw: &str) -> Result<ImageCategory, FountainError> {
    ImageCategory::from_str(raw).map_err(FountainError::Validation)
}
