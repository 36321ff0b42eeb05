// src/handlers/upload.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, VendorAccess},
    services::upload_service::UploadedFile,
};

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Uploads",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadedFile),
        (status = 400, description = "Missing or empty file"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Not an image")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip(app_state, access, multipart), fields(user_id = %access.user.id))]
pub async fn upload_image(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_bytes = app_state.upload_service.max_bytes();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(e, max_bytes))? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;

        let uploaded = app_state
            .upload_service
            .upload_image(access.user.id, content_type.as_deref(), &bytes)
            .await?;
        return Ok((StatusCode::CREATED, Json(uploaded)));
    }

    Err(AppError::InvalidInput("multipart field 'file' is required".to_string()))
}

fn multipart_error(err: axum::extract::multipart::MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_bytes)
    } else {
        AppError::InvalidInput(err.body_text())
    }
}
