// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminAccess, RequireRole},
    models::listing::ListingKind,
};

fn listing_kind(collection: &str) -> Result<ListingKind, AppError> {
    ListingKind::from_collection(collection).ok_or(AppError::NotFound("listing collection"))
}

#[utoipa::path(
    post,
    path = "/api/admin/{collection}/{id}/approve",
    tag = "Admin",
    params(
        ("collection" = String, Path, description = "properties, venues or kitchens"),
        ("id" = Uuid, Path, description = "Listing id")
    ),
    responses(
        (status = 204, description = "Listing approved and visible"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "No such listing")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_listing(
    State(app_state): State<AppState>,
    access: RequireRole<AdminAccess>,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let kind = listing_kind(&collection)?;
    app_state.listing_service.set_approval(kind, id, true).await?;
    tracing::info!(admin_id = %access.user.id, listing_id = %id, "approved by admin");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/{collection}/{id}/deactivate",
    tag = "Admin",
    params(
        ("collection" = String, Path, description = "properties, venues or kitchens"),
        ("id" = Uuid, Path, description = "Listing id")
    ),
    responses(
        (status = 204, description = "Listing hidden from end users"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "No such listing")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_listing(
    State(app_state): State<AppState>,
    access: RequireRole<AdminAccess>,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let kind = listing_kind(&collection)?;
    app_state.listing_service.deactivate(kind, id).await?;
    tracing::info!(admin_id = %access.user.id, listing_id = %id, "deactivated by admin");
    Ok(StatusCode::NO_CONTENT)
}
