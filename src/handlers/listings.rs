// src/handlers/listings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, VendorAccess},
    models::{kitchen::KitchenWithMenu, property::Property, venue::VenueWithPackages},
    wizard::{KitchenDraft, PropertyDraft, VenueDraft},
};

#[utoipa::path(
    post,
    path = "/api/properties/flat",
    tag = "Listings",
    request_body = PropertyDraft,
    responses(
        (status = 201, description = "Property submitted for review", body = Property),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Only vendors can list"),
        (status = 422, description = "A wizard step is incomplete")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Json(draft): Json<PropertyDraft>,
) -> Result<impl IntoResponse, AppError> {
    let property = app_state.listing_service.create_property(access.user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

#[utoipa::path(
    post,
    path = "/api/properties/garden",
    tag = "Listings",
    request_body = VenueDraft,
    responses(
        (status = 201, description = "Venue submitted for review", body = VenueWithPackages),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Only vendors can list")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_venue(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Json(draft): Json<VenueDraft>,
) -> Result<impl IntoResponse, AppError> {
    let venue = app_state.listing_service.create_venue(access.user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

#[utoipa::path(
    post,
    path = "/api/kitchens",
    tag = "Listings",
    request_body = KitchenDraft,
    responses(
        (status = 201, description = "Kitchen submitted for review", body = KitchenWithMenu),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Only vendors can list")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_kitchen(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Json(draft): Json<KitchenDraft>,
) -> Result<impl IntoResponse, AppError> {
    let kitchen = app_state.listing_service.create_kitchen(access.user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(kitchen)))
}
