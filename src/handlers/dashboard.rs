// src/handlers/dashboard.rs

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminAccess, RequireRole, VendorAccess},
    },
    models::{
        dashboard::{
            AdminDashboard, ListSuccess, ListingTypeOption, PropertyDetail, UserDashboard, VendorDashboard,
        },
        filter::PropertyFilter,
        listing::{ListingKind, Priced},
        property::Property,
        venue::VenueWithPackages,
    },
    wizard::{KitchenDraft, ListingDraft, PropertyDraft, VenueDraft},
};

/// `/dashboard` on its own sends each role to its home.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses((status = 303, description = "Role dashboard")),
    security(("api_jwt" = []))
)]
pub async fn dashboard_home(AuthenticatedUser(user): AuthenticatedUser) -> Redirect {
    Redirect::to(&user.role.dashboard_path())
}

#[utoipa::path(
    get,
    path = "/dashboard/user",
    tag = "Dashboard",
    responses((status = 200, description = "Greeting and recent activity", body = UserDashboard)),
    security(("api_jwt" = []))
)]
pub async fn user_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<UserDashboard>, AppError> {
    Ok(Json(app_state.dashboard_service.user_dashboard(&user).await?))
}

#[utoipa::path(
    get,
    path = "/dashboard/user/properties",
    tag = "Dashboard",
    params(PropertyFilter),
    responses(
        (status = 200, description = "Approved, active properties matching the filters", body = Vec<Property>),
        (status = 400, description = "Invalid filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn browse_properties(
    State(app_state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
) -> Result<Json<Vec<Priced<Property>>>, AppError> {
    Ok(Json(app_state.dashboard_service.browse_properties(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/dashboard/user/properties/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property with vendor contact", body = PropertyDetail),
        (status = 404, description = "Missing, unapproved or inactive")
    ),
    security(("api_jwt" = []))
)]
pub async fn property_detail(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyDetail>, AppError> {
    Ok(Json(app_state.dashboard_service.property_detail(id).await?))
}

#[utoipa::path(
    get,
    path = "/dashboard/user/venues",
    tag = "Dashboard",
    responses((status = 200, description = "Approved, active venues", body = Vec<VenueWithPackages>)),
    security(("api_jwt" = []))
)]
pub async fn browse_venues(State(app_state): State<AppState>) -> Result<Json<Vec<VenueWithPackages>>, AppError> {
    Ok(Json(app_state.dashboard_service.browse_venues().await?))
}

#[utoipa::path(
    get,
    path = "/dashboard/vendor",
    tag = "Dashboard",
    responses((status = 200, description = "Own listings with counters", body = VendorDashboard)),
    security(("api_jwt" = []))
)]
pub async fn vendor_dashboard(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
) -> Result<Json<VendorDashboard>, AppError> {
    Ok(Json(app_state.dashboard_service.vendor_dashboard(access.user.id).await?))
}

fn wizard_steps(kind: ListingKind) -> &'static [&'static str] {
    match kind {
        ListingKind::Flat => PropertyDraft::STEPS,
        ListingKind::Garden => VenueDraft::STEPS,
        ListingKind::Restaurant => KitchenDraft::STEPS,
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/vendor/list-property",
    tag = "Dashboard",
    responses((status = 200, description = "Listing types a vendor can start", body = Vec<ListingTypeOption>)),
    security(("api_jwt" = []))
)]
pub async fn list_property_options(_access: RequireRole<VendorAccess>) -> Json<Vec<ListingTypeOption>> {
    let options = ListingKind::ALL
        .into_iter()
        .map(|kind| ListingTypeOption {
            id: kind,
            label: kind.label(),
            description: kind.description(),
            wizard_steps: wizard_steps(kind),
        })
        .collect();
    Json(options)
}

#[utoipa::path(
    get,
    path = "/dashboard/vendor/list-success",
    tag = "Dashboard",
    responses((status = 200, description = "Confirmation after a listing was submitted", body = ListSuccess)),
    security(("api_jwt" = []))
)]
pub async fn list_success(_access: RequireRole<VendorAccess>) -> Json<ListSuccess> {
    Json(ListSuccess {
        message: "Your listing has been submitted and is pending review.",
        review_window_hours: 48,
        dashboard_path: "/dashboard/vendor",
    })
}

#[utoipa::path(
    get,
    path = "/dashboard/admin",
    tag = "Dashboard",
    responses((status = 200, description = "Listings awaiting approval", body = AdminDashboard)),
    security(("api_jwt" = []))
)]
pub async fn admin_dashboard(
    State(app_state): State<AppState>,
    _access: RequireRole<AdminAccess>,
) -> Result<Json<AdminDashboard>, AppError> {
    Ok(Json(app_state.dashboard_service.admin_dashboard().await?))
}
