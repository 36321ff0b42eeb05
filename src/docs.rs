// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;
use crate::wizard;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::callback,

        // --- Listings ---
        handlers::listings::create_property,
        handlers::listings::create_venue,
        handlers::listings::create_kitchen,
        handlers::upload::upload_image,

        // --- Wizard ---
        handlers::wizard::start_wizard,
        handlers::wizard::get_wizard,
        handlers::wizard::update_draft,
        handlers::wizard::apply_action,
        handlers::wizard::touch_field,
        handlers::wizard::advance,
        handlers::wizard::retreat,
        handlers::wizard::submit,
        handlers::wizard::discard,

        // --- Dashboard ---
        handlers::dashboard::dashboard_home,
        handlers::dashboard::user_dashboard,
        handlers::dashboard::browse_properties,
        handlers::dashboard::property_detail,
        handlers::dashboard::browse_venues,
        handlers::dashboard::vendor_dashboard,
        handlers::dashboard::list_property_options,
        handlers::dashboard::list_success,
        handlers::dashboard::admin_dashboard,

        // --- Admin ---
        handlers::admin::approve_listing,
        handlers::admin::deactivate_listing,

        handlers::health::health,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::SessionUser,
            models::auth::SignUpPayload,
            models::auth::SignInPayload,
            models::auth::AuthResponse,

            // --- Listings ---
            models::listing::ListingKind,
            models::listing::IdDocumentType,
            models::property::PropertyType,
            models::property::PlaceType,
            models::property::ListingStatus,
            models::property::Property,
            models::property::VendorContact,
            models::venue::Venue,
            models::venue::VenuePackage,
            models::venue::VenueWithPackages,
            models::kitchen::PriceRange,
            models::kitchen::Kitchen,
            models::kitchen::MenuItem,
            models::kitchen::KitchenWithMenu,
            services::upload_service::UploadedFile,
            handlers::upload::ImageUploadForm,

            // --- Activity ---
            models::booking::OrderStatus,
            models::booking::Booking,
            models::booking::Order,
            models::booking::OrderItem,
            models::booking::OrderWithItems,

            // --- Dashboard ---
            models::dashboard::UserDashboard,
            models::dashboard::ListingStats,
            models::dashboard::VendorDashboard,
            models::dashboard::AdminDashboard,
            models::dashboard::PropertyDetail,
            models::dashboard::ListingTypeOption,
            models::dashboard::ListSuccess,

            // --- Wizard ---
            wizard::LocationFields,
            wizard::OwnerVerification,
            wizard::PackageDraft,
            wizard::MenuItemDraft,
            wizard::TagField,
            wizard::DraftAction,
            wizard::PropertyDraft,
            wizard::VenueDraft,
            wizard::KitchenDraft,
            wizard::SubmitOutcome,
            wizard::WizardView,
            wizard::RetreatOutcome,
            wizard::SubmitResult,
            handlers::wizard::StartWizardPayload,
            handlers::wizard::TouchPayload,
            handlers::wizard::StepResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Sign-up, sign-in and session"),
        (name = "Listings", description = "Listing creation for vendors"),
        (name = "Uploads", description = "Listing photos"),
        (name = "Wizard", description = "Step-by-step listing forms"),
        (name = "Dashboard", description = "Role dashboards and browsing"),
        (name = "Admin", description = "Listing moderation"),
        (name = "Health", description = "Liveness")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
