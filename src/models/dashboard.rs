// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use super::{
    booking::{Booking, OrderWithItems},
    kitchen::KitchenWithMenu,
    listing::{ListingKind, Priced},
    property::{Property, VendorContact},
    venue::VenueWithPackages,
};

// GET /dashboard/user
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    pub display_name: String,
    pub recent_bookings: Vec<Booking>,
    pub recent_orders: Vec<OrderWithItems>,
}

// Counters at the top of the vendor dashboard
#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingStats {
    pub total_listings: usize,
    pub approved: usize,
    pub pending_review: usize,
    pub venues: usize,
}

// GET /dashboard/vendor
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorDashboard {
    pub stats: ListingStats,
    #[schema(value_type = Vec<Property>)]
    pub properties: Vec<Priced<Property>>,
    pub venues: Vec<VenueWithPackages>,
    pub kitchens: Vec<KitchenWithMenu>,
}

// GET /dashboard/admin
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    #[schema(value_type = Vec<Property>)]
    pub pending_properties: Vec<Priced<Property>>,
    pub pending_venues: Vec<VenueWithPackages>,
    pub pending_kitchens: Vec<KitchenWithMenu>,
}

// GET /dashboard/user/properties/{id}
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    #[serde(flatten)]
    #[schema(value_type = Property)]
    pub property: Priced<Property>,
    pub vendor: VendorContact,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingTypeOption {
    pub id: ListingKind,
    pub label: &'static str,
    pub description: &'static str,
    #[schema(value_type = Vec<String>)]
    pub wizard_steps: &'static [&'static str],
}

// GET /dashboard/vendor/list-success
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSuccess {
    pub message: &'static str,
    pub review_window_hours: u32,
    pub dashboard_path: &'static str,
}
