// src/models/listing.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The three listing verticals a vendor can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// Flat, house, villa, commercial space, PG or plot
    Flat,
    /// Marriage garden, banquet hall or event venue
    Garden,
    /// Restaurant, cloud kitchen or food service
    Restaurant,
}

impl ListingKind {
    pub const ALL: [ListingKind; 3] = [ListingKind::Flat, ListingKind::Garden, ListingKind::Restaurant];

    /// Maps the admin path segment (`properties`, `venues`, `kitchens`).
    pub fn from_collection(segment: &str) -> Option<Self> {
        match segment {
            "properties" => Some(ListingKind::Flat),
            "venues" => Some(ListingKind::Garden),
            "kitchens" => Some(ListingKind::Restaurant),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Flat => "Property",
            ListingKind::Garden => "Marriage Garden",
            ListingKind::Restaurant => "Restaurant / Kitchen",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ListingKind::Flat => "Flat, house, villa, commercial space, PG, or plot",
            ListingKind::Garden => "Banquet hall, marriage garden, or event venue",
            ListingKind::Restaurant => "Restaurant, cloud kitchen, or food service",
        }
    }
}

// Government ID accepted for vendor verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "id_document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IdDocumentType {
    Aadhaar,
    Pan,
    Passport,
    DrivingLicense,
    VoterId,
}

/// A listing together with its card-ready price label.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Priced<T> {
    #[serde(flatten)]
    pub listing: T,
    #[schema(example = "₹15K/mo")]
    pub display_price: String,
}
