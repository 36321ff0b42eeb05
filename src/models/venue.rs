// src/models/venue.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Marriage garden / banquet hall
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub vendor_id: Uuid,
    #[schema(example = "Shree Ram Marriage Garden")]
    pub name: String,
    pub location: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[schema(example = 500)]
    pub capacity: i32,
    #[schema(example = "150000")]
    pub price: Decimal,
    pub amenities: Vec<String>,
    pub food_types: Vec<String>,
    pub decoration_types: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub description: String,
    pub owner_phone: String,
    pub owner_email: String,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenuePackage {
    pub id: Uuid,
    pub venue_id: Uuid,
    #[schema(example = "Gold")]
    pub name: String,
    pub description: String,
    #[schema(example = "250000")]
    pub price: Decimal,
    pub items: Vec<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueWithPackages {
    #[serde(flatten)]
    pub venue: Venue,
    pub packages: Vec<VenuePackage>,
}
