// src/models/property.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Flat,
    House,
    Villa,
    Commercial,
    Plot,
    Pg,
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::Flat),
            "house" => Ok(Self::House),
            "villa" => Ok(Self::Villa),
            "commercial" => Ok(Self::Commercial),
            "plot" => Ok(Self::Plot),
            "pg" => Ok(Self::Pg),
            other => Err(format!("unknown property type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "place_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    EntirePlace,
    PrivateRoom,
    SharedRoom,
}

// Rent or sale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Rent,
    Sale,
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rent" => Ok(Self::Rent),
            "sale" => Ok(Self::Sale),
            other => Err(format!("unknown listing status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub vendor_id: Uuid,
    #[schema(example = "Spacious 2 BHK in prime location")]
    pub title: String,
    pub description: String,
    #[schema(example = "42, Sunrise Colony, MG Road")]
    pub location: String,
    #[schema(example = "Jaipur")]
    pub city: String,
    #[schema(example = "Rajasthan")]
    pub state: String,
    #[schema(example = "302001")]
    pub pincode: String,
    #[schema(example = "15000")]
    pub price: Decimal,
    pub property_type: PropertyType,
    pub place_type: PlaceType,
    pub status: ListingStatus,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: Decimal,
    pub amenities: Vec<String>,
    pub security: Vec<String>,
    pub images: Vec<String>,
    pub owner_phone: String,
    pub owner_email: String,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public contact details of the vendor behind a listing.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorContact {
    pub name: Option<String>,
    pub email: String,
}
