// src/models/kitchen.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Per-person spend bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "price_range", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PriceRange {
    Budget,
    Moderate,
    Premium,
    Luxury,
}

// Restaurant / cloud kitchen
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Kitchen {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub location: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub cuisine: Vec<String>,
    pub price_range: PriceRange,
    pub images: Vec<String>,
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
pub struct MenuItem {
    pub id: Uuid,
    pub kitchen_id: Uuid,
    #[schema(example = "Paneer Tikka")]
    pub name: String,
    #[schema(example = "280")]
    pub price: Decimal,
    #[schema(example = "Starters")]
    pub category: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitchenWithMenu {
    #[serde(flatten)]
    pub kitchen: Kitchen,
    pub menu: Vec<MenuItem>,
}
