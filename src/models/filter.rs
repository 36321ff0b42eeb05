// src/models/filter.rs

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use sqlx::{Postgres, QueryBuilder};
use utoipa::IntoParams;

use super::property::{ListingStatus, PropertyType};
use crate::common::error::AppError;

/// Browse filters for `/dashboard/user/properties`.
///
/// Every key the listing page may send is enumerated here with its value
/// type. Empty query values (`?city=`) mean "no filter".
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PropertyFilter {
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>, example = "flat")]
    pub property_type: Option<PropertyType>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>, example = "rent")]
    pub status: Option<ListingStatus>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<f64>)]
    pub min_price: Option<Decimal>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<f64>)]
    pub max_price: Option<Decimal>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bedrooms: Option<i32>,
}

impl PropertyFilter {
    pub fn validate_range(&self) -> Result<(), AppError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(AppError::InvalidInput(
                    "minPrice must not exceed maxPrice".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Builds the browse query. Only approved, active listings are returned.
    pub fn to_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(
            "SELECT * FROM properties WHERE is_approved = TRUE AND is_active = TRUE",
        );

        if let Some(property_type) = self.property_type {
            qb.push(" AND property_type = ").push_bind(property_type);
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(city) = &self.city {
            qb.push(" AND city ILIKE ")
                .push_bind(format!("%{}%", escape_like(city)));
        }
        if let Some(bedrooms) = self.bedrooms {
            qb.push(" AND bedrooms = ").push_bind(bedrooms);
        }
        if let Some(min) = self.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }

        qb.push(" ORDER BY created_at DESC");
        qb
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Treats a missing or empty query value as `None`, otherwise parses it.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> PropertyFilter {
        serde_json::from_value(serde_json::Value::Object(
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
        ))
        .unwrap()
    }

    #[test]
    fn no_filters_still_restricts_to_visible_listings() {
        let qb = PropertyFilter::default().to_query();
        assert_eq!(
            qb.sql(),
            "SELECT * FROM properties WHERE is_approved = TRUE AND is_active = TRUE ORDER BY created_at DESC"
        );
    }

    #[test]
    fn binds_each_present_filter_in_order() {
        let filter = PropertyFilter {
            property_type: Some(PropertyType::Villa),
            city: Some("jaipur".into()),
            min_price: Some(Decimal::from(1000)),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query().sql(),
            "SELECT * FROM properties WHERE is_approved = TRUE AND is_active = TRUE \
             AND property_type = $1 AND city ILIKE $2 AND price >= $3 ORDER BY created_at DESC"
        );
    }

    #[test]
    fn empty_values_are_ignored() {
        let filter = parse("type=&status=sale&city=&bedrooms=2&minPrice=");
        assert_eq!(filter.property_type, None);
        assert_eq!(filter.status, Some(ListingStatus::Sale));
        assert_eq!(filter.city, None);
        assert_eq!(filter.bedrooms, Some(2));
        assert_eq!(filter.min_price, None);
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        let result: Result<PropertyFilter, _> =
            serde_json::from_value(serde_json::json!({ "type": "castle" }));
        assert!(result.is_err());
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let filter = PropertyFilter {
            min_price: Some(Decimal::from(500)),
            max_price: Some(Decimal::from(100)),
            ..Default::default()
        };
        assert!(matches!(filter.validate_range(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like(" 100%_off "), "100\\%\\_off");
    }
}
