// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, format::format_listing_price},
    db::{BookingRepository, KitchenRepository, PropertyRepository, UserRepository, VenueRepository},
    models::{
        auth::SessionUser,
        dashboard::{AdminDashboard, ListingStats, PropertyDetail, UserDashboard, VendorDashboard},
        filter::PropertyFilter,
        kitchen::KitchenWithMenu,
        listing::Priced,
        property::Property,
        venue::VenueWithPackages,
    },
};

const RECENT_ACTIVITY_LIMIT: i64 = 5;

pub fn priced(property: Property) -> Priced<Property> {
    let display_price = format_listing_price(property.price, property.status);
    Priced { listing: property, display_price }
}

/// Counters for the vendor dashboard header.
pub fn listing_stats(properties: &[Property], venues: &[VenueWithPackages], kitchens: &[KitchenWithMenu]) -> ListingStats {
    let flags = properties
        .iter()
        .map(|p| p.is_approved)
        .chain(venues.iter().map(|v| v.venue.is_approved))
        .chain(kitchens.iter().map(|k| k.kitchen.is_approved));

    let mut stats = ListingStats {
        venues: venues.len(),
        ..ListingStats::default()
    };
    for approved in flags {
        stats.total_listings += 1;
        if approved {
            stats.approved += 1;
        } else {
            stats.pending_review += 1;
        }
    }
    stats
}

// Read models behind the /dashboard pages
#[derive(Clone)]
pub struct DashboardService {
    users: UserRepository,
    properties: PropertyRepository,
    venues: VenueRepository,
    kitchens: KitchenRepository,
    bookings: BookingRepository,
}

impl DashboardService {
    pub fn new(
        users: UserRepository,
        properties: PropertyRepository,
        venues: VenueRepository,
        kitchens: KitchenRepository,
        bookings: BookingRepository,
    ) -> Self {
        Self { users, properties, venues, kitchens, bookings }
    }

    pub async fn user_dashboard(&self, user: &SessionUser) -> Result<UserDashboard, AppError> {
        let recent_bookings = self.bookings.recent_bookings(user.id, RECENT_ACTIVITY_LIMIT).await?;
        let recent_orders = self.bookings.recent_orders(user.id, RECENT_ACTIVITY_LIMIT).await?;

        let display_name = user
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.email.clone());

        Ok(UserDashboard { display_name, recent_bookings, recent_orders })
    }

    pub async fn browse_properties(&self, filter: &PropertyFilter) -> Result<Vec<Priced<Property>>, AppError> {
        filter.validate_range()?;
        let properties = self.properties.search(filter).await?;
        Ok(properties.into_iter().map(priced).collect())
    }

    /// Hidden listings answer the same as missing ones.
    pub async fn property_detail(&self, id: Uuid) -> Result<PropertyDetail, AppError> {
        let property = self
            .properties
            .find_visible(id)
            .await?
            .ok_or(AppError::NotFound("property"))?;
        let vendor = self
            .users
            .find_contact(property.vendor_id)
            .await?
            .ok_or(AppError::NotFound("vendor"))?;

        Ok(PropertyDetail { property: priced(property), vendor })
    }

    pub async fn browse_venues(&self) -> Result<Vec<VenueWithPackages>, AppError> {
        let venues = self.venues.list_visible().await?;
        self.venues.with_packages(venues).await
    }

    pub async fn vendor_dashboard(&self, vendor_id: Uuid) -> Result<VendorDashboard, AppError> {
        let properties = self.properties.list_by_vendor(vendor_id).await?;
        let venues = self.venues.with_packages(self.venues.list_by_vendor(vendor_id).await?).await?;
        let kitchens = self.kitchens.with_menu(self.kitchens.list_by_vendor(vendor_id).await?).await?;

        let stats = listing_stats(&properties, &venues, &kitchens);
        Ok(VendorDashboard {
            stats,
            properties: properties.into_iter().map(priced).collect(),
            venues,
            kitchens,
        })
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, AppError> {
        let pending_properties = self.properties.list_pending().await?;
        let pending_venues = self.venues.with_packages(self.venues.list_pending().await?).await?;
        let pending_kitchens = self.kitchens.with_menu(self.kitchens.list_pending().await?).await?;

        Ok(AdminDashboard {
            pending_properties: pending_properties.into_iter().map(priced).collect(),
            pending_venues,
            pending_kitchens,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{
        property::{ListingStatus, PlaceType, PropertyType},
        venue::Venue,
    };

    fn property(approved: bool, price: i64, status: ListingStatus) -> Property {
        Property {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            title: "Garden view flat".into(),
            description: String::new(),
            location: String::new(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
            price: Decimal::from(price),
            property_type: PropertyType::Flat,
            place_type: PlaceType::EntirePlace,
            status,
            bedrooms: 2,
            bathrooms: 1,
            area: Decimal::from(900),
            amenities: vec![],
            security: vec![],
            images: vec![],
            owner_phone: String::new(),
            owner_email: String::new(),
            is_approved: approved,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn venue(approved: bool) -> VenueWithPackages {
        VenueWithPackages {
            venue: Venue {
                id: Uuid::new_v4(),
                vendor_id: Uuid::new_v4(),
                name: "Royal Lawn".into(),
                location: String::new(),
                city: String::new(),
                state: String::new(),
                pincode: String::new(),
                capacity: 500,
                price: Decimal::from(200_000),
                amenities: vec![],
                food_types: vec![],
                decoration_types: vec![],
                images: vec![],
                videos: vec![],
                description: String::new(),
                owner_phone: String::new(),
                owner_email: String::new(),
                is_approved: approved,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            packages: vec![],
        }
    }

    #[test]
    fn stats_count_across_listing_kinds() {
        let properties = vec![
            property(true, 15_000, ListingStatus::Rent),
            property(false, 9_000_000, ListingStatus::Sale),
        ];
        let venues = vec![venue(false)];

        let stats = listing_stats(&properties, &venues, &[]);
        assert_eq!(
            stats,
            ListingStats { total_listings: 3, approved: 1, pending_review: 2, venues: 1 }
        );
    }

    #[test]
    fn priced_property_carries_card_label() {
        assert_eq!(priced(property(true, 15_000, ListingStatus::Rent)).display_price, "₹15K/mo");
        assert_eq!(priced(property(true, 12_500_000, ListingStatus::Sale)).display_price, "₹1.3 Cr");
    }
}
