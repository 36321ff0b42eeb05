// src/services/listing_service.rs

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{KitchenRepository, PropertyRepository, VenueRepository},
    models::{
        kitchen::KitchenWithMenu, listing::ListingKind, property::Property, venue::VenueWithPackages,
    },
    wizard::{
        KitchenDraft, ListingDraft, ListingSubmitter, PropertyDraft, SubmitFailure, SubmitReceipt, VenueDraft,
        WizardError,
    },
};

/// Field validation first, then the same step predicates the wizard gates on.
fn ensure_submittable<D: ListingDraft>(draft: &D) -> Result<(), AppError> {
    draft.validate()?;
    if let Some(step) = draft.first_incomplete_step() {
        let label = D::STEPS.get(step).copied().unwrap_or_default();
        return Err(WizardError::StepIncomplete { step, label }.into());
    }
    Ok(())
}

#[derive(Clone)]
pub struct ListingService {
    pool: PgPool,
    properties: PropertyRepository,
    venues: VenueRepository,
    kitchens: KitchenRepository,
}

impl ListingService {
    pub fn new(
        pool: PgPool,
        properties: PropertyRepository,
        venues: VenueRepository,
        kitchens: KitchenRepository,
    ) -> Self {
        Self { pool, properties, venues, kitchens }
    }

    // ---
    // Creation. New listings wait for admin approval.
    // ---

    pub async fn create_property(&self, vendor_id: Uuid, draft: PropertyDraft) -> Result<Property, AppError> {
        ensure_submittable(&draft)?;
        let property = self.properties.create(&self.pool, vendor_id, &draft).await?;

        let disclosures = draft.disclosures();
        tracing::info!(
            property_id = %property.id,
            %vendor_id,
            property_type = ?property.property_type,
            ?disclosures,
            "property listed"
        );
        Ok(property)
    }

    pub async fn create_venue(&self, vendor_id: Uuid, draft: VenueDraft) -> Result<VenueWithPackages, AppError> {
        ensure_submittable(&draft)?;

        let mut tx = self.pool.begin().await?;
        let venue = self.venues.create(&mut *tx, vendor_id, &draft).await?;
        let packages = self.venues.create_packages(&mut tx, venue.id, &draft.packages).await?;
        tx.commit().await?;

        tracing::info!(venue_id = %venue.id, %vendor_id, packages = packages.len(), "venue listed");
        Ok(VenueWithPackages { venue, packages })
    }

    pub async fn create_kitchen(&self, vendor_id: Uuid, draft: KitchenDraft) -> Result<KitchenWithMenu, AppError> {
        ensure_submittable(&draft)?;

        let mut tx = self.pool.begin().await?;
        let kitchen = self.kitchens.create(&mut *tx, vendor_id, &draft).await?;
        let menu = self.kitchens.create_menu(&mut tx, kitchen.id, &draft.menu).await?;
        tx.commit().await?;

        tracing::info!(kitchen_id = %kitchen.id, %vendor_id, menu_items = menu.len(), "kitchen listed");
        Ok(KitchenWithMenu { kitchen, menu })
    }

    /// Creates a listing of `kind` from its JSON draft and returns the new id.
    pub async fn create_from_json(&self, vendor_id: Uuid, kind: ListingKind, body: Value) -> Result<Uuid, AppError> {
        fn parse<D: DeserializeOwned>(body: Value) -> Result<D, AppError> {
            serde_json::from_value(body).map_err(|e| AppError::InvalidInput(e.to_string()))
        }

        let id = match kind {
            ListingKind::Flat => self.create_property(vendor_id, parse(body)?).await?.id,
            ListingKind::Garden => self.create_venue(vendor_id, parse(body)?).await?.venue.id,
            ListingKind::Restaurant => self.create_kitchen(vendor_id, parse(body)?).await?.kitchen.id,
        };
        Ok(id)
    }

    // ---
    // Moderation
    // ---

    pub async fn set_approval(&self, kind: ListingKind, id: Uuid, approved: bool) -> Result<(), AppError> {
        let updated = match kind {
            ListingKind::Flat => self.properties.set_approved(&self.pool, id, approved).await?,
            ListingKind::Garden => self.venues.set_approved(&self.pool, id, approved).await?,
            ListingKind::Restaurant => self.kitchens.set_approved(&self.pool, id, approved).await?,
        };
        if !updated {
            return Err(AppError::NotFound("listing"));
        }
        tracing::info!(listing_id = %id, ?kind, approved, "listing approval changed");
        Ok(())
    }

    /// Listings are never deleted, only taken out of circulation.
    pub async fn deactivate(&self, kind: ListingKind, id: Uuid) -> Result<(), AppError> {
        let updated = match kind {
            ListingKind::Flat => self.properties.set_active(&self.pool, id, false).await?,
            ListingKind::Garden => self.venues.set_active(&self.pool, id, false).await?,
            ListingKind::Restaurant => self.kitchens.set_active(&self.pool, id, false).await?,
        };
        if !updated {
            return Err(AppError::NotFound("listing"));
        }
        tracing::info!(listing_id = %id, ?kind, "listing deactivated");
        Ok(())
    }
}

/// Submits wizard drafts straight into [`ListingService`] on behalf of one vendor.
pub struct InProcessSubmitter {
    listings: ListingService,
    vendor_id: Uuid,
}

impl InProcessSubmitter {
    pub fn new(listings: ListingService, vendor_id: Uuid) -> Self {
        Self { listings, vendor_id }
    }
}

#[async_trait]
impl ListingSubmitter for InProcessSubmitter {
    async fn submit(&self, kind: ListingKind, draft: Value) -> Result<SubmitReceipt, SubmitFailure> {
        match self.listings.create_from_json(self.vendor_id, kind, draft).await {
            Ok(listing_id) => Ok(SubmitReceipt { listing_id }),
            Err(e) => {
                if e.status().is_server_error() {
                    tracing::error!(error = ?e, vendor_id = %self.vendor_id, "listing submission failed");
                }
                Err(SubmitFailure::from_message(Some(e.client_message())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn empty_draft_fails_field_validation() {
        let err = ensure_submittable(&KitchenDraft::default()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unacceptable_package_blocks_submission() {
        let mut draft = VenueDraft::default();
        draft.packages.push(crate::wizard::PackageDraft {
            name: "Silver".into(),
            price: Decimal::ZERO,
            ..Default::default()
        });
        assert!(ensure_submittable(&draft).is_err());
    }
}
