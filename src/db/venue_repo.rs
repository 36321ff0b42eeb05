// src/db/venue_repo.rs

use std::collections::HashMap;

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::venue::{Venue, VenuePackage, VenueWithPackages},
    wizard::{PackageDraft, VenueDraft},
};

#[derive(Clone)]
pub struct VenueRepository {
    pool: PgPool,
}

impl VenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---

    pub async fn list_visible(&self) -> Result<Vec<Venue>, AppError> {
        let venues = sqlx::query_as::<_, Venue>(
            "SELECT * FROM venues WHERE is_approved = TRUE AND is_active = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(venues)
    }

    pub async fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Venue>, AppError> {
        let venues = sqlx::query_as::<_, Venue>(
            "SELECT * FROM venues WHERE vendor_id = $1 ORDER BY created_at DESC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(venues)
    }

    pub async fn list_pending(&self) -> Result<Vec<Venue>, AppError> {
        let venues = sqlx::query_as::<_, Venue>(
            "SELECT * FROM venues WHERE is_approved = FALSE AND is_active = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(venues)
    }

    pub async fn packages_for(&self, venue_ids: &[Uuid]) -> Result<Vec<VenuePackage>, AppError> {
        if venue_ids.is_empty() {
            return Ok(Vec::new());
        }
        let packages = sqlx::query_as::<_, VenuePackage>(
            "SELECT * FROM venue_packages WHERE venue_id = ANY($1) ORDER BY venue_id, position",
        )
        .bind(venue_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(packages)
    }

    /// Loads the packages of every venue in one query.
    pub async fn with_packages(&self, venues: Vec<Venue>) -> Result<Vec<VenueWithPackages>, AppError> {
        let ids: Vec<Uuid> = venues.iter().map(|v| v.id).collect();
        let mut by_venue: HashMap<Uuid, Vec<VenuePackage>> = HashMap::new();
        for package in self.packages_for(&ids).await? {
            by_venue.entry(package.venue_id).or_default().push(package);
        }

        Ok(venues
            .into_iter()
            .map(|venue| {
                let packages = by_venue.remove(&venue.id).unwrap_or_default();
                VenueWithPackages { venue, packages }
            })
            .collect())
    }

    // ---
    // Writes
    // ---

    pub async fn create<'e, E>(&self, executor: E, vendor_id: Uuid, draft: &VenueDraft) -> Result<Venue, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let venue = sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO venues (
                vendor_id, name, location, city, state, pincode, capacity, price,
                amenities, food_types, decoration_types, images, videos, description,
                owner_name, owner_phone, owner_email, id_type, id_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(draft.name.trim())
        .bind(draft.address.location.trim())
        .bind(draft.address.city.trim())
        .bind(draft.address.state.trim())
        .bind(draft.address.pincode.trim())
        .bind(draft.capacity)
        .bind(draft.price)
        .bind(&draft.amenities)
        .bind(&draft.food_types)
        .bind(&draft.decoration_types)
        .bind(&draft.images)
        .bind(&draft.videos)
        .bind(draft.description.trim())
        .bind(draft.owner.owner_name.trim())
        .bind(&draft.owner.owner_phone)
        .bind(draft.owner.owner_email.trim())
        .bind(draft.owner.id_type)
        .bind(draft.owner.id_number.trim())
        .fetch_one(executor)
        .await?;
        Ok(venue)
    }

    // Runs inside the venue's transaction so a failed package rolls back the venue.
    pub async fn create_packages(
        &self,
        conn: &mut PgConnection,
        venue_id: Uuid,
        packages: &[PackageDraft],
    ) -> Result<Vec<VenuePackage>, AppError> {
        let mut created = Vec::with_capacity(packages.len());
        for (position, package) in (0_i32..).zip(packages) {
            let row = sqlx::query_as::<_, VenuePackage>(
                r#"
                INSERT INTO venue_packages (venue_id, name, description, price, items, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(venue_id)
            .bind(package.name.trim())
            .bind(package.description.trim())
            .bind(package.price)
            .bind(&package.items)
            .bind(position)
            .fetch_one(&mut *conn)
            .await?;
            created.push(row);
        }
        Ok(created)
    }

    pub async fn set_approved<'e, E>(&self, executor: E, id: Uuid, approved: bool) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE venues SET is_approved = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(approved)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_active<'e, E>(&self, executor: E, id: Uuid, active: bool) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE venues SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
