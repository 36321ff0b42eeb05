// src/db/property_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{filter::PropertyFilter, property::Property},
    wizard::PropertyDraft,
};

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---

    // Only what end users may see
    pub async fn find_visible(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE id = $1 AND is_approved = TRUE AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    pub async fn search(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        let mut query = filter.to_query();
        let properties = query.build_query_as::<Property>().fetch_all(&self.pool).await?;
        Ok(properties)
    }

    pub async fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE vendor_id = $1 ORDER BY created_at DESC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    // Active listings still waiting for an admin
    pub async fn list_pending(&self) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE is_approved = FALSE AND is_active = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    // ---
    // Writes
    // ---

    /// Inserts a new listing. It starts unapproved and active.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        draft: &PropertyDraft,
    ) -> Result<Property, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                vendor_id, title, description, location, city, state, pincode,
                price, property_type, place_type, status, bedrooms, bathrooms, area,
                amenities, security, images,
                owner_name, owner_phone, owner_email, id_type, id_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(draft.title.trim())
        .bind(draft.description.trim())
        .bind(draft.address.location.trim())
        .bind(draft.address.city.trim())
        .bind(draft.address.state.trim())
        .bind(draft.address.pincode.trim())
        .bind(draft.price)
        .bind(draft.property_type)
        .bind(draft.place_type)
        .bind(draft.status)
        .bind(draft.bedrooms)
        .bind(draft.bathrooms)
        .bind(draft.area)
        .bind(&draft.amenities)
        .bind(&draft.security)
        .bind(&draft.images)
        .bind(draft.owner.owner_name.trim())
        .bind(&draft.owner.owner_phone)
        .bind(draft.owner.owner_email.trim())
        .bind(draft.owner.id_type)
        .bind(draft.owner.id_number.trim())
        .fetch_one(executor)
        .await?;
        Ok(property)
    }

    pub async fn set_approved<'e, E>(&self, executor: E, id: Uuid, approved: bool) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE properties SET is_approved = $2, updated_at = NOW() WHERE id = $1")
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
        let result = sqlx::query("UPDATE properties SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
