// src/db/kitchen_repo.rs

use std::collections::HashMap;

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::kitchen::{Kitchen, KitchenWithMenu, MenuItem},
    wizard::{KitchenDraft, MenuItemDraft},
};

#[derive(Clone)]
pub struct KitchenRepository {
    pool: PgPool,
}

impl KitchenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Kitchen>, AppError> {
        let kitchens = sqlx::query_as::<_, Kitchen>(
            "SELECT * FROM kitchens WHERE vendor_id = $1 ORDER BY created_at DESC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(kitchens)
    }

    pub async fn list_pending(&self) -> Result<Vec<Kitchen>, AppError> {
        let kitchens = sqlx::query_as::<_, Kitchen>(
            "SELECT * FROM kitchens WHERE is_approved = FALSE AND is_active = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(kitchens)
    }

    pub async fn with_menu(&self, kitchens: Vec<Kitchen>) -> Result<Vec<KitchenWithMenu>, AppError> {
        if kitchens.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = kitchens.iter().map(|k| k.id).collect();
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT * FROM kitchen_menu_items WHERE kitchen_id = ANY($1) ORDER BY kitchen_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_kitchen: HashMap<Uuid, Vec<MenuItem>> = HashMap::new();
        for item in items {
            by_kitchen.entry(item.kitchen_id).or_default().push(item);
        }

        Ok(kitchens
            .into_iter()
            .map(|kitchen| {
                let menu = by_kitchen.remove(&kitchen.id).unwrap_or_default();
                KitchenWithMenu { kitchen, menu }
            })
            .collect())
    }

    pub async fn create<'e, E>(&self, executor: E, vendor_id: Uuid, draft: &KitchenDraft) -> Result<Kitchen, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let kitchen = sqlx::query_as::<_, Kitchen>(
            r#"
            INSERT INTO kitchens (
                vendor_id, name, location, city, state, pincode, cuisine, price_range,
                images, description, owner_name, owner_phone, owner_email, id_type, id_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(draft.name.trim())
        .bind(draft.address.location.trim())
        .bind(draft.address.city.trim())
        .bind(draft.address.state.trim())
        .bind(draft.address.pincode.trim())
        .bind(&draft.cuisine)
        .bind(draft.price_range)
        .bind(&draft.images)
        .bind(draft.description.trim())
        .bind(draft.owner.owner_name.trim())
        .bind(&draft.owner.owner_phone)
        .bind(draft.owner.owner_email.trim())
        .bind(draft.owner.id_type)
        .bind(draft.owner.id_number.trim())
        .fetch_one(executor)
        .await?;
        Ok(kitchen)
    }

    pub async fn create_menu(
        &self,
        conn: &mut PgConnection,
        kitchen_id: Uuid,
        menu: &[MenuItemDraft],
    ) -> Result<Vec<MenuItem>, AppError> {
        let mut created = Vec::with_capacity(menu.len());
        for (position, item) in (0_i32..).zip(menu) {
            let row = sqlx::query_as::<_, MenuItem>(
                r#"
                INSERT INTO kitchen_menu_items (kitchen_id, name, price, category, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(kitchen_id)
            .bind(item.name.trim())
            .bind(item.price)
            .bind(item.category.trim())
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
        let result = sqlx::query("UPDATE kitchens SET is_approved = $2, updated_at = NOW() WHERE id = $1")
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
        let result = sqlx::query("UPDATE kitchens SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
