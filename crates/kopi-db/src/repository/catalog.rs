//! # Catalog Repository
//!
//! Products and add-ons. The POS only reads the catalog; inserts exist for
//! the seed binary and tests.
//!
//! Prices read here are copied into cart lines at add time. Later catalog
//! edits never reach an existing cart or a recorded order.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kopi_core::{AddOn, Product};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
/// let menu = repo.list_active_products().await?;
/// let extras = repo.get_add_ons(&["oat-id".into()]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Active products, grouped by category then name.
    pub async fn list_active_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, category,
                   is_featured, is_popular, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// Gets a product by its ID, active or not.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, category,
                   is_featured, is_popular, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn list_active_add_ons(&self) -> DbResult<Vec<AddOn>> {
        let add_ons = sqlx::query_as::<_, AddOn>(
            "SELECT id, name, price_cents, is_active FROM add_ons WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(add_ons)
    }

    /// Resolves add-on ids chosen at the counter, keeping the caller's order.
    ///
    /// ## Errors
    /// `NotFound` for the first id that is unknown or inactive.
    pub async fn get_add_ons(&self, ids: &[String]) -> DbResult<Vec<AddOn>> {
        let mut add_ons = Vec::with_capacity(ids.len());

        for id in ids {
            let add_on = sqlx::query_as::<_, AddOn>(
                "SELECT id, name, price_cents, is_active FROM add_ons WHERE id = ?1 AND is_active = 1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("AddOn", id.as_str()))?;

            add_ons.push(add_on);
        }

        Ok(add_ons)
    }

    /// Inserts a new product and returns it.
    pub async fn insert_product(
        &self,
        name: &str,
        description: Option<&str>,
        price_cents: i64,
        category: &str,
        is_featured: bool,
        is_popular: bool,
    ) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price_cents,
            category: category.to_string(),
            is_featured,
            is_popular,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, category,
                is_featured, is_popular, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(product.is_featured)
        .bind(product.is_popular)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %product.id, name = %product.name, "Inserted product");
        Ok(product)
    }

    pub async fn insert_add_on(&self, name: &str, price_cents: i64) -> DbResult<AddOn> {
        let add_on = AddOn {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price_cents,
            is_active: true,
        };

        sqlx::query("INSERT INTO add_ons (id, name, price_cents, is_active) VALUES (?1, ?2, ?3, ?4)")
            .bind(&add_on.id)
            .bind(&add_on.name)
            .bind(add_on.price_cents)
            .bind(add_on.is_active)
            .execute(&self.pool)
            .await?;

        Ok(add_on)
    }

    /// Hides a product from the menu. Recorded order items keep their copy.
    pub async fn deactivate_product(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Counts all products (seed idempotence check).
    pub async fn count_products(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
