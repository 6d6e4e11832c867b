//! Product repository for catalog queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};

use steeped_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    category: Option<String>,
    ingredients: Option<String>,
    origin: Option<String>,
    tasting_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            category: row.category,
            ingredients: row.ingredients,
            origin: row.origin,
            tasting_notes: row.tasting_notes,
            created_at: row.created_at,
        }
    }
}

/// Catalog listing filters, already validated at the route boundary.
#[derive(Debug, Clone, Default)]
pub struct ProductListFilter {
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub rating: Option<i32>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, filtered and paginated in stable id order.
    ///
    /// The rating filter keeps products with at least one review at exactly
    /// that rating, mirroring the catalog's "rated N stars" facet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::new(
            "SELECT id, name, description, price, image_url, category,
                    ingredients, origin, tasting_notes, created_at
             FROM products WHERE TRUE",
        );

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(price) = filter.price {
            query.push(" AND price = ").push_bind(price);
        }
        if let Some(rating) = filter.rating {
            query
                .push(" AND EXISTS (SELECT 1 FROM reviews r WHERE r.product_id = products.id AND r.rating = ")
                .push_bind(rating)
                .push(")");
        }

        query.push(" ORDER BY id");
        query.push(" OFFSET ").push_bind(offset);
        query.push(" LIMIT ").push_bind(limit);

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Whether a product with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let found: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(found.is_some())
    }
}
