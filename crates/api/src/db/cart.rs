//! Cart repository.
//!
//! Each mutation and its total recompute run in one transaction so the
//! returned total always reflects the state the mutation left behind.
//! Concurrent mutations for the same (user, product) remain last-write-wins
//! at the storage layer; there is no optimistic locking.

use rust_decimal::Decimal;
use sqlx::PgPool;

use steeped_core::{ProductId, UserId};

use super::RepositoryError;

/// Write a cart upsert applies for a requested quantity. A cart never
/// stores a zero-quantity line, so zero maps to a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartWrite {
    Delete,
    Upsert,
}

const fn write_for_quantity(quantity: i32) -> CartWrite {
    if quantity == 0 {
        CartWrite::Delete
    } else {
        CartWrite::Upsert
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert the (user, product) cart row and return the recomputed cart
    /// total. A quantity of zero removes the row, honoring the invariant
    /// that a cart never carries zero-quantity lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Decimal, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        match write_for_quantity(quantity) {
            CartWrite::Delete => {
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                    .bind(user_id)
                    .bind(product_id)
                    .execute(&mut *tx)
                    .await?;
            }
            CartWrite::Upsert => {
                sqlx::query(
                    "INSERT INTO cart_items (user_id, product_id, quantity)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (user_id, product_id)
                     DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()",
                )
                .bind(user_id)
                .bind(product_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;
            }
        }

        let total = cart_total(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(total)
    }

    /// Remove a product from the cart and return the recomputed total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Decimal, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let total = cart_total(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(total)
    }
}

/// Σ(quantity × price) over the user's cart, inside the caller's transaction.
async fn cart_total(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
) -> Result<Decimal, RepositoryError> {
    let (total,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(ci.quantity * p.price), 0)
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_zero_deletes_the_line() {
        assert_eq!(write_for_quantity(0), CartWrite::Delete);
    }

    #[test]
    fn test_positive_quantity_upserts() {
        assert_eq!(write_for_quantity(1), CartWrite::Upsert);
        assert_eq!(write_for_quantity(99), CartWrite::Upsert);
    }
}
