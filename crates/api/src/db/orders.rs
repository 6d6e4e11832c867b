//! Order repository.
//!
//! Orders are created in `created` status alongside a gateway payment
//! intent and carry the provider's intent id so verification can find them
//! by that handle. Status changes go through the transition table inside a
//! row-locking transaction.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};

use steeped_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{AdminOrderItem, AdminOrderRow, Order, OrderWithCustomer};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    total_amount: Decimal,
    status: String,
    provider_order_id: Option<String>,
    order_date: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            total_amount: row.total_amount,
            status,
            provider_order_id: row.provider_order_id,
            order_date: row.order_date,
        })
    }
}

/// Outcome of a signature-verified confirmation attempt.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Order moved `created -> confirmed`; carries the customer email for
    /// the confirmation mail.
    Confirmed(OrderWithCustomer),
    /// Order was already confirmed; the call is an idempotent no-op.
    AlreadyConfirmed(Order),
    /// Order is in a state that cannot accept a confirmation.
    NotConfirmable(OrderStatus),
}

/// What a signature-verified confirmation does given the order's current
/// status. Pulled out of the transaction so the decision itself stays
/// checkable without a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmAction {
    /// Move `created -> confirmed` and dispatch the confirmation email.
    Confirm,
    /// Leave the row alone and answer success; no second email.
    AlreadyConfirmed,
    /// Reject; the order left the confirmable window.
    NotConfirmable,
}

const fn confirm_action(status: OrderStatus) -> ConfirmAction {
    match status {
        OrderStatus::Created => ConfirmAction::Confirm,
        OrderStatus::Confirmed => ConfirmAction::AlreadyConfirmed,
        OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled => {
            ConfirmAction::NotConfirmable
        }
    }
}

/// Outcome of an admin status transition attempt.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// Transition applied; carries the updated order.
    Applied(Order),
    /// Transition is outside the table; carries the current status.
    Invalid(OrderStatus),
}

/// Admin listing filters, already validated at the route boundary.
#[derive(Debug, Clone, Default)]
pub struct AdminOrderFilter {
    pub status: Option<OrderStatus>,
    pub date: Option<NaiveDate>,
    pub customer: Option<String>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order in `created` status linked to a gateway intent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the provider intent id is
    /// already linked to an order, `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        amount: Decimal,
        provider_order_id: &str,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id, total_amount, status, provider_order_id)
             VALUES ($1, $2, 'created', $3)
             RETURNING id, user_id, total_amount, status, provider_order_id, order_date",
        )
        .bind(user_id)
        .bind(amount)
        .bind(provider_order_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "payment intent already linked to an order".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Confirm the order linked to a gateway intent id.
    ///
    /// Locks the row, so a concurrent duplicate verification observes the
    /// confirmed state and resolves to [`ConfirmOutcome::AlreadyConfirmed`]
    /// instead of double-firing side effects.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order carries this intent id.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn confirm_by_provider_id(
        &self,
        provider_order_id: &str,
    ) -> Result<ConfirmOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total_amount, status, provider_order_id, order_date
             FROM orders WHERE provider_order_id = $1
             FOR UPDATE",
        )
        .bind(provider_order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let order: Order = row.try_into()?;

        let outcome = match confirm_action(order.status) {
            ConfirmAction::Confirm => {
                sqlx::query("UPDATE orders SET status = 'confirmed' WHERE id = $1")
                    .bind(order.id)
                    .execute(&mut *tx)
                    .await?;

                let customer_email = match order.user_id {
                    Some(user_id) => {
                        let email: Option<(String,)> =
                            sqlx::query_as("SELECT email FROM users WHERE id = $1")
                                .bind(user_id)
                                .fetch_optional(&mut *tx)
                                .await?;
                        email.and_then(|(e,)| Email::parse(&e).ok())
                    }
                    None => None,
                };

                ConfirmOutcome::Confirmed(OrderWithCustomer {
                    order: Order {
                        status: OrderStatus::Confirmed,
                        ..order
                    },
                    customer_email,
                })
            }
            ConfirmAction::AlreadyConfirmed => ConfirmOutcome::AlreadyConfirmed(order),
            ConfirmAction::NotConfirmable => ConfirmOutcome::NotConfirmable(order.status),
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Apply an admin status transition if the table allows it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown order.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn transition(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total_amount, status, provider_order_id, order_date
             FROM orders WHERE id = $1
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let order: Order = row.try_into()?;

        if !order.status.can_transition_to(next) {
            tx.rollback().await?;
            return Ok(TransitionOutcome::Invalid(order.status));
        }

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order.id)
            .bind(next.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(TransitionOutcome::Applied(Order {
            status: next,
            ..order
        }))
    }

    /// Denormalized order listing for the admin console.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_list(
        &self,
        filter: &AdminOrderFilter,
    ) -> Result<Vec<AdminOrderRow>, RepositoryError> {
        #[derive(Debug, sqlx::FromRow)]
        struct ListRow {
            id: i32,
            customer_name: Option<String>,
            total_amount: Decimal,
            status: String,
            order_date: DateTime<Utc>,
        }

        let mut query = QueryBuilder::new(
            "SELECT o.id, COALESCE(u.name, u.username) AS customer_name,
                    o.total_amount, o.status, o.order_date
             FROM orders o
             LEFT JOIN users u ON u.id = o.user_id
             WHERE TRUE",
        );

        if let Some(status) = filter.status {
            query.push(" AND o.status = ").push_bind(status.to_string());
        }
        if let Some(date) = filter.date {
            query.push(" AND o.order_date::date = ").push_bind(date);
        }
        if let Some(customer) = &filter.customer {
            query
                .push(" AND COALESCE(u.name, u.username) ILIKE ")
                .push_bind(format!("%{customer}%"));
        }

        query.push(" ORDER BY o.id");

        let rows: Vec<ListRow> = query.build_query_as().fetch_all(self.pool).await?;

        let order_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items_by_order = self.items_for(&order_ids).await?;

        rows.into_iter()
            .map(|row| {
                let status: OrderStatus = row
                    .status
                    .parse()
                    .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;
                Ok(AdminOrderRow {
                    order_id: OrderId::new(row.id),
                    customer_name: row.customer_name,
                    items: items_by_order.remove(&row.id).unwrap_or_default(),
                    total_amount: row.total_amount,
                    order_date: row.order_date,
                    status,
                })
            })
            .collect()
    }

    /// Fetch the item lines for a set of orders, keyed by order id.
    async fn items_for(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<AdminOrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(Debug, sqlx::FromRow)]
        struct ItemRow {
            order_id: i32,
            product_id: i32,
            name: String,
            quantity: i32,
        }

        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT oi.order_id, oi.product_id, p.name, oi.quantity
             FROM order_items oi
             JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = ANY($1)
             ORDER BY oi.id",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<AdminOrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(AdminOrderItem {
                product_id: ProductId::new(row.product_id),
                name: row.name,
                quantity: row.quantity,
            });
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_only_from_created() {
        assert_eq!(confirm_action(OrderStatus::Created), ConfirmAction::Confirm);
    }

    #[test]
    fn test_repeat_confirmation_is_idempotent() {
        // A second valid verification answers success without re-confirming,
        // so the email side effect fires at most once.
        assert_eq!(
            confirm_action(OrderStatus::Confirmed),
            ConfirmAction::AlreadyConfirmed
        );
    }

    #[test]
    fn test_confirmation_rejected_past_the_window() {
        for status in [
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(
                confirm_action(status),
                ConfirmAction::NotConfirmable,
                "{status} must not be confirmable"
            );
        }
    }
}
