//! Product catalog listing.

use axum::extract::{Query, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::db::{ProductListFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    page: Option<i64>,
    limit: Option<i64>,
    category: Option<String>,
    price: Option<Decimal>,
    rating: Option<i32>,
}

/// `GET /products` - paginated catalog listing in stable id order.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Response> {
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".to_string()));
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    if let Some(rating) = query.rating
        && !(1..=5).contains(&rating)
    {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let offset = page_offset(page, limit)
        .ok_or_else(|| AppError::Validation("page is out of range".to_string()))?;

    let filter = ProductListFilter {
        category: query.category,
        price: query.price,
        rating: query.rating,
    };

    let products = ProductRepository::new(state.pool())
        .list(&filter, offset, limit)
        .await?;

    Ok(ApiResponse::ok("Products fetched successfully", products))
}

/// Row offset for a 1-based page, `None` when the product of page and limit
/// leaves `i64`.
const fn page_offset(page: i64, limit: i64) -> Option<i64> {
    match page.checked_sub(1) {
        Some(p) => p.checked_mul(limit),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), Some(0));
        assert_eq!(page_offset(2, 10), Some(10));
        assert_eq!(page_offset(3, 25), Some(50));
    }

    #[test]
    fn test_page_offset_rejects_overflow() {
        assert_eq!(page_offset(i64::MAX, 100), None);
        assert_eq!(page_offset(i64::MAX, MAX_PAGE_SIZE), None);
        // Largest page that still fits
        assert!(page_offset(i64::MAX / 100, 100).is_some());
    }
}
