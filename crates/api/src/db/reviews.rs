//! Review repository for moderation queries.

use sqlx::{PgPool, QueryBuilder};

use steeped_core::{ProductId, Rating, ReviewId, ReviewStatus, UserId};

use super::RepositoryError;
use crate::models::{AdminReviewRow, Review};

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    rating: i32,
    comment: Option<String>,
    status: String,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let status: ReviewStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;
        let rating = Rating::new(row.rating)
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;

        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            rating,
            comment: row.comment,
            status,
        })
    }
}

/// Columns the admin listing may sort by. A closed set keeps user input
/// out of the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSortField {
    #[default]
    CreatedAt,
    Rating,
    Status,
    Id,
}

impl ReviewSortField {
    const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "r.created_at",
            Self::Rating => "r.rating",
            Self::Status => "r.status",
            Self::Id => "r.id",
        }
    }
}

impl std::str::FromStr for ReviewSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "rating" => Ok(Self::Rating),
            "status" => Ok(Self::Status),
            "id" => Ok(Self::Id),
            _ => Err(format!("invalid sort field: {s}")),
        }
    }
}

/// Sort direction for the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Admin listing filters, already validated at the route boundary.
#[derive(Debug, Clone, Default)]
pub struct AdminReviewFilter {
    pub status: Option<ReviewStatus>,
    pub rating: Option<i32>,
    pub sort_by: ReviewSortField,
    pub sort_order: SortDirection,
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a review by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, product_id, user_id, rating, comment, status
             FROM reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Denormalized review listing for the admin console.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_list(
        &self,
        filter: &AdminReviewFilter,
    ) -> Result<Vec<AdminReviewRow>, RepositoryError> {
        #[derive(Debug, sqlx::FromRow)]
        struct ListRow {
            id: i32,
            product_id: i32,
            product_name: String,
            user_id: i32,
            user_name: String,
            rating: i32,
            comment: Option<String>,
            status: String,
        }

        let mut query = QueryBuilder::new(
            "SELECT r.id, r.product_id, p.name AS product_name,
                    r.user_id, COALESCE(u.name, u.username) AS user_name,
                    r.rating, r.comment, r.status
             FROM reviews r
             JOIN products p ON p.id = r.product_id
             JOIN users u ON u.id = r.user_id
             WHERE TRUE",
        );

        if let Some(status) = filter.status {
            query.push(" AND r.status = ").push_bind(status.to_string());
        }
        if let Some(rating) = filter.rating {
            query.push(" AND r.rating = ").push_bind(rating);
        }

        // Sort column and direction come from closed enums, never raw input
        query.push(" ORDER BY ");
        query.push(filter.sort_by.column());
        query.push(" ");
        query.push(filter.sort_order.keyword());

        let rows: Vec<ListRow> = query.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter()
            .map(|row| {
                let status: ReviewStatus = row
                    .status
                    .parse()
                    .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;
                let rating = Rating::new(row.rating)
                    .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;
                Ok(AdminReviewRow {
                    review_id: ReviewId::new(row.id),
                    product_id: ProductId::new(row.product_id),
                    product_name: row.product_name,
                    user_id: UserId::new(row.user_id),
                    user_name: row.user_name,
                    rating,
                    comment: row.comment,
                    status,
                })
            })
            .collect()
    }

    /// Set a review's moderation status.
    ///
    /// The transition is validated by the caller against the current status
    /// fetched with [`Self::get_by_id`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review no longer exists.
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn set_status(
        &self,
        id: ReviewId,
        status: ReviewStatus,
    ) -> Result<(), RepositoryError> {
        let updated = sqlx::query("UPDATE reviews SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_whitelist() {
        assert_eq!(
            "createdAt".parse::<ReviewSortField>().ok(),
            Some(ReviewSortField::CreatedAt)
        );
        assert_eq!(
            "rating".parse::<ReviewSortField>().ok(),
            Some(ReviewSortField::Rating)
        );
        assert!("comment; DROP TABLE reviews".parse::<ReviewSortField>().is_err());
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("asc".parse::<SortDirection>().ok(), Some(SortDirection::Asc));
        assert_eq!("desc".parse::<SortDirection>().ok(), Some(SortDirection::Desc));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
