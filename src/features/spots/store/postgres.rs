use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::SpotStore;
use crate::core::error::{AppError, Result};
use crate::features::spots::dtos::SpotCandidate;
use crate::features::spots::models::Spot;
use crate::shared::constants::MSG_ALREADY_SAVED;

const SPOT_COLUMNS: &str =
    "id, name, address, genre, latitude, longitude, description, tags, original_url, created_at";

/// Postgres-backed spot store
///
/// The `spots_original_url_key` unique index is the authoritative duplicate
/// guard; a violation on insert is reported as `Duplicate`.
pub struct PgSpotStore {
    pool: PgPool,
}

impl PgSpotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Map every store failure to one error category.
///
/// A unique violation can only come from the `original_url` index and is a
/// duplicate; anything else is a persistence failure with the cause logged.
fn store_error(operation: &str, e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        tracing::info!("Spot {} hit the original_url unique constraint", operation);
        return AppError::Duplicate(MSG_ALREADY_SAVED.to_string());
    }

    tracing::error!("Failed to {} spot(s): {:?}", operation, e);
    AppError::Persistence(e.to_string())
}

#[async_trait]
impl SpotStore for PgSpotStore {
    async fn exists(&self, source_url: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM spots WHERE original_url = $1)")
                .bind(source_url)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| store_error("check", e))?;

        Ok(exists)
    }

    async fn create(&self, candidate: &SpotCandidate) -> Result<Spot> {
        let details = &candidate.details;
        let tags = details.tags.clone().unwrap_or_default();

        let query = format!(
            r#"
            INSERT INTO spots (name, address, genre, latitude, longitude, description, tags, original_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SPOT_COLUMNS
        );

        let spot = sqlx::query_as::<_, Spot>(&query)
            .bind(&details.name)
            .bind(&details.address)
            .bind(&details.genre)
            .bind(details.latitude)
            .bind(details.longitude)
            .bind(&details.description)
            .bind(&tags)
            .bind(&candidate.source_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("create", e))?;

        tracing::info!(
            "Spot created: id={}, original_url={}",
            spot.id,
            spot.original_url
        );

        Ok(spot)
    }

    async fn list(&self) -> Result<Vec<Spot>> {
        let query = format!(
            "SELECT {} FROM spots ORDER BY created_at DESC, id DESC",
            SPOT_COLUMNS
        );

        let spots = sqlx::query_as::<_, Spot>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("list", e))?;

        Ok(spots)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError {
        unique: bool,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn db_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { unique }))
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        let error = store_error("create", db_error(true));

        assert!(matches!(error, AppError::Duplicate(ref msg) if msg == MSG_ALREADY_SAVED));
    }

    #[test]
    fn test_other_database_errors_map_to_persistence() {
        let error = store_error("create", db_error(false));

        assert!(matches!(error, AppError::Persistence(_)));
    }

    #[test]
    fn test_read_failures_use_the_same_category() {
        let error = store_error("list", sqlx::Error::PoolTimedOut);

        assert!(matches!(error, AppError::Persistence(_)));
    }
}
