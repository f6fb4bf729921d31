//! Persistence boundary for spots.
//!
//! [`SpotStore`] is implemented by [`PgSpotStore`] (production, unique index
//! on `original_url`) and [`InMemorySpotStore`] (tests and database-less
//! runs). Both reject a second spot for the same source URL with
//! [`AppError::Duplicate`](crate::core::error::AppError::Duplicate), even
//! when two inserts race past the service-level pre-check.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::spots::dtos::SpotCandidate;
use crate::features::spots::models::Spot;

pub use memory::InMemorySpotStore;
pub use postgres::PgSpotStore;

/// Spot storage operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`exists`](SpotStore::exists) | Exact `original_url` lookup |
/// | [`create`](SpotStore::create) | Insert, assigning `id` and `created_at` |
/// | [`list`](SpotStore::list) | All spots, newest first |
/// | [`delete`](SpotStore::delete) | Remove by id |
#[async_trait]
pub trait SpotStore: Send + Sync {
    async fn exists(&self, source_url: &str) -> Result<bool>;

    /// Persist a validated candidate.
    ///
    /// Fails with `Duplicate` when a spot with the same source URL exists.
    async fn create(&self, candidate: &SpotCandidate) -> Result<Spot>;

    /// All spots ordered by `created_at` descending
    async fn list(&self) -> Result<Vec<Spot>>;

    /// Returns whether a spot was actually removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
