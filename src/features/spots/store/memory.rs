//! In-memory [`SpotStore`] for tests and running without Postgres.
//!
//! Uniqueness of `original_url` is checked under the write lock, so it holds
//! for concurrent creates the same way the Postgres unique index does.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SpotStore;
use crate::core::error::{AppError, Result};
use crate::features::spots::dtos::SpotCandidate;
use crate::features::spots::models::Spot;
use crate::shared::constants::MSG_ALREADY_SAVED;

/// Spots kept in insertion order
#[derive(Default)]
pub struct InMemorySpotStore {
    spots: RwLock<Vec<Spot>>,
}

impl InMemorySpotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpotStore for InMemorySpotStore {
    async fn exists(&self, source_url: &str) -> Result<bool> {
        let spots = self.spots.read().await;
        Ok(spots.iter().any(|s| s.original_url == source_url))
    }

    async fn create(&self, candidate: &SpotCandidate) -> Result<Spot> {
        let mut spots = self.spots.write().await;

        if spots.iter().any(|s| s.original_url == candidate.source_url) {
            return Err(AppError::Duplicate(MSG_ALREADY_SAVED.to_string()));
        }

        let details = &candidate.details;
        let spot = Spot {
            id: Uuid::now_v7(),
            name: details.name.clone(),
            address: details.address.clone(),
            genre: details.genre.clone(),
            latitude: details.latitude,
            longitude: details.longitude,
            description: details.description.clone(),
            tags: details.tags.clone().unwrap_or_default(),
            original_url: candidate.source_url.clone(),
            created_at: Utc::now(),
        };

        spots.push(spot.clone());
        Ok(spot)
    }

    async fn list(&self) -> Result<Vec<Spot>> {
        let spots = self.spots.read().await;
        // Reverse first so equal timestamps keep newest-inserted first
        let mut listed: Vec<Spot> = spots.iter().rev().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut spots = self.spots.write().await;
        let before = spots.len();
        spots.retain(|s| s.id != id);
        Ok(spots.len() != before)
    }
}
