use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::spots::dtos::SpotCandidate;
use crate::features::spots::models::Spot;
use crate::features::spots::services::ExtractionService;
use crate::features::spots::store::SpotStore;
use crate::shared::constants::MSG_ALREADY_SAVED;

/// Composes extraction, the duplicate guard and the store
pub struct SpotService {
    extraction: Arc<ExtractionService>,
    store: Arc<dyn SpotStore>,
}

impl SpotService {
    pub fn new(extraction: Arc<ExtractionService>, store: Arc<dyn SpotStore>) -> Self {
        Self { extraction, store }
    }

    /// Extract a candidate for the URL; the source URL is attached here.
    pub async fn extract_spot_info(&self, url: &str) -> Result<SpotCandidate> {
        let url = url.trim();
        let details = self.extraction.extract(url).await?;

        tracing::info!("Extracted spot '{}' from {}", details.name, url);

        Ok(SpotCandidate::new(details, url))
    }

    /// Validate and persist a (possibly user-edited) candidate.
    ///
    /// The existence check is a fast path only; the store rejects a racing
    /// insert for the same URL on its own.
    pub async fn save_spot(&self, candidate: SpotCandidate) -> Result<Spot> {
        let candidate = candidate.normalized();
        candidate
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.store.exists(&candidate.source_url).await? {
            tracing::info!(
                "Rejected duplicate spot: original_url={}",
                candidate.source_url
            );
            return Err(AppError::Duplicate(MSG_ALREADY_SAVED.to_string()));
        }

        self.store.create(&candidate).await
    }

    /// All spots, newest first. A failing read yields an empty list.
    pub async fn get_spots(&self) -> Vec<Spot> {
        match self.store.list().await {
            Ok(spots) => spots,
            Err(e) => {
                tracing::error!("Failed to load spots, returning empty list: {}", e);
                Vec::new()
            }
        }
    }

    /// Delete by id. Unknown ids count as success.
    pub async fn delete_spot(&self, id: Uuid) -> Result<()> {
        let removed = self.store.delete(id).await?;
        if removed {
            tracing::info!("Spot deleted: id={}", id);
        } else {
            tracing::debug!("Delete for unknown spot id={} ignored", id);
        }
        Ok(())
    }
}
