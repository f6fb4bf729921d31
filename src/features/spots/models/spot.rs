use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a persisted spot
///
/// `id` and `created_at` are assigned by the store at creation and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Spot {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub genre: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}
