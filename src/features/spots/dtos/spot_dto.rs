use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::spots::models::Spot;

const MAX_TAG_LENGTH: usize = 50;
const MAX_TAGS: usize = 20;

#[allow(clippy::ptr_arg)]
fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new("too_many_tags")
            .with_message(format!("At most {} tags are allowed", MAX_TAGS).into()));
    }
    if tags
        .iter()
        .any(|t| t.trim().is_empty() || t.chars().count() > MAX_TAG_LENGTH)
    {
        return Err(ValidationError::new("invalid_tag").with_message(
            format!("Tags must be 1-{} characters", MAX_TAG_LENGTH).into(),
        ));
    }
    Ok(())
}

/// Place fields derived from a URL by the extractor.
///
/// This is also the shape the generative model is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema, ToSchema)]
#[schemars(title = "ExtractedSpot")]
pub struct SpotDetails {
    #[schemars(description = "Name of the shop or place")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[schemars(description = "Address of the place, as detailed as possible")]
    #[validate(length(min = 1, max = 500, message = "Address must be 1-500 characters"))]
    pub address: String,

    #[schemars(description = "Kind of place (e.g. cafe, ramen, sightseeing spot)")]
    #[validate(length(min = 1, max = 100, message = "Genre must be 1-100 characters"))]
    pub genre: String,

    #[schemars(description = "Latitude in decimal degrees")]
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[schemars(description = "Longitude in decimal degrees")]
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    #[schemars(description = "Short introduction or recommended points of the place")]
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[schemars(
        description = "Short tags describing the place (e.g. scenic, long queue, date spot, solo-friendly)"
    )]
    #[validate(custom(function = "validate_tags"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl SpotDetails {
    /// Trim text fields, drop blank tags (order preserved) and blank descriptions.
    pub fn normalized(self) -> Self {
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let tags = self.tags.map(|tags| {
            tags.into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        });

        Self {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            genre: self.genre.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            description,
            tags,
        }
    }
}

/// A not-yet-persisted spot: extracted details plus the URL they came from.
///
/// Returned by the extract endpoint and sent back (possibly user-edited) to
/// the save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotCandidate {
    #[serde(flatten)]
    #[validate(nested)]
    pub details: SpotDetails,

    /// The URL the spot was extracted from
    #[validate(
        length(min = 1, max = 2048, message = "Source URL must be 1-2048 characters"),
        regex(
            path = "*crate::shared::validation::HTTP_URL_REGEX",
            message = "Source URL must be an absolute http(s) URL"
        )
    )]
    pub source_url: String,
}

impl SpotCandidate {
    pub fn new(details: SpotDetails, source_url: impl Into<String>) -> Self {
        Self {
            details,
            source_url: source_url.into(),
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            details: self.details.normalized(),
            source_url: self.source_url.trim().to_string(),
        }
    }
}

/// Request DTO for extracting spot information from a URL
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractSpotRequestDto {
    /// URL of a post or page about a place
    #[validate(
        length(min = 1, max = 2048, message = "URL must be 1-2048 characters"),
        regex(
            path = "*crate::shared::validation::HTTP_URL_REGEX",
            message = "URL must be an absolute http(s) URL"
        )
    )]
    pub url: String,
}

/// Loosely structured hints scraped from a page, fed into the extraction
/// prompt only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadataDto {
    pub title: String,
    pub description: String,
    pub site_name: String,
    /// Visible body text, whitespace-collapsed and truncated
    pub body_text: String,
}

/// Response DTO for a persisted spot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotResponseDto {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub genre: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub source_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Spot> for SpotResponseDto {
    fn from(s: Spot) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address,
            genre: s.genre,
            latitude: s.latitude,
            longitude: s.longitude,
            description: s.description,
            tags: s.tags,
            source_url: s.original_url,
            created_at: s.created_at,
        }
    }
}
