use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::spots::dtos::{ExtractSpotRequestDto, SpotCandidate, SpotResponseDto};
use crate::features::spots::services::SpotService;
use crate::shared::types::{ApiResponse, Meta};

/// Extract spot information from a URL
///
/// Runs the generative extraction and returns an unsaved candidate for the
/// user to confirm or edit.
#[utoipa::path(
    post,
    path = "/api/spots/extract",
    request_body = ExtractSpotRequestDto,
    responses(
        (status = 200, description = "Spot candidate extracted", body = ApiResponse<SpotCandidate>),
        (status = 400, description = "Invalid URL"),
        (status = 422, description = "Content is not a place or could not be extracted"),
        (status = 500, description = "Extraction is not configured"),
        (status = 504, description = "Extraction timed out")
    ),
    tag = "spots"
)]
pub async fn extract_spot(
    State(service): State<Arc<SpotService>>,
    AppJson(dto): AppJson<ExtractSpotRequestDto>,
) -> Result<Json<ApiResponse<SpotCandidate>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let candidate = service.extract_spot_info(&dto.url).await?;
    Ok(Json(ApiResponse::success(Some(candidate), None, None)))
}

/// Save a confirmed spot
#[utoipa::path(
    post,
    path = "/api/spots",
    request_body = SpotCandidate,
    responses(
        (status = 201, description = "Spot saved", body = ApiResponse<SpotResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "A spot for this URL is already saved")
    ),
    tag = "spots"
)]
pub async fn save_spot(
    State(service): State<Arc<SpotService>>,
    AppJson(candidate): AppJson<SpotCandidate>,
) -> Result<(StatusCode, Json<ApiResponse<SpotResponseDto>>)> {
    let spot = service.save_spot(candidate).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(spot.into()), None, None)),
    ))
}

/// List saved spots, newest first
#[utoipa::path(
    get,
    path = "/api/spots",
    responses(
        (status = 200, description = "Saved spots", body = ApiResponse<Vec<SpotResponseDto>>)
    ),
    tag = "spots"
)]
pub async fn list_spots(
    State(service): State<Arc<SpotService>>,
) -> Result<Json<ApiResponse<Vec<SpotResponseDto>>>> {
    let spots: Vec<SpotResponseDto> = service
        .get_spots()
        .await
        .into_iter()
        .map(Into::into)
        .collect();

    let total = spots.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(spots),
        None,
        Some(Meta { total }),
    )))
}

/// Delete a spot by id
///
/// Deleting an id that does not exist also succeeds.
#[utoipa::path(
    delete,
    path = "/api/spots/{id}",
    params(
        ("id" = Uuid, Path, description = "Spot ID")
    ),
    responses(
        (status = 200, description = "Spot deleted", body = ApiResponse<bool>),
        (status = 500, description = "Deletion failed")
    ),
    tag = "spots"
)]
pub async fn delete_spot(
    State(service): State<Arc<SpotService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>> {
    service.delete_spot(id).await?;
    Ok(Json(ApiResponse::success(Some(true), None, None)))
}
