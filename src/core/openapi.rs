use utoipa::{Modify, OpenApi};

use crate::features::spots::{dtos as spots_dtos, handlers as spots_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Spots
        spots_handlers::extract_spot,
        spots_handlers::save_spot,
        spots_handlers::list_spots,
        spots_handlers::delete_spot,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Spots
            spots_dtos::SpotDetails,
            spots_dtos::SpotCandidate,
            spots_dtos::ExtractSpotRequestDto,
            spots_dtos::SpotResponseDto,
            ApiResponse<spots_dtos::SpotCandidate>,
            ApiResponse<spots_dtos::SpotResponseDto>,
            ApiResponse<Vec<spots_dtos::SpotResponseDto>>,
            ApiResponse<bool>,
        )
    ),
    tags(
        (name = "spots", description = "Extract, save, list and delete place spots"),
    ),
    info(
        title = "Spot Clipper API",
        version = "0.1.0",
        description = "API documentation for Spot Clipper",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_spot_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/spots"));
        assert!(doc.paths.paths.contains_key("/api/spots/extract"));
        assert!(doc.paths.paths.contains_key("/api/spots/{id}"));
        assert!(!doc.paths.paths.contains_key("/api/spots/metadata"));
    }

    #[test]
    fn test_swagger_info_modifier_overrides_info() {
        let mut doc = ApiDoc::openapi();
        let modifier = SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "Custom docs".to_string(),
        };

        modifier.modify(&mut doc);

        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Custom docs"));
    }
}
