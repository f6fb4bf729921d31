mod extraction_service;
mod metadata_service;
mod spot_service;

pub use extraction_service::ExtractionService;
pub use metadata_service::MetadataService;
pub use spot_service::SpotService;
