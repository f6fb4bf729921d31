//! User-facing messages, one per error class the UI branches on.

/// Extraction failed for a technical reason (model call, malformed output)
pub const MSG_EXTRACTION_FAILED: &str =
    "Failed to extract spot information. Please check the URL and try again.";

/// The model classified the URL content as not being about a place
pub const MSG_NOT_A_PLACE: &str =
    "This URL does not seem to be about a shop or place. Please try a different URL.";

/// The model answered, but with values outside the allowed ranges
pub const MSG_INVALID_PLACE_DATA: &str =
    "The extracted place information was incomplete or invalid. Please try again.";

/// The generative model call exceeded its deadline
pub const MSG_EXTRACTION_TIMEOUT: &str =
    "Extracting spot information took too long. Please try again.";

/// A spot for the same source URL already exists
pub const MSG_ALREADY_SAVED: &str = "This spot has already been saved.";
