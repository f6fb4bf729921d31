//! Spot clipping: turn a URL about a place into a saved, geolocated spot.
//!
//! Extraction asks a generative model for schema-shaped JSON (optionally
//! enriched with hints scraped from the page), the client confirms or edits
//! the candidate, and saving goes through the duplicate guard into the store.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/spots/extract` | Extract a spot candidate from a URL |
//! | POST | `/api/spots` | Save a confirmed candidate |
//! | GET | `/api/spots` | List saved spots, newest first |
//! | DELETE | `/api/spots/{id}` | Delete a spot (idempotent) |
//! | GET | `/api/spots/metadata` | Preview page metadata hints for a URL |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::{ExtractionService, MetadataService, SpotService};
