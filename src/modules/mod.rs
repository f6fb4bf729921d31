//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services like generative models.

pub mod llm;
