//! Helpers for turning raw LLM output into typed values.

mod parser;
mod response;

pub use parser::parse_llm_json;
pub use response::LlmResponse;
