//! Prompt template management module.
//!
//! Templates use Jinja2 syntax and ship with the binary; see [`engine`] for
//! the on-disk override rules.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use serde::Serialize;
use std::collections::HashMap;

/// Page hints embedded into the extraction prompt
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptPageHints<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub site_name: &'a str,
    pub body_text: &'a str,
}

impl PromptPageHints<'_> {
    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.site_name.is_empty()
            && self.body_text.is_empty()
    }
}

/// Render the spot extraction system prompt with the expected JSON schema.
pub fn render_spot_extraction_system_prompt(json_schema: &str) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("json_schema", Value::from(json_schema));

    render_template("spot_extraction/system.jinja", &ctx)
}

/// Render the spot extraction user prompt for a URL, optionally enriched with
/// fetched page hints.
pub fn render_spot_extraction_user_prompt(
    url: &str,
    hints: Option<&PromptPageHints<'_>>,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("url", Value::from(url));
    if let Some(hints) = hints.filter(|h| !h.is_empty()) {
        ctx.insert("metadata", Value::from_serialize(hints));
    }

    render_template("spot_extraction/user.jinja", &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_schema_and_refusal_rule() {
        let prompt = render_spot_extraction_system_prompt(r#"{"type":"object"}"#).unwrap();

        assert!(prompt.contains(r#"{"type":"object"}"#));
        assert!(prompt.contains("empty strings for name, address and genre"));
        assert!(!prompt.contains("\"error\""));
        assert!(prompt.contains("latitude"));
    }

    #[test]
    fn test_user_prompt_without_hints() {
        let prompt =
            render_spot_extraction_user_prompt("https://example.com/cafe-post", None).unwrap();

        assert!(prompt.contains("URL: https://example.com/cafe-post"));
        assert!(!prompt.contains("Page information"));
    }

    #[test]
    fn test_user_prompt_with_hints() {
        let hints = PromptPageHints {
            title: "Blue Bottle Coffee",
            description: "",
            site_name: "Instagram",
            body_text: "Great pour-over near Tokyo station",
        };

        let prompt =
            render_spot_extraction_user_prompt("https://example.com/cafe-post", Some(&hints))
                .unwrap();

        assert!(prompt.contains("- Title: Blue Bottle Coffee"));
        assert!(prompt.contains("- Site name: Instagram"));
        assert!(prompt.contains("Great pour-over"));
        assert!(!prompt.contains("- Description:"));
    }

    #[test]
    fn test_user_prompt_ignores_empty_hints() {
        let hints = PromptPageHints::default();

        let prompt =
            render_spot_extraction_user_prompt("https://example.com/x", Some(&hints)).unwrap();

        assert!(!prompt.contains("Page information"));
    }
}
