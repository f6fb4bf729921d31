use lazy_static::lazy_static;
use reqwest::{Client, Response};
use scraper::{ElementRef, Html, Selector};

use crate::core::config::FetcherConfig;
use crate::core::error::{AppError, Result};
use crate::features::spots::dtos::PageMetadataDto;

lazy_static! {
    static ref OG_TITLE: Selector = Selector::parse(r#"meta[property="og:title"]"#).unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref OG_DESCRIPTION: Selector =
        Selector::parse(r#"meta[property="og:description"]"#).unwrap();
    static ref META_DESCRIPTION: Selector =
        Selector::parse(r#"meta[name="description"]"#).unwrap();
    static ref OG_SITE_NAME: Selector =
        Selector::parse(r#"meta[property="og:site_name"]"#).unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
}

/// Elements whose text never counts as visible body text
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetches pages and scrapes title/description/body hints from them.
///
/// Failures never escape: a page that cannot be fetched simply yields no
/// hints. At most `max_body_bytes` of a page are read, and pages that
/// declare a larger `Content-Length` are not read at all.
pub struct MetadataService {
    client: Client,
    body_text_limit: usize,
    max_body_bytes: usize,
}

impl MetadataService {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            body_text_limit: config.body_text_limit,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetch a page and extract metadata hints, or `None` if anything fails
    pub async fn fetch_metadata(&self, url: &str) -> Option<PageMetadataDto> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error fetching metadata for {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Failed to fetch URL: {} ({})", url, response.status());
            return None;
        }

        if let Some(length) = response
            .content_length()
            .filter(|&length| length > self.max_body_bytes as u64)
        {
            tracing::warn!(
                "Skipping metadata for {}: page is {} bytes (limit {})",
                url,
                length,
                self.max_body_bytes
            );
            return None;
        }

        let body = match read_body_capped(response, self.max_body_bytes).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Error reading page body for {}: {}", url, e);
                return None;
            }
        };

        let body_text_limit = self.body_text_limit;
        let parsed = tokio::task::spawn_blocking(move || {
            parse_page_metadata(&String::from_utf8_lossy(&body), body_text_limit)
        })
        .await;

        let metadata = match parsed {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Metadata parsing task failed for {}: {}", url, e);
                return None;
            }
        };

        tracing::debug!(
            "Fetched metadata for {}: title={:?}, site_name={:?}, body_text_chars={}",
            url,
            metadata.title,
            metadata.site_name,
            metadata.body_text.chars().count()
        );

        Some(metadata)
    }
}

/// Read the response body, stopping once `max_bytes` have been buffered
async fn read_body_capped(mut response: Response, max_bytes: usize) -> reqwest::Result<Vec<u8>> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        let remaining = max_bytes - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            tracing::debug!("Page body truncated at {} bytes", max_bytes);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn element_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visible_text(body: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in body.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });

        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }

    collapse_whitespace(&text)
}

/// Extract metadata hints from an HTML document.
///
/// Fallback chains: title is `og:title` then `<title>`; description is
/// `og:description` then `meta[name=description]`; missing values are empty
/// strings. Body text is capped at `body_text_limit` characters.
pub fn parse_page_metadata(html: &str, body_text_limit: usize) -> PageMetadataDto {
    let document = Html::parse_document(html);

    let title = meta_content(&document, &OG_TITLE)
        .or_else(|| element_text(&document, &TITLE))
        .unwrap_or_default();

    let description = meta_content(&document, &OG_DESCRIPTION)
        .or_else(|| meta_content(&document, &META_DESCRIPTION))
        .unwrap_or_default();

    let site_name = meta_content(&document, &OG_SITE_NAME).unwrap_or_default();

    let body_text = document
        .select(&BODY)
        .next()
        .map(visible_text)
        .unwrap_or_default()
        .chars()
        .take(body_text_limit)
        .collect();

    PageMetadataDto {
        title,
        description,
        site_name,
        body_text,
    }
}
