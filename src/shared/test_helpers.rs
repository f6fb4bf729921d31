use async_trait::async_trait;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::spots::dtos::{SpotCandidate, SpotDetails};
use crate::features::spots::models::Spot;
use crate::features::spots::store::SpotStore;
use crate::modules::llm::{GenerationRequest, GenerativeModel, GenerativeModelError};

/// The cafe post used throughout the spot tests
pub fn sample_details() -> SpotDetails {
    SpotDetails {
        name: "Blue Bottle".to_string(),
        address: "1-1 Chiyoda, Tokyo".to_string(),
        genre: "cafe".to_string(),
        latitude: 35.681,
        longitude: 139.767,
        description: None,
        tags: Some(vec!["quiet".to_string(), "wifi".to_string()]),
    }
}

pub fn sample_candidate() -> SpotCandidate {
    SpotCandidate::new(sample_details(), "https://example.com/cafe-post")
}

/// A valid candidate with random content and a unique source URL
pub fn fake_candidate() -> SpotCandidate {
    let street: String = StreetName().fake();
    let city: String = CityName().fake();

    let details = SpotDetails {
        name: CompanyName().fake(),
        address: format!("{}, {}", street, city),
        genre: "restaurant".to_string(),
        latitude: (-89.0..89.0).fake::<f64>(),
        longitude: (-179.0..179.0).fake::<f64>(),
        description: None,
        tags: None,
    };

    SpotCandidate::new(details, format!("https://example.com/posts/{}", Uuid::new_v4()))
}

/// Scripted outcome of a [`FakeModel`] call
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Delayed(Duration, String),
    Transport(String),
    Timeout,
}

/// Generative model stand-in that records calls
pub struct FakeModel {
    reply: FakeReply,
    configured: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl FakeModel {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            configured: true,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Behaves like a client without an API key
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(FakeReply::Text(String::new()))
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate_json(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, GenerativeModelError> {
        if !self.configured {
            return Err(GenerativeModelError::MissingApiKey);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            FakeReply::Text(text) => Ok(text.clone()),
            FakeReply::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            FakeReply::Transport(message) => Err(GenerativeModelError::Transport(message.clone())),
            FakeReply::Timeout => Err(GenerativeModelError::Timeout),
        }
    }
}

/// Store whose every operation fails like an unreachable database
pub struct FailingStore;

#[async_trait]
impl SpotStore for FailingStore {
    async fn exists(&self, _source_url: &str) -> Result<bool> {
        Err(AppError::Persistence("connection refused".to_string()))
    }

    async fn create(&self, _candidate: &SpotCandidate) -> Result<Spot> {
        Err(AppError::Persistence("connection refused".to_string()))
    }

    async fn list(&self) -> Result<Vec<Spot>> {
        Err(AppError::Persistence("connection refused".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool> {
        Err(AppError::Persistence("connection refused".to_string()))
    }
}
