//! Cover generation: pick a random meme and embed it as a book's cover.
//!
//! The generator only mutates the [`Book`] it is handed; persisting the new
//! cover is the caller's job (see [`super::queue`]).

use std::path::Path;
use std::sync::Mutex;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::config::Config;
use crate::models::Book;

pub const DEFAULT_MEME_API_URL: &str = "https://api.imgflip.com/get_memes";

#[derive(Debug, Deserialize)]
struct MemesResponse {
    data: MemesData,
}

#[derive(Debug, Deserialize)]
struct MemesData {
    memes: Vec<Meme>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meme {
    pub url: String,
}

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("Cannot call meme API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Meme API returned status {0}")]
    UpstreamStatus(StatusCode),

    #[error("Invalid JSON from meme API: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Meme API returned an empty meme list")]
    EmptyList,

    #[error("Cannot fetch meme image {url}: {source}")]
    ImageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Meme image {url} returned status {status}")]
    ImageStatus { url: String, status: StatusCode },

    #[error("Meme image {0} is empty")]
    EmptyImage(String),

    #[error("Cannot determine image type of {0}")]
    UnknownImageType(String),
}

pub struct CoverGenerator {
    client: reqwest::Client,
    endpoint: String,
    rng: Mutex<StdRng>,
}

impl CoverGenerator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self::with_rng(client, endpoint, StdRng::from_entropy())
    }

    /// Deterministic meme selection, for reproducible runs
    pub fn with_seed(client: reqwest::Client, endpoint: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(client, endpoint, StdRng::seed_from_u64(seed))
    }

    fn with_rng(client: reqwest::Client, endpoint: impl Into<String>, rng: StdRng) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.cover_http_timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self::new(client, config.meme_api_url.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Replace `book.cover` with a random meme encoded as a data URI.
    ///
    /// On any error the book is left untouched.
    pub async fn generate(&self, book: &mut Book) -> Result<(), CoverError> {
        let memes = self.fetch_memes().await?;
        let meme = self.pick(&memes).ok_or(CoverError::EmptyList)?;

        let (bytes, content_type) = self.fetch_image(&meme.url).await?;
        let extension = image_extension(&meme.url)
            .or_else(|| content_type.as_deref().and_then(image_subtype))
            .ok_or_else(|| CoverError::UnknownImageType(meme.url.clone()))?;

        tracing::debug!(
            "Cover for book {} from {} ({} bytes)",
            book.id,
            meme.url,
            bytes.len()
        );
        book.cover = Some(data_uri(&extension, &bytes));
        Ok(())
    }

    async fn fetch_memes(&self) -> Result<Vec<Meme>, CoverError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(CoverError::Transport)?;

        if !response.status().is_success() {
            return Err(CoverError::UpstreamStatus(response.status()));
        }

        let body = response.bytes().await.map_err(CoverError::Transport)?;
        let parsed: MemesResponse = serde_json::from_slice(&body).map_err(CoverError::Decode)?;

        Ok(parsed.data.memes)
    }

    fn pick<'a>(&self, memes: &'a [Meme]) -> Option<&'a Meme> {
        if memes.is_empty() {
            return None;
        }
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0..memes.len())
        };
        memes.get(index)
    }

    async fn fetch_image(&self, url: &str) -> Result<(Vec<u8>, Option<String>), CoverError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CoverError::ImageFetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverError::ImageStatus {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|source| CoverError::ImageFetch {
                url: url.to_string(),
                source,
            })?;

        if bytes.is_empty() {
            return Err(CoverError::EmptyImage(url.to_string()));
        }

        Ok((bytes.to_vec(), content_type))
    }
}

/// File extension of the URL's path (`https://i.imgflip.com/1bij.jpg?x=1` gives `jpg`)
pub fn image_extension(image_url: &str) -> Option<String> {
    let parsed = url::Url::parse(image_url).ok()?;
    let extension = Path::new(parsed.path()).extension()?.to_str()?;

    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(extension.to_string())
}

// `image/png; charset=binary` gives `png`
fn image_subtype(content_type: &str) -> Option<String> {
    let mime = content_type.split(';').next()?.trim();
    let subtype = mime.strip_prefix("image/")?;

    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(subtype.to_string())
}

pub fn data_uri(extension: &str, bytes: &[u8]) -> String {
    format!("data:image/{};base64,{}", extension, STANDARD.encode(bytes))
}
