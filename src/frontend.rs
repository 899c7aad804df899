//! Browser-facing proxy: serves the catalog page and relays the first page
//! of the book listing from the API.

use std::env;
use std::path::PathBuf;

use axum::{Json, Router, extract::State, routing::get};
use serde_json::Value;
use tower_http::services::ServeFile;

use crate::api::error::ApiError;

pub const PROXY_PAGE: u64 = 1;
pub const PROXY_ITEMS_PER_PAGE: u64 = 30;

#[derive(Clone, Debug)]
pub struct FrontendConfig {
    pub port: u16,
    /// Base URL of the catalog API, e.g. `http://localhost:8000/api`
    pub api_url: String,
    pub index_path: PathBuf,
}

impl FrontendConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: lookup("FRONTEND_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            api_url: lookup("API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:8000/api".to_string()),
            index_path: lookup("FRONTEND_INDEX")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static/index.html")),
        }
    }
}

#[derive(Clone)]
pub struct FrontendState {
    client: reqwest::Client,
    api_url: String,
}

impl FrontendState {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

pub fn frontend_router(state: FrontendState, index_path: PathBuf) -> Router {
    Router::new()
        .route("/books", get(proxy_books))
        .route_service("/", ServeFile::new(index_path))
        .with_state(state)
}

async fn proxy_books(State(state): State<FrontendState>) -> Result<Json<Value>, ApiError> {
    let url = format!(
        "{}/books?page={}&itemsPerPage={}",
        state.api_url, PROXY_PAGE, PROXY_ITEMS_PER_PAGE
    );

    let response = state
        .client
        .get(&url)
        .send()
        .await
        .map_err(|e| ApiError::BadGateway(format!("Cannot reach catalog API: {}", e)))?;

    if !response.status().is_success() {
        return Err(ApiError::BadGateway(format!(
            "Catalog API returned status: {}",
            response.status()
        )));
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::BadGateway(format!("Invalid JSON from catalog API: {}", e)))?;

    Ok(Json(body))
}
