use std::time::{Duration, Instant};

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

const CACHE_TTL: Duration = Duration::from_secs(10);

struct Cached {
    url: String,
    fetched_at: Instant,
}

/// The live-stream URL, read from a plain-text document that the couple edit
/// on the day. Empty until the document holds something.
pub struct LiveLink {
    source: Option<String>,
    http: Client,
    ttl: Duration,
    cache: Mutex<Option<Cached>>,
}

impl LiveLink {
    pub fn new(source: Option<String>, http: Client) -> Self {
        Self {
            source,
            http,
            ttl: CACHE_TTL,
            cache: Mutex::new(None),
        }
    }

    /// A failed fetch keeps the previous value and is not retried until the
    /// TTL runs out again.
    pub async fn current(&self) -> String {
        let Some(source) = &self.source else {
            return String::new();
        };

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.url.clone();
            }
        }

        let url = match self.fetch(source).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot read live link from {}: {}", source, e);
                cache.as_ref().map(|c| c.url.clone()).unwrap_or_default()
            }
        };
        *cache = Some(Cached {
            url: url.clone(),
            fetched_at: Instant::now(),
        });
        url
    }

    async fn fetch(&self, source: &str) -> reqwest::Result<String> {
        let text = self
            .http
            .get(source)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text.trim().to_string())
    }
}

pub async fn redirect(State(state): State<AppState>) -> Result<Response, ApiError> {
    let url = state.live.current().await;
    if url.starts_with("http") {
        Ok(Redirect::temporary(&url).into_response())
    } else {
        Ok(Html(state.pages.live_pending(&state.content)?).into_response())
    }
}
