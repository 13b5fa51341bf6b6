use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::article::ArticleRecord;
use crate::config::HttpConfig;
use crate::parser::{self, FieldPolicy};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Error response code: {0}")]
    BadStatus(u16),

    #[error("Problem retrieving the news JSON results: {0}")]
    Io(#[from] reqwest::Error),
}

/// Fetch-then-parse pipeline plus the most recently loaded article list.
pub struct Fetcher {
    client: Client,
    policy: FieldPolicy,
    articles: RwLock<Arc<Vec<ArticleRecord>>>,
    loading: AtomicBool,
}

/// Clears the loading flag however the load ends, including cancellation.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Fetcher {
    pub fn new(http: &HttpConfig, policy: FieldPolicy) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(http.connect_timeout())
            .read_timeout(http.read_timeout())
            // No idle connections survive a request.
            .pool_max_idle_per_host(0)
            .user_agent("NewsApp/1.0")
            .build()?;

        Ok(Self {
            client,
            policy,
            articles: RwLock::new(Arc::new(Vec::new())),
            loading: AtomicBool::new(false),
        })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// The list installed by the last completed load.
    pub async fn articles(&self) -> Arc<Vec<ArticleRecord>> {
        self.articles.read().await.clone()
    }

    /// Single GET attempt. The body is only read for a 200 response.
    ///
    /// A 200 with an empty body is `Ok("")`, which parses to no articles.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| {
            warn!("Problem building the URL '{}': {}", url, e);
            FetchError::InvalidUrl(url.to_string())
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetch and parse. Every failure is logged and yields an empty list.
    pub async fn load_articles(&self, url: &str) -> Vec<ArticleRecord> {
        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch articles: {}", e);
                return Vec::new();
            }
        };

        parser::parse(&body, self.policy)
    }

    /// Load articles and replace the installed list.
    ///
    /// Returns `false` without doing anything if a load is already running.
    pub async fn refresh_articles(&self, url: &str) -> bool {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Load already in progress, skipping");
            return false;
        }
        let _guard = LoadingGuard(&self.loading);

        let articles = self.load_articles(url).await;
        info!("Loaded {} articles", articles.len());

        *self.articles.write().await = Arc::new(articles);
        true
    }
}
