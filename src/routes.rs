use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::DateTime;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::article::ArticleRecord;
use crate::connectivity;
use crate::fetcher::Fetcher;

const NO_NEWS: &str = "No news found.";
const NO_CONNECTION: &str = "No internet connection.";
const LOADING: &str = "Loading...";

pub struct AppState {
    pub fetcher: Arc<Fetcher>,
    pub request_url: String,
    pub probe_timeout: Duration,
    online: AtomicBool,
}

impl AppState {
    pub fn new(fetcher: Arc<Fetcher>, request_url: String, probe_timeout: Duration) -> Self {
        Self {
            fetcher,
            request_url,
            probe_timeout,
            online: AtomicBool::new(true),
        }
    }

    /// Result of the last connectivity pre-flight.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/refresh", post(refresh))
        .route("/refresh/status", get(refresh_status))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Check connectivity, then load and install articles if the API host is reachable.
///
/// Does nothing while another load is running, leaving the last probe result alone.
pub async fn load_in_background(state: Arc<AppState>) -> bool {
    if state.fetcher.is_loading() {
        info!("Load already in progress, skipping connectivity check");
        return false;
    }

    let online = connectivity::is_online(&state.request_url, state.probe_timeout).await;
    state.online.store(online, Ordering::SeqCst);

    if !online {
        warn!("No internet connection, skipping article load");
        return false;
    }

    state.fetcher.refresh_articles(&state.request_url).await
}

/// Display form of an [`ArticleRecord`].
pub struct ArticleView {
    pub title: String,
    pub section: String,
    pub author: String,
    pub url: String,
    pub date: String,
    pub time: String,
}

impl From<&ArticleRecord> for ArticleView {
    fn from(article: &ArticleRecord) -> Self {
        let (date, time) = split_timestamp(&article.published_date);
        Self {
            title: article.title.clone(),
            section: article.section.clone(),
            author: article.author.clone(),
            url: article.url.clone(),
            date,
            time,
        }
    }
}

/// "2020-01-01T09:30:00Z" becomes ("2020-01-01", "09:30"); anything else is shown as-is.
fn split_timestamp(raw: &str) -> (String, String) {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => (
            dt.format("%Y-%m-%d").to_string(),
            dt.format("%H:%M").to_string(),
        ),
        Err(_) => (raw.to_string(), String::new()),
    }
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub articles: Vec<ArticleView>,
    pub empty_message: &'static str,
    pub refreshing: bool,
}

#[derive(Template)]
#[template(path = "refresh_button.html")]
pub struct RefreshButtonTemplate {
    pub refreshing: bool,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let articles = state.fetcher.articles().await;
    let refreshing = state.fetcher.is_loading();

    let empty_message = if !state.is_online() {
        NO_CONNECTION
    } else if refreshing {
        LOADING
    } else {
        NO_NEWS
    };

    HtmlTemplate(IndexTemplate {
        articles: articles.iter().map(ArticleView::from).collect(),
        empty_message,
        refreshing,
    })
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tokio::spawn(load_in_background(state));

    // Return refreshing state immediately
    HtmlTemplate(RefreshButtonTemplate { refreshing: true })
}

#[derive(Deserialize)]
pub struct StatusQuery {
    /// Set by the polling button; asks for a page reload once loading ends
    #[serde(default)]
    pub poll: bool,
}

pub async fn refresh_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let refreshing = state.fetcher.is_loading();
    let button = HtmlTemplate(RefreshButtonTemplate { refreshing });

    if query.poll && !refreshing {
        ([("HX-Refresh", "true")], button).into_response()
    } else {
        button.into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
