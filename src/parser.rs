use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::article::ArticleRecord;

const KEY_RESPONSE: &str = "response";
const KEY_RESULTS: &str = "results";
const KEY_TOTAL: &str = "total";
// Same key names the article title and the contributor's name.
const KEY_WEB_TITLE: &str = "webTitle";
const KEY_SECTION: &str = "sectionName";
const KEY_PUBLISHED_DATE: &str = "webPublicationDate";
const KEY_WEB_URL: &str = "webUrl";
const KEY_TAGS: &str = "tags";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Missing \"response\" object")]
    MissingResponse,

    #[error("Unexpected document shape: {0}")]
    UnexpectedShape(&'static str),
}

/// What a record gets for a field its source element does not carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Missing fields are empty for every element.
    #[default]
    Reset,
    /// Missing fields keep the value assigned by an earlier element.
    CarryOver,
}

/// String value of `key`; any other JSON type counts as absent.
fn text<'a>(item: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

/// Only the first tag is an author attribution.
fn author(item: &Map<String, Value>) -> Option<&str> {
    item.get(KEY_TAGS)?
        .as_array()?
        .first()?
        .get(KEY_WEB_TITLE)?
        .as_str()
}

fn assign(field: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        *field = value.to_string();
    }
}

/// Parse a response body, logging and swallowing any document-level error.
///
/// An empty, blank or malformed body yields an empty list.
pub fn parse(body: &str, policy: FieldPolicy) -> Vec<ArticleRecord> {
    match extract_articles(body, policy) {
        Ok(articles) => articles,
        Err(e) => {
            error!("Problem parsing the article JSON results: {}", e);
            Vec::new()
        }
    }
}

/// Parse a response body, reporting document-level problems as [`ParseError`].
///
/// A missing `results` key is not an error: it means there is nothing to show.
pub fn extract_articles(body: &str, policy: FieldPolicy) -> Result<Vec<ArticleRecord>, ParseError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(body)?;
    let response = root
        .get(KEY_RESPONSE)
        .filter(|v| v.is_object())
        .ok_or(ParseError::MissingResponse)?;

    if let Some(total) = response.get(KEY_TOTAL).and_then(Value::as_u64) {
        debug!("Response reports {} total results", total);
    }

    let results = match response.get(KEY_RESULTS) {
        Some(Value::Array(results)) => results,
        Some(_) => return Err(ParseError::UnexpectedShape("\"results\" is not an array")),
        None => return Ok(Vec::new()),
    };

    let mut articles = Vec::with_capacity(results.len());
    let mut current = ArticleRecord::default();

    for (index, element) in results.iter().enumerate() {
        let Some(item) = element.as_object() else {
            warn!("Skipping result {}: not a JSON object", index);
            continue;
        };

        if policy == FieldPolicy::Reset {
            current = ArticleRecord::default();
        }

        assign(&mut current.title, text(item, KEY_WEB_TITLE));
        assign(&mut current.section, text(item, KEY_SECTION));
        assign(&mut current.published_date, text(item, KEY_PUBLISHED_DATE));
        assign(&mut current.url, text(item, KEY_WEB_URL));
        assign(&mut current.author, author(item));

        articles.push(current.clone());
    }

    Ok(articles)
}
