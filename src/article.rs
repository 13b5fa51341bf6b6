use serde::Serialize;

/// One news item as returned by the search API.
///
/// Every field is always present; values missing from the response are
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub section: String,
    /// Timestamp exactly as supplied by the API
    pub published_date: String,
    pub url: String,
    pub author: String,
}

impl ArticleRecord {
    pub fn new(
        title: impl Into<String>,
        section: impl Into<String>,
        published_date: impl Into<String>,
        url: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            section: section.into(),
            published_date: published_date.into(),
            url: url.into(),
            author: author.into(),
        }
    }
}
