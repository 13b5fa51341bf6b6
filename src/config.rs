use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::parser::FieldPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Keep the previous article's value when a field is missing
    #[serde(default)]
    pub carry_over_fields: bool,
    pub api: ApiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_show_tags")]
    pub show_tags: String,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_show_tags() -> String {
    "contributor".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    15_000
}

fn default_read_timeout_ms() -> u64 {
    10_000
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn field_policy(&self) -> FieldPolicy {
        if self.carry_over_fields {
            FieldPolicy::CarryOver
        } else {
            FieldPolicy::Reset
        }
    }
}

impl ApiConfig {
    /// Search URL with the static query parameters appended.
    pub fn request_url(&self) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("show-tags", &self.show_tags)
            .append_pair("api-key", &self.api_key)
            .append_pair("format", &self.format);
        Ok(url.into())
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
        [api]
        endpoint = "https://content.guardianapis.com/search"
        api_key = "test"
    "#;

    #[test]
    fn test_default_timeouts() {
        assert_eq!(default_connect_timeout_ms(), 15_000);
        assert_eq!(default_read_timeout_ms(), 10_000);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            carry_over_fields = true

            [api]
            endpoint = "https://example.com/search"
            api_key = "secret"
            show_tags = "keyword"
            format = "xml"

            [http]
            connect_timeout_ms = 500
            read_timeout_ms = 250

            [server]
            bind = "127.0.0.1:8080"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert!(config.carry_over_fields);
        assert_eq!(config.api.endpoint, "https://example.com/search");
        assert_eq!(config.api.api_key, "secret");
        assert_eq!(config.api.show_tags, "keyword");
        assert_eq!(config.api.format, "xml");
        assert_eq!(config.http.connect_timeout(), Duration::from_millis(500));
        assert_eq!(config.http.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_load_config_with_defaults() {
        let config = Config::from_str(MINIMAL).unwrap();

        assert!(!config.carry_over_fields);
        assert_eq!(config.api.show_tags, "contributor");
        assert_eq!(config.api.format, "json");
        assert_eq!(config.http.connect_timeout_ms, 15_000);
        assert_eq!(config.http.read_timeout_ms, 10_000);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/news.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_api_key() {
        let content = r#"
            [api]
            endpoint = "https://example.com/search"
        "#;

        assert!(Config::from_str(content).is_err());
    }

    #[test]
    fn test_field_policy_from_flag() {
        let mut config = Config::from_str(MINIMAL).unwrap();
        assert_eq!(config.field_policy(), FieldPolicy::Reset);

        config.carry_over_fields = true;
        assert_eq!(config.field_policy(), FieldPolicy::CarryOver);
    }

    mod request_url_tests {
        use super::*;

        #[test]
        fn test_request_url_appends_static_params() {
            let config = Config::from_str(MINIMAL).unwrap();
            let url = config.api.request_url().unwrap();

            assert_eq!(
                url,
                "https://content.guardianapis.com/search?show-tags=contributor&api-key=test&format=json"
            );
        }

        #[test]
        fn test_request_url_keeps_existing_query() {
            let mut config = Config::from_str(MINIMAL).unwrap();
            config.api.endpoint = "https://example.com/search?q=rust".to_string();

            let url = config.api.request_url().unwrap();
            assert!(url.starts_with("https://example.com/search?q=rust&show-tags="));
        }

        #[test]
        fn test_request_url_encodes_key() {
            let mut config = Config::from_str(MINIMAL).unwrap();
            config.api.api_key = "a b&c".to_string();

            let url = config.api.request_url().unwrap();
            assert!(url.contains("api-key=a+b%26c"));
        }

        #[test]
        fn test_request_url_invalid_endpoint() {
            let mut config = Config::from_str(MINIMAL).unwrap();
            config.api.endpoint = "not a url".to_string();

            assert!(config.api.request_url().is_err());
        }
    }
}
