use std::env;

pub const DEFAULT_ARTICLES_ENDPOINT: &str = "/api/articles";
pub const DEFAULT_LISTING_ANCHOR_ID: &str = "latest-articles";
pub const DEFAULT_LOG_FILTER: &str = "warn";
pub const ENV_ARTICLES_ENDPOINT: &str = "PLANETARY_BRIEF_ARTICLES_ENDPOINT";
pub const ENV_LISTING_ANCHOR: &str = "PLANETARY_BRIEF_LISTING_ANCHOR";
pub const ENV_LOG_FILTER: &str = "PLANETARY_BRIEF_LOG_FILTER";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("articles endpoint must not be empty")]
    EmptyArticlesEndpoint,
    #[error("articles endpoint '{value}' must be a root-relative path or an http(s) url")]
    InvalidArticlesEndpoint { value: String },
    #[error("listing anchor id '{value}' must not contain whitespace")]
    InvalidListingAnchor { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub articles_endpoint: String,
    /// Element id of the article listing that search scrolls to.
    pub listing_anchor_id: String,
    pub log_filter: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            articles_endpoint: DEFAULT_ARTICLES_ENDPOINT.to_string(),
            listing_anchor_id: DEFAULT_LISTING_ANCHOR_ID.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RouterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(endpoint) = env_non_empty(ENV_ARTICLES_ENDPOINT) {
            config.articles_endpoint = endpoint;
        }
        if let Some(anchor) = env_non_empty(ENV_LISTING_ANCHOR) {
            config.listing_anchor_id = anchor;
        }
        if let Some(filter) = env_non_empty(ENV_LOG_FILTER) {
            config.log_filter = filter;
        }
        config.validated()
    }

    /// Normalizes and checks every field.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.articles_endpoint = normalize_articles_endpoint(&self.articles_endpoint)?;
        let anchor = self.listing_anchor_id.trim().trim_start_matches('#');
        if anchor.is_empty() {
            self.listing_anchor_id = DEFAULT_LISTING_ANCHOR_ID.to_string();
        } else if anchor.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidListingAnchor {
                value: anchor.to_string(),
            });
        } else {
            self.listing_anchor_id = anchor.to_string();
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = DEFAULT_LOG_FILTER.to_string();
        }
        Ok(self)
    }
}

pub fn normalize_articles_endpoint(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyArticlesEndpoint);
    }
    if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        return Ok(trimmed.to_string());
    }
    let has_host = trimmed
        .split_once("://")
        .is_some_and(|(scheme, rest)| {
            matches!(scheme, "http" | "https") && !rest.is_empty() && !rest.starts_with('/')
        });
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidArticlesEndpoint {
            value: trimmed.to_string(),
        })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_and_absolute_endpoints_are_accepted() {
        assert_eq!(
            normalize_articles_endpoint(" /api/articles ").as_deref(),
            Ok("/api/articles")
        );
        assert_eq!(
            normalize_articles_endpoint("https://api.planetarybrief.com/articles").as_deref(),
            Ok("https://api.planetarybrief.com/articles")
        );
    }

    #[test]
    fn malformed_endpoints_are_rejected() {
        assert_eq!(
            normalize_articles_endpoint(""),
            Err(ConfigError::EmptyArticlesEndpoint)
        );
        for raw in ["api/articles", "//cdn.example/articles", "ftp://host/a", "https:///x"] {
            assert!(
                matches!(
                    normalize_articles_endpoint(raw),
                    Err(ConfigError::InvalidArticlesEndpoint { .. })
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn validated_normalizes_anchor_and_filter() {
        let config = RouterConfig {
            articles_endpoint: "/api/articles".to_string(),
            listing_anchor_id: "#results".to_string(),
            log_filter: " ".to_string(),
        }
        .validated()
        .expect("valid config");
        assert_eq!(config.listing_anchor_id, "results");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);

        let error = RouterConfig {
            listing_anchor_id: "latest articles".to_string(),
            ..RouterConfig::default()
        }
        .validated()
        .expect_err("whitespace anchor rejected");
        assert!(matches!(error, ConfigError::InvalidListingAnchor { .. }));
    }
}
