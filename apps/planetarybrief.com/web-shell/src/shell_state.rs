use planetary_brief_app_state::location::decode_component;
use planetary_brief_app_state::{
    Article, ConfigError, NavigationOutcome, NavigationRequest, Navigator, RouterConfig,
    SearchOutcome, ViewState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("browser window is unavailable")]
    WindowUnavailable,
    #[error("navigation has not been booted")]
    NotBooted,
    #[error("unknown navigation target kind '{kind}'")]
    UnknownNavigationKind { kind: String },
    #[error("navigation target '{kind}' requires a value")]
    MissingNavigationTarget { kind: String },
    #[error("invalid explanation payload: {reason}")]
    InvalidExplanation { reason: String },
    #[error("article request failed: {reason}")]
    ArticleFetch { reason: String },
    #[error("article request returned status {status}")]
    ArticleStatus { status: u16 },
    #[error("failed to decode article feed: {reason}")]
    ArticleDecode { reason: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct BootDiagnostics {
    pub(crate) phase: String,
    pub(crate) detail: String,
    pub(crate) articles_endpoint: Option<String>,
    pub(crate) article_count: usize,
    pub(crate) view: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) last_error: Option<String>,
}

/// Router config for the shell. The page may override the articles endpoint
/// through `window.__PB_ARTICLES_ENDPOINT__`.
pub fn router_config_with_override(
    endpoint_override: Option<&str>,
) -> Result<RouterConfig, ConfigError> {
    let mut config = RouterConfig::default();
    if let Some(endpoint) = endpoint_override
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
    {
        config.articles_endpoint = endpoint.to_string();
    }
    config.validated()
}

/// Maps the `(kind, value)` pair the page passes to `navigate_to`.
pub fn parse_navigation_request(
    kind: &str,
    value: Option<&str>,
) -> Result<NavigationRequest, ShellError> {
    let kind = kind.trim().to_ascii_lowercase();
    let value = value.map(str::trim).filter(|value| !value.is_empty());
    let required = || {
        value
            .map(ToString::to_string)
            .ok_or_else(|| ShellError::MissingNavigationTarget { kind: kind.clone() })
    };
    match kind.as_str() {
        "home" => Ok(NavigationRequest::Home),
        "category" => required().map(NavigationRequest::Category),
        "article" => required().map(NavigationRequest::Article),
        "tag" => required().map(NavigationRequest::Tag),
        "dashboard" => Ok(NavigationRequest::Dashboard),
        "about" | "methodology" => Ok(NavigationRequest::About),
        "admin" => Ok(NavigationRequest::Admin),
        "privacy" => Ok(NavigationRequest::Privacy),
        "terms" => Ok(NavigationRequest::Terms),
        "archives" => Ok(NavigationRequest::Archives),
        _ => Err(ShellError::UnknownNavigationKind { kind: kind.clone() }),
    }
}

/// Navigation request for an in-app link, or `None` when the path is not
/// one of the client's canonical routes.
pub fn request_for_link_path(path: &str) -> Option<NavigationRequest> {
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    let segment = |raw: &str| {
        let decoded = decode_component(raw).trim().to_string();
        (!decoded.is_empty() && !decoded.contains('/')).then_some(decoded)
    };
    match path {
        "/" => Some(NavigationRequest::Home),
        "/dashboard" => Some(NavigationRequest::Dashboard),
        "/about" => Some(NavigationRequest::About),
        "/admin" => Some(NavigationRequest::Admin),
        "/privacy" => Some(NavigationRequest::Privacy),
        "/terms" => Some(NavigationRequest::Terms),
        "/archives" => Some(NavigationRequest::Archives),
        _ => {
            if let Some(raw) = path.strip_prefix("/category/") {
                segment(raw).map(NavigationRequest::Category)
            } else if let Some(raw) = path.strip_prefix("/article/") {
                segment(raw).map(NavigationRequest::Article)
            } else if let Some(raw) = path.strip_prefix("/tag/") {
                segment(raw).map(NavigationRequest::Tag)
            } else {
                None
            }
        }
    }
}

pub fn navigation_outcome_label(outcome: NavigationOutcome) -> &'static str {
    match outcome {
        NavigationOutcome::Pushed => "pushed",
        NavigationOutcome::Replaced => "replaced",
        NavigationOutcome::Unchanged => "unchanged",
        NavigationOutcome::Ignored => "ignored",
    }
}

pub fn search_outcome_label(outcome: SearchOutcome) -> &'static str {
    match outcome {
        SearchOutcome::Idle => "idle",
        SearchOutcome::SwitchedHome => "switched_home",
        SearchOutcome::ScrolledToResults => "scrolled_to_results",
        SearchOutcome::AlreadyVisible => "already_visible",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewSnapshot<'a> {
    #[serde(flatten)]
    view: &'a ViewState,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    article: Option<&'a Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_article: Option<&'a str>,
    articles_loaded: bool,
    search_query: &'a str,
}

/// JSON handed to view-change subscribers.
pub fn view_snapshot_json(navigator: &Navigator, url: &str) -> String {
    let snapshot = ViewSnapshot {
        view: navigator.view(),
        url,
        article: navigator.current_article(),
        pending_article: navigator.pending_article(),
        articles_loaded: navigator.article_index().is_loaded(),
        search_query: navigator.search_query(),
    };
    serde_json::to_string(&snapshot).unwrap_or_else(|_| "{\"view\":\"home\"}".to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArticleFeed {
    List(Vec<Article>),
    Articles { articles: Vec<Article> },
    Data { data: Vec<Article> },
}

/// Decodes the articles endpoint body: a bare array, or an object wrapping
/// the array under `articles` or `data`.
pub fn decode_article_feed(body: &str) -> Result<Vec<Article>, ShellError> {
    let feed: ArticleFeed =
        serde_json::from_str(body).map_err(|error| ShellError::ArticleDecode {
            reason: error.to_string(),
        })?;
    Ok(match feed {
        ArticleFeed::List(articles)
        | ArticleFeed::Articles { articles }
        | ArticleFeed::Data { data: articles } => articles,
    })
}
