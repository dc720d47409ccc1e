//! View model and the URL resolver shared by cold start and `popstate`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::articles::{ArticleIndex, ArticleRef};
use crate::category::{
    canonical_category, category_to_slug, is_home_category, slug_to_category, slugify,
};
use crate::explanation::ExplanationPayload;
use crate::location::{Location, decode_component, encode_component};
use crate::session::{SessionStore, load_explanation};

pub const EXPLAIN_HASH: &str = "explain";
pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ABOUT_PATH: &str = "/about";
pub const ADMIN_PATH: &str = "/admin";
pub const PRIVACY_PATH: &str = "/privacy";
pub const TERMS_PATH: &str = "/terms";
pub const ARCHIVES_PATH: &str = "/archives";

pub const ARTICLE_PREFIX: &str = "/article/";
const CATEGORY_PREFIX: &str = "/category/";
const TAG_PREFIX: &str = "/tag/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewTag {
    Home,
    Category,
    Article,
    Dashboard,
    Explanation,
    About,
    Admin,
    Privacy,
    Terms,
    Archives,
    #[serde(rename = "tag")]
    TagArchive,
}

impl ViewTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Category => "category",
            Self::Article => "article",
            Self::Dashboard => "dashboard",
            Self::Explanation => "explanation",
            Self::About => "about",
            Self::Admin => "admin",
            Self::Privacy => "privacy",
            Self::Terms => "terms",
            Self::Archives => "archives",
            Self::TagArchive => "tag",
        }
    }
}

/// The page or overlay currently displayed. Exactly one is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewState {
    #[default]
    Home,
    Category {
        label: String,
    },
    Article {
        article: ArticleRef,
    },
    Dashboard,
    Explanation {
        payload: ExplanationPayload,
    },
    About,
    Admin,
    Privacy,
    Terms,
    Archives,
    #[serde(rename = "tag", rename_all = "camelCase")]
    TagArchive {
        tag_slug: String,
    },
}

impl ViewState {
    pub fn tag(&self) -> ViewTag {
        match self {
            Self::Home => ViewTag::Home,
            Self::Category { .. } => ViewTag::Category,
            Self::Article { .. } => ViewTag::Article,
            Self::Dashboard => ViewTag::Dashboard,
            Self::Explanation { .. } => ViewTag::Explanation,
            Self::About => ViewTag::About,
            Self::Admin => ViewTag::Admin,
            Self::Privacy => ViewTag::Privacy,
            Self::Terms => ViewTag::Terms,
            Self::Archives => ViewTag::Archives,
            Self::TagArchive { .. } => ViewTag::TagArchive,
        }
    }

    pub fn canonical_path(&self) -> String {
        match self {
            Self::Home => HOME_PATH.to_string(),
            Self::Category { label } => format!("{CATEGORY_PREFIX}{}", category_to_slug(label)),
            Self::Article { article } => article.path(),
            Self::Dashboard => DASHBOARD_PATH.to_string(),
            Self::Explanation { .. } => format!("{DASHBOARD_PATH}#{EXPLAIN_HASH}"),
            Self::About => ABOUT_PATH.to_string(),
            Self::Admin => ADMIN_PATH.to_string(),
            Self::Privacy => PRIVACY_PATH.to_string(),
            Self::Terms => TERMS_PATH.to_string(),
            Self::Archives => ARCHIVES_PATH.to_string(),
            Self::TagArchive { tag_slug } => {
                format!("{TAG_PREFIX}{}", encode_component(tag_slug))
            }
        }
    }
}

/// Payload stored with each session-history slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub view: ViewTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_slug: Option<String>,
}

/// What a history entry turned back into.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryRestore {
    View(ViewState),
    /// The entry names an article but the index has not arrived yet.
    PendingArticle(String),
    /// The entry cannot be honored; re-resolve from the URL instead.
    Unresolved,
}

impl HistoryEntry {
    fn bare(view: ViewTag) -> Self {
        Self {
            view,
            article_id: None,
            category: None,
            tag_slug: None,
        }
    }

    pub fn for_view(view: &ViewState) -> Self {
        let mut entry = Self::bare(view.tag());
        match view {
            ViewState::Article { article } => entry.article_id = Some(article.id.clone()),
            ViewState::Category { label } => entry.category = Some(label.clone()),
            ViewState::TagArchive { tag_slug } => entry.tag_slug = Some(tag_slug.clone()),
            _ => {}
        }
        entry
    }

    /// Entry for an article deep link whose index lookup is still pending.
    pub fn for_pending_article(identifier: &str) -> Self {
        Self {
            article_id: Some(identifier.to_string()),
            ..Self::bare(ViewTag::Article)
        }
    }

    /// Lenient decode of `history.state`. Anything unexpected, including an
    /// entry missing the field its view needs, yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let entry: Self = serde_json::from_value(value.clone()).ok()?;
        let complete = match entry.view {
            ViewTag::Article => non_blank(entry.article_id.as_deref()),
            ViewTag::Category => non_blank(entry.category.as_deref()),
            ViewTag::TagArchive => non_blank(entry.tag_slug.as_deref()),
            _ => true,
        };
        complete.then_some(entry)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Rebuilds the view this entry was pushed for using only data already
    /// held locally.
    pub fn restore<S>(&self, index: &ArticleIndex, session: &S) -> EntryRestore
    where
        S: SessionStore + ?Sized,
    {
        let view = match self.view {
            ViewTag::Home => ViewState::Home,
            ViewTag::Dashboard => ViewState::Dashboard,
            ViewTag::About => ViewState::About,
            ViewTag::Admin => ViewState::Admin,
            ViewTag::Privacy => ViewState::Privacy,
            ViewTag::Terms => ViewState::Terms,
            ViewTag::Archives => ViewState::Archives,
            ViewTag::Category => {
                let Some(label) = self.category.as_deref() else {
                    return EntryRestore::Unresolved;
                };
                if is_home_category(label) {
                    ViewState::Home
                } else if let Some(label) = canonical_category(label) {
                    ViewState::Category {
                        label: label.to_string(),
                    }
                } else {
                    return EntryRestore::Unresolved;
                }
            }
            ViewTag::TagArchive => {
                let tag_slug = self.tag_slug.as_deref().map(slugify).unwrap_or_default();
                if tag_slug.is_empty() {
                    return EntryRestore::Unresolved;
                }
                ViewState::TagArchive { tag_slug }
            }
            ViewTag::Article => {
                let Some(identifier) = self.article_id.as_deref() else {
                    return EntryRestore::Unresolved;
                };
                if !index.is_loaded() {
                    return EntryRestore::PendingArticle(identifier.to_string());
                }
                match index.resolve(identifier) {
                    Some(article) => ViewState::Article { article },
                    None => return EntryRestore::Unresolved,
                }
            }
            ViewTag::Explanation => match load_explanation(session) {
                Some(payload) => ViewState::Explanation { payload },
                None => return EntryRestore::Unresolved,
            },
        };
        EntryRestore::View(view)
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

/// Outcome of resolving a URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub view: ViewState,
    /// Set when the request arrived in a non-canonical form; the caller
    /// replaces the current history slot with this URL.
    pub canonical_url: Option<String>,
    /// Article identifier awaiting the article index.
    pub pending_article: Option<String>,
}

impl Resolution {
    fn settled(view: ViewState) -> Self {
        Self {
            view,
            canonical_url: None,
            pending_article: None,
        }
    }

    fn canonicalized(view: ViewState, requested: &Location) -> Self {
        let canonical = view.canonical_path();
        let canonical_url = (requested.href() != canonical).then_some(canonical);
        Self {
            view,
            canonical_url,
            pending_article: None,
        }
    }

    fn deferred(identifier: String) -> Self {
        Self {
            view: ViewState::Home,
            canonical_url: None,
            pending_article: Some(identifier),
        }
    }

    /// History entry describing this resolution. A deferred article deep link
    /// is recorded as an article entry so Back/Forward can finish it later.
    pub fn history_entry(&self) -> HistoryEntry {
        match &self.pending_article {
            Some(identifier) => HistoryEntry::for_pending_article(identifier),
            None => HistoryEntry::for_view(&self.view),
        }
    }
}

/// Resolves a browser location to a view.
///
/// Priority: the `#explain` overlay, reserved paths, `/tag`, `/category` and
/// `/article` prefixes, legacy query forms, then Home. Unknown input lands on
/// Home without a rewrite.
pub fn resolve_view_from_location<S>(
    location: &Location,
    index: &ArticleIndex,
    session: &S,
) -> Resolution
where
    S: SessionStore + ?Sized,
{
    if location.hash == EXPLAIN_HASH {
        return match load_explanation(session) {
            Some(payload) => Resolution::canonicalized(ViewState::Explanation { payload }, location),
            None => {
                debug!("explanation deep link without stored payload; showing dashboard");
                Resolution::canonicalized(ViewState::Dashboard, location)
            }
        };
    }

    let path = strip_trailing_slash(&location.path);
    if let Some(view) = reserved_view(path) {
        return Resolution::canonicalized(view, location);
    }
    if let Some(resolution) = resolve_prefixed(path, location, index) {
        return resolution;
    }
    if let Some(resolution) = resolve_legacy_query(location, index) {
        return resolution;
    }
    Resolution::settled(ViewState::Home)
}

fn strip_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn reserved_view(path: &str) -> Option<ViewState> {
    match path {
        DASHBOARD_PATH => Some(ViewState::Dashboard),
        ABOUT_PATH => Some(ViewState::About),
        PRIVACY_PATH => Some(ViewState::Privacy),
        TERMS_PATH => Some(ViewState::Terms),
        ARCHIVES_PATH => Some(ViewState::Archives),
        ADMIN_PATH => Some(ViewState::Admin),
        _ => None,
    }
}

fn resolve_prefixed(path: &str, location: &Location, index: &ArticleIndex) -> Option<Resolution> {
    if let Some(raw) = path.strip_prefix(TAG_PREFIX) {
        let tag_slug = slugify(&decode_component(raw));
        if tag_slug.is_empty() {
            return Some(Resolution::settled(ViewState::Home));
        }
        return Some(Resolution::canonicalized(
            ViewState::TagArchive { tag_slug },
            location,
        ));
    }

    if let Some(raw) = path.strip_prefix(CATEGORY_PREFIX) {
        let slug = decode_component(raw);
        if is_home_category(&slug) {
            return Some(Resolution::canonicalized(ViewState::Home, location));
        }
        return Some(match slug_to_category(&slug) {
            Some(label) => Resolution::canonicalized(
                ViewState::Category {
                    label: label.to_string(),
                },
                location,
            ),
            None => {
                debug!(slug = %slug, "unknown category slug; showing home");
                Resolution::settled(ViewState::Home)
            }
        });
    }

    if let Some(raw) = path.strip_prefix(ARTICLE_PREFIX) {
        return Some(resolve_article(&decode_component(raw), location, index));
    }

    None
}

fn resolve_legacy_query(location: &Location, index: &ArticleIndex) -> Option<Resolution> {
    if location.query_flag("admin") {
        return Some(Resolution::canonicalized(ViewState::Admin, location));
    }

    if let Some(view) = location.query_value("view") {
        let view = match view.to_ascii_lowercase().as_str() {
            "dashboard" => Some(ViewState::Dashboard),
            "about" | "methodology" => Some(ViewState::About),
            "privacy" => Some(ViewState::Privacy),
            "terms" => Some(ViewState::Terms),
            "archives" => Some(ViewState::Archives),
            "admin" => Some(ViewState::Admin),
            _ => None,
        };
        if let Some(view) = view {
            return Some(Resolution::canonicalized(view, location));
        }
    }

    if let Some(label) = location.query_value("category") {
        if is_home_category(label) {
            return Some(Resolution::canonicalized(ViewState::Home, location));
        }
        if let Some(label) = canonical_category(label) {
            return Some(Resolution::canonicalized(
                ViewState::Category {
                    label: label.to_string(),
                },
                location,
            ));
        }
        debug!(category = %label, "unknown legacy category; showing home");
    }

    location
        .query_value("article")
        .map(|identifier| resolve_article(identifier, location, index))
}

fn resolve_article(identifier: &str, location: &Location, index: &ArticleIndex) -> Resolution {
    let identifier = strip_trailing_slash(identifier.trim()).trim_matches('/');
    if identifier.is_empty() {
        return Resolution::settled(ViewState::Home);
    }
    if !index.is_loaded() {
        debug!(identifier, "article index pending; deferring deep link");
        return Resolution::deferred(identifier.to_string());
    }
    match index.resolve(identifier) {
        Some(article) => Resolution::canonicalized(ViewState::Article { article }, location),
        None => {
            debug!(identifier, "deep-linked article not found; showing home");
            Resolution::settled(ViewState::Home)
        }
    }
}
