//! The navigation state machine.
//!
//! Every trigger (cold start, user navigation, article index arrival,
//! `popstate`) goes through a [`Navigator`] method that updates the view
//! synchronously, performs at most one history push or replace, and leaves a
//! [`PostRenderEffect`] for the shell to run once the new view has painted.

use tracing::{debug, info, warn};

use crate::articles::{Article, ArticleIndex};
use crate::category::{canonical_category, is_home_category, slugify};
use crate::config::RouterConfig;
use crate::environment::NavigationEnvironment;
use crate::explanation::ExplanationPayload;
use crate::location::{Location, encode_component};
use crate::route::{
    ARTICLE_PREFIX, DASHBOARD_PATH, EntryRestore, HistoryEntry, Resolution, ViewState,
    resolve_view_from_location,
};
use crate::session::{
    ScrollCheckpoint, load_dashboard_checkpoint, save_dashboard_checkpoint, save_explanation,
};

/// User-initiated navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    Home,
    /// Any accepted category spelling; `All` and `Discover` mean Home.
    Category(String),
    /// Article slug or id.
    Article(String),
    Tag(String),
    Dashboard,
    About,
    Admin,
    Privacy,
    Terms,
    Archives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Pushed,
    Replaced,
    /// The target equals the current view; history untouched.
    Unchanged,
    /// The request does not apply to the current view.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; nothing happens.
    Idle,
    SwitchedHome,
    ScrolledToResults,
    /// Already on Home with the listing visible (or absent).
    AlreadyVisible,
}

/// Work to run once the view change has rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRenderEffect {
    ScrollToTop,
    RestoreScroll(i32),
    ScrollToElement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    ColdStart,
    Popstate,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    view: ViewState,
    index: ArticleIndex,
    pending_article: Option<String>,
    pending_effect: Option<PostRenderEffect>,
    search_query: String,
    config: RouterConfig,
}

impl Navigator {
    /// Cold start: resolves the initial URL, rewrites non-canonical forms in
    /// place and makes sure the current slot carries an entry, so the first
    /// Back press has a target inside the app.
    pub fn start<E>(env: &mut E, config: RouterConfig) -> Self
    where
        E: NavigationEnvironment + ?Sized,
    {
        env.disable_native_scroll_restoration();
        let mut navigator = Self {
            view: ViewState::Home,
            index: ArticleIndex::pending(),
            pending_article: None,
            pending_effect: None,
            search_query: String::new(),
            config,
        };
        let location = env.location();
        let resolution = resolve_view_from_location(&location, &navigator.index, &*env);
        navigator.apply_resolution(env, resolution, &location, Trigger::ColdStart);
        navigator
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn article_index(&self) -> &ArticleIndex {
        &self.index
    }

    /// Deep-linked article identifier still waiting for the index.
    pub fn pending_article(&self) -> Option<&str> {
        self.pending_article.as_deref()
    }

    pub fn pending_effect(&self) -> Option<&PostRenderEffect> {
        self.pending_effect.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The full article record behind the current Article view.
    pub fn current_article(&self) -> Option<&Article> {
        match &self.view {
            ViewState::Article { article } => self.index.get(article),
            _ => None,
        }
    }

    pub fn navigate<E>(&mut self, env: &mut E, request: NavigationRequest) -> NavigationOutcome
    where
        E: NavigationEnvironment + ?Sized,
    {
        if let NavigationRequest::Article(identifier) = &request {
            let identifier = identifier.trim();
            if !self.index.is_loaded() && !identifier.is_empty() {
                return self.defer_article(env, identifier);
            }
        }

        let target = self.target_view(&request);
        self.pending_article = None;
        if target == self.view && env.location().href() == target.canonical_path() {
            debug!(view = target.tag().as_str(), "navigation restates current view");
            return NavigationOutcome::Unchanged;
        }
        self.push_view(env, target, PostRenderEffect::ScrollToTop);
        NavigationOutcome::Pushed
    }

    /// Article request made before the index arrived: the entry and URL name
    /// the article now and `articles_loaded` settles the view.
    fn defer_article<E>(&mut self, env: &mut E, identifier: &str) -> NavigationOutcome
    where
        E: NavigationEnvironment + ?Sized,
    {
        let url = pending_article_path(identifier);
        if self.pending_article.as_deref() == Some(identifier) && env.location().href() == url {
            return NavigationOutcome::Unchanged;
        }
        if self.view == ViewState::Dashboard {
            self.remember_dashboard_scroll(env);
        }
        env.push_history(&HistoryEntry::for_pending_article(identifier), &url);
        debug!(identifier, "article requested before index load; deferring");
        self.view = ViewState::Home;
        self.pending_article = Some(identifier.to_string());
        self.pending_effect = Some(PostRenderEffect::ScrollToTop);
        NavigationOutcome::Pushed
    }

    /// Opens the explanation overlay on top of the dashboard.
    pub fn open_explanation<E>(
        &mut self,
        env: &mut E,
        payload: ExplanationPayload,
    ) -> NavigationOutcome
    where
        E: NavigationEnvironment + ?Sized,
    {
        if self.view != ViewState::Dashboard {
            warn!(
                view = self.view.tag().as_str(),
                "explanation panels open only from the dashboard"
            );
            return NavigationOutcome::Ignored;
        }
        env.replace_history(&HistoryEntry::for_view(&ViewState::Dashboard), DASHBOARD_PATH);
        self.remember_dashboard_scroll(env);
        if let Err(error) = save_explanation(env, &payload) {
            warn!(%error, "explanation payload not persisted; back navigation will not restore it");
        }
        let view = ViewState::Explanation { payload };
        env.push_history(&HistoryEntry::for_view(&view), &view.canonical_path());
        self.view = view;
        self.pending_effect = Some(PostRenderEffect::ScrollToTop);
        NavigationOutcome::Pushed
    }

    /// Dismisses the overlay in place and returns to the saved dashboard
    /// scroll position.
    pub fn close_explanation<E>(&mut self, env: &mut E) -> NavigationOutcome
    where
        E: NavigationEnvironment + ?Sized,
    {
        if !matches!(self.view, ViewState::Explanation { .. }) {
            return NavigationOutcome::Ignored;
        }
        env.replace_history(&HistoryEntry::for_view(&ViewState::Dashboard), DASHBOARD_PATH);
        self.view = ViewState::Dashboard;
        self.pending_effect = Some(arrival_effect(&self.view, env));
        NavigationOutcome::Replaced
    }

    /// Back/Forward. `entry` is the decoded `history.state`; `None` when the
    /// browser supplied nothing usable.
    pub fn handle_popstate<E>(&mut self, env: &mut E, entry: Option<HistoryEntry>)
    where
        E: NavigationEnvironment + ?Sized,
    {
        let previous_pending = self.pending_article.take();
        let without_payload = entry.is_none();
        let restored = entry.map(|entry| entry.restore(&self.index, &*env));
        match restored {
            Some(EntryRestore::View(view)) => {
                debug!(view = view.tag().as_str(), "restored view from history entry");
                self.view = view;
            }
            Some(EntryRestore::PendingArticle(identifier)) => {
                self.view = ViewState::Home;
                self.pending_article = Some(identifier);
            }
            Some(EntryRestore::Unresolved) | None => {
                let location = env.location();
                let resolution = resolve_view_from_location(&location, &self.index, &*env);
                // A payload-less popstate into the same view is an in-page
                // fragment jump; the browser already scrolled to it.
                if without_payload
                    && resolution.view == self.view
                    && resolution.pending_article == previous_pending
                {
                    debug!(hash = %location.hash, "fragment change within current view");
                    self.pending_article = previous_pending;
                    self.pending_effect = None;
                    return;
                }
                debug!(url = %location.href(), "history entry unusable; resolving from url");
                self.apply_resolution(env, resolution, &location, Trigger::Popstate);
            }
        }
        self.pending_effect = Some(arrival_effect(&self.view, env));
    }

    /// Wholesale index refresh, then completion of any deferred deep link.
    pub fn articles_loaded<E>(&mut self, env: &mut E, articles: Vec<Article>)
    where
        E: NavigationEnvironment + ?Sized,
    {
        self.index.replace(articles);
        if self.index.is_empty() {
            warn!("article index arrived empty; listings and deep links have nothing to show");
        } else {
            debug!(count = self.index.len(), "article index replaced");
        }

        let Some(identifier) = self.pending_article.take() else {
            return;
        };
        match self.index.resolve(&identifier) {
            Some(article) => {
                let view = ViewState::Article { article };
                info!(identifier = %identifier, url = %view.canonical_path(), "resolved deferred article deep link");
                env.replace_history(&HistoryEntry::for_view(&view), &view.canonical_path());
                self.view = view;
                self.pending_effect = Some(PostRenderEffect::ScrollToTop);
            }
            None => {
                info!(identifier = %identifier, "deep-linked article not in index; staying on home");
                let url = env.location().href();
                env.replace_history(&HistoryEntry::for_view(&ViewState::Home), &url);
            }
        }
    }

    /// The article fetch failed. Whatever index is held keeps serving, and a
    /// pending deep link stays pending for a later successful load.
    pub fn articles_failed(&mut self, reason: &str) {
        warn!(
            reason,
            held = self.index.len(),
            pending = self.pending_article.as_deref().unwrap_or_default(),
            "article index fetch failed"
        );
    }

    pub fn search<E>(&mut self, env: &mut E, query: &str) -> SearchOutcome
    where
        E: NavigationEnvironment + ?Sized,
    {
        let query = query.trim();
        self.search_query = query.to_string();
        if query.is_empty() {
            return SearchOutcome::Idle;
        }

        let anchor = self.config.listing_anchor_id.clone();
        if self.view != ViewState::Home {
            self.pending_article = None;
            self.push_view(env, ViewState::Home, PostRenderEffect::ScrollToElement(anchor));
            return SearchOutcome::SwitchedHome;
        }

        match env.element_in_viewport(&anchor) {
            Some(false) => {
                env.smooth_scroll_to_element(&anchor);
                SearchOutcome::ScrolledToResults
            }
            Some(true) | None => SearchOutcome::AlreadyVisible,
        }
    }

    /// Runs the effect left by the latest transition. Call once per render.
    pub fn after_render<E>(&mut self, env: &mut E)
    where
        E: NavigationEnvironment + ?Sized,
    {
        let Some(effect) = self.pending_effect.take() else {
            return;
        };
        match effect {
            PostRenderEffect::ScrollToTop => env.scroll_to(0),
            PostRenderEffect::RestoreScroll(offset) => env.scroll_to(offset),
            PostRenderEffect::ScrollToElement(element_id) => {
                if !env.smooth_scroll_to_element(&element_id) {
                    debug!(element_id = %element_id, "scroll target missing after render");
                }
            }
        }
    }

    fn target_view(&self, request: &NavigationRequest) -> ViewState {
        match request {
            NavigationRequest::Home => ViewState::Home,
            NavigationRequest::Dashboard => ViewState::Dashboard,
            NavigationRequest::About => ViewState::About,
            NavigationRequest::Admin => ViewState::Admin,
            NavigationRequest::Privacy => ViewState::Privacy,
            NavigationRequest::Terms => ViewState::Terms,
            NavigationRequest::Archives => ViewState::Archives,
            NavigationRequest::Category(label) => {
                if is_home_category(label) {
                    return ViewState::Home;
                }
                match canonical_category(label) {
                    Some(label) => ViewState::Category {
                        label: label.to_string(),
                    },
                    None => {
                        warn!(category = %label, "unknown category; showing home");
                        ViewState::Home
                    }
                }
            }
            NavigationRequest::Article(identifier) => match self.index.resolve(identifier) {
                Some(article) => ViewState::Article { article },
                None => {
                    warn!(identifier = %identifier, "article not in index; showing home");
                    ViewState::Home
                }
            },
            NavigationRequest::Tag(raw) => {
                let tag_slug = slugify(raw);
                if tag_slug.is_empty() {
                    ViewState::Home
                } else {
                    ViewState::TagArchive { tag_slug }
                }
            }
        }
    }

    fn push_view<E>(&mut self, env: &mut E, target: ViewState, effect: PostRenderEffect)
    where
        E: NavigationEnvironment + ?Sized,
    {
        if self.view == ViewState::Dashboard {
            self.remember_dashboard_scroll(env);
        }
        env.push_history(&HistoryEntry::for_view(&target), &target.canonical_path());
        debug!(
            from = self.view.tag().as_str(),
            to = target.tag().as_str(),
            "pushed view"
        );
        self.view = target;
        self.pending_effect = Some(effect);
    }

    fn remember_dashboard_scroll<E>(&self, env: &mut E)
    where
        E: NavigationEnvironment + ?Sized,
    {
        let checkpoint = ScrollCheckpoint {
            offset: env.scroll_offset(),
        };
        if let Err(error) = save_dashboard_checkpoint(env, checkpoint) {
            warn!(%error, "dashboard scroll checkpoint not saved");
        }
    }

    fn apply_resolution<E>(
        &mut self,
        env: &mut E,
        resolution: Resolution,
        location: &Location,
        trigger: Trigger,
    ) where
        E: NavigationEnvironment + ?Sized,
    {
        let entry = resolution.history_entry();
        match resolution.canonical_url.as_deref() {
            Some(url) => {
                debug!(from = %location.href(), to = url, ?trigger, "rewriting to canonical url");
                env.replace_history(&entry, url);
            }
            None if env.history_entry().as_ref() != Some(&entry) => {
                env.replace_history(&entry, &location.href());
            }
            None => {}
        }
        self.view = resolution.view;
        self.pending_article = resolution.pending_article;
    }
}

fn pending_article_path(identifier: &str) -> String {
    format!("{ARTICLE_PREFIX}{}", encode_component(identifier))
}

fn arrival_effect<E>(view: &ViewState, env: &E) -> PostRenderEffect
where
    E: NavigationEnvironment + ?Sized,
{
    match view {
        ViewState::Dashboard => load_dashboard_checkpoint(env).map_or(
            PostRenderEffect::ScrollToTop,
            |checkpoint| PostRenderEffect::RestoreScroll(checkpoint.offset),
        ),
        _ => PostRenderEffect::ScrollToTop,
    }
}
