//! Navigation and view routing for the Planetary Brief web client.
//!
//! The [`Navigator`] owns the current [`ViewState`] and keeps it in lockstep
//! with the browser URL and session history through an injected
//! [`NavigationEnvironment`].

pub mod articles;
pub mod category;
pub mod config;
pub mod environment;
pub mod explanation;
pub mod location;
pub mod navigator;
pub mod route;
pub mod session;

pub use articles::{Article, ArticleIndex, ArticleRef, ListingFilter};
pub use category::{
    CATEGORY_LABELS, HOME_CATEGORY_LABELS, canonical_category, category_to_slug,
    is_home_category, slug_to_category, slugify,
};
pub use config::{ConfigError, RouterConfig};
pub use environment::{MemoryEnvironment, MemorySlot, NavigationEnvironment};
pub use explanation::{ExplanationPayload, ExplanationValue};
pub use location::Location;
pub use navigator::{
    NavigationOutcome, NavigationRequest, Navigator, PostRenderEffect, SearchOutcome,
};
pub use route::{EntryRestore, HistoryEntry, Resolution, ViewState, ViewTag, resolve_view_from_location};
pub use session::{ScrollCheckpoint, SessionStore, SessionStoreError};
