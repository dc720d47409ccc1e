use planetary_brief_app_state::{
    Article, ArticleIndex, Location, MemoryEnvironment, NavigationEnvironment, Navigator,
    RouterConfig, ViewState, resolve_view_from_location, slugify,
};
use quickcheck::{QuickCheck, TestResult};

fn index() -> ArticleIndex {
    ArticleIndex::loaded(vec![Article {
        id: "42".to_string(),
        slug: Some("arctic-sea-ice".to_string()),
        title: "Arctic sea ice hits record low".to_string(),
        category: "Climate & Energy Systems".to_string(),
        date: "2024-03-01".to_string(),
        created_at: None,
        tags: Vec::new(),
        excerpt: None,
    }])
}

fn empty_session() -> MemoryEnvironment {
    MemoryEnvironment::new("/")
}

/// Whatever a URL resolves to, the canonical path of that view resolves to
/// the same view and needs no further rewrite.
fn canonical_path_is_fixed_point(raw: String) -> bool {
    let index = index();
    let session = empty_session();
    let first = resolve_view_from_location(&Location::parse(&raw), &index, &session);
    let canonical = first.view.canonical_path();
    let second = resolve_view_from_location(&Location::parse(&canonical), &index, &session);
    second.view == first.view && second.canonical_url.is_none()
}

fn prefixed_segments_resolve(prefix: String, segment: String) -> TestResult {
    let prefix = match prefix.len() % 3 {
        0 => "/tag/",
        1 => "/category/",
        _ => "/article/",
    };
    let url = format!("{prefix}{segment}");
    TestResult::from_bool(canonical_path_is_fixed_point(url))
}

fn slugify_is_idempotent(raw: String) -> bool {
    let once = slugify(&raw);
    slugify(&once) == once
}

/// Cold start on any URL leaves the current slot stamped with an entry that
/// matches the resolved view.
fn cold_start_stamps_current_slot(raw: String) -> TestResult {
    if raw.contains('#') {
        return TestResult::discard();
    }
    let mut env = MemoryEnvironment::new(&raw);
    let navigator = Navigator::start(&mut env, RouterConfig::default());
    let stamped = env.history_entry().is_some();
    let pending_or_view = navigator.pending_article().is_some()
        || matches!(navigator.view(), ViewState::Home)
        || env.current_url() == navigator.view().canonical_path();
    TestResult::from_bool(stamped && env.history_len() == 1 && pending_or_view)
}

#[test]
fn arbitrary_urls_resolve_to_fixed_points() {
    QuickCheck::new()
        .tests(500)
        .quickcheck(canonical_path_is_fixed_point as fn(String) -> bool);
}

#[test]
fn prefixed_routes_resolve_to_fixed_points() {
    QuickCheck::new()
        .tests(500)
        .quickcheck(prefixed_segments_resolve as fn(String, String) -> TestResult);
}

#[test]
fn slugify_output_is_stable() {
    QuickCheck::new().quickcheck(slugify_is_idempotent as fn(String) -> bool);
}

#[test]
fn cold_start_always_leaves_an_entry() {
    QuickCheck::new().quickcheck(cold_start_stamps_current_slot as fn(String) -> TestResult);
}
