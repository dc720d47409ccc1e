use planetary_brief_app_state::session::{DASHBOARD_SCROLL_KEY, EXPLANATION_DATA_KEY};
use planetary_brief_app_state::{
    Article, ArticleRef, CATEGORY_LABELS, ExplanationPayload, ExplanationValue, HistoryEntry,
    ListingFilter, MemoryEnvironment, NavigationEnvironment, NavigationOutcome,
    NavigationRequest, Navigator, PostRenderEffect, RouterConfig, SearchOutcome, ViewState,
    ViewTag, category_to_slug, slug_to_category,
};

const ARTICLES_JSON: &str = r#"[
    {
        "id": 42,
        "slug": "arctic-sea-ice",
        "title": "Arctic sea ice hits record low",
        "category": "Climate & Energy Systems",
        "date": "2024-03-01",
        "tags": ["Sea Ice", "Cryosphere"],
        "excerpt": "Satellite records show the smallest winter maximum yet."
    },
    {
        "id": "7",
        "slug": "coral-bleaching",
        "title": "Coral bleaching spreads across the Pacific",
        "category": "Biodiversity",
        "date": "2024-04-12",
        "tags": ["Coral"]
    },
    {
        "id": "9",
        "title": "Kelp forests recover off Tasmania",
        "category": "Biodiversity & Oceans",
        "date": "2024-01-20",
        "tags": ["Kelp"],
        "excerpt": "Restoration divers report coral-like regrowth."
    }
]"#;

fn articles() -> Vec<Article> {
    serde_json::from_str(ARTICLES_JSON).expect("fixture parses")
}

fn start(env: &mut MemoryEnvironment) -> Navigator {
    Navigator::start(env, RouterConfig::default())
}

fn start_loaded(env: &mut MemoryEnvironment) -> Navigator {
    let mut navigator = start(env);
    navigator.articles_loaded(env, articles());
    navigator
}

fn back(env: &mut MemoryEnvironment, navigator: &mut Navigator) {
    let entry = env.back().expect("a slot to go back to");
    navigator.handle_popstate(env, entry);
}

fn forward(env: &mut MemoryEnvironment, navigator: &mut Navigator) {
    let entry = env.forward().expect("a slot to go forward to");
    navigator.handle_popstate(env, entry);
}

fn ocean_heat() -> ExplanationPayload {
    ExplanationPayload {
        title: "Ocean heat content".to_string(),
        icon: Some("waves".to_string()),
        values: vec![ExplanationValue {
            label: "Anomaly".to_string(),
            value: 0.42,
            unit: Some("ZJ".to_string()),
        }],
        narrative: "The upper ocean keeps absorbing excess heat.".to_string(),
    }
}

fn article_view(id: &str, slug: &str) -> ViewState {
    ViewState::Article {
        article: ArticleRef {
            id: id.to_string(),
            slug: Some(slug.to_string()),
        },
    }
}

#[test]
fn cold_load_of_every_canonical_path_keeps_url_and_matches_view() {
    let cases = [
        ("/", ViewState::Home),
        (
            "/category/biodiversity-and-oceans",
            ViewState::Category {
                label: "Biodiversity & Oceans".to_string(),
            },
        ),
        (
            "/tag/cryosphere",
            ViewState::TagArchive {
                tag_slug: "cryosphere".to_string(),
            },
        ),
        ("/dashboard", ViewState::Dashboard),
        ("/about", ViewState::About),
        ("/admin", ViewState::Admin),
        ("/privacy", ViewState::Privacy),
        ("/terms", ViewState::Terms),
        ("/archives", ViewState::Archives),
    ];
    for (path, expected) in cases {
        let mut env = MemoryEnvironment::new(path);
        let navigator = start_loaded(&mut env);
        assert_eq!(navigator.view(), &expected, "{path}");
        assert_eq!(env.current_url(), path, "{path}");
        assert_eq!(env.history_len(), 1, "{path}");
        assert_eq!(
            env.history_entry(),
            Some(HistoryEntry::for_view(&expected)),
            "{path}"
        );
    }
}

#[test]
fn cold_load_of_article_and_explanation_paths() {
    let mut env = MemoryEnvironment::new("/article/arctic-sea-ice");
    let navigator = start_loaded(&mut env);
    assert_eq!(navigator.view(), &article_view("42", "arctic-sea-ice"));
    assert_eq!(env.current_url(), "/article/arctic-sea-ice");

    let stored = serde_json::to_string(&ocean_heat()).expect("payload encodes");
    let mut env = MemoryEnvironment::new("/dashboard#explain")
        .with_session_value(EXPLANATION_DATA_KEY, &stored);
    let navigator = start_loaded(&mut env);
    assert_eq!(
        navigator.view(),
        &ViewState::Explanation {
            payload: ocean_heat()
        }
    );
    assert_eq!(env.current_url(), "/dashboard#explain");
}

#[test]
fn back_walks_article_category_home_one_press_each() {
    let mut env = MemoryEnvironment::new("/");
    let mut navigator = start_loaded(&mut env);

    navigator.navigate(
        &mut env,
        NavigationRequest::Category("Biodiversity & Oceans".to_string()),
    );
    navigator.navigate(&mut env, NavigationRequest::Article("42".to_string()));
    assert_eq!(env.current_url(), "/article/arctic-sea-ice");
    assert_eq!(env.history_len(), 3);

    back(&mut env, &mut navigator);
    assert_eq!(
        navigator.view(),
        &ViewState::Category {
            label: "Biodiversity & Oceans".to_string()
        }
    );
    assert_eq!(env.current_url(), "/category/biodiversity-and-oceans");

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(env.current_url(), "/");
    assert_eq!(env.back(), None);

    forward(&mut env, &mut navigator);
    forward(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &article_view("42", "arctic-sea-ice"));
}

#[test]
fn explanation_overlay_closes_with_a_single_back() {
    let mut env = MemoryEnvironment::new("/");
    let mut navigator = start_loaded(&mut env);
    navigator.navigate(&mut env, NavigationRequest::Dashboard);
    navigator.after_render(&mut env);
    env.set_scroll_offset(1200);

    assert_eq!(
        navigator.open_explanation(&mut env, ocean_heat()),
        NavigationOutcome::Pushed
    );
    assert_eq!(env.current_url(), "/dashboard#explain");
    assert_eq!(env.session_value(DASHBOARD_SCROLL_KEY), Some("1200"));
    navigator.after_render(&mut env);
    assert_eq!(env.scroll_offset(), 0);

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::Dashboard);
    assert_eq!(env.current_url(), "/dashboard");
    assert_eq!(
        navigator.pending_effect(),
        Some(&PostRenderEffect::RestoreScroll(1200))
    );
    navigator.after_render(&mut env);
    assert_eq!(env.scroll_offset(), 1200);

    forward(&mut env, &mut navigator);
    assert_eq!(navigator.view().tag(), ViewTag::Explanation);
}

#[test]
fn closing_explanation_replaces_instead_of_pushing() {
    let mut env = MemoryEnvironment::new("/dashboard");
    let mut navigator = start_loaded(&mut env);
    env.set_scroll_offset(300);
    navigator.open_explanation(&mut env, ocean_heat());
    let len = env.history_len();

    assert_eq!(
        navigator.close_explanation(&mut env),
        NavigationOutcome::Replaced
    );
    assert_eq!(navigator.view(), &ViewState::Dashboard);
    assert_eq!(env.current_url(), "/dashboard");
    assert_eq!(env.history_len(), len);
    navigator.after_render(&mut env);
    assert_eq!(env.scroll_offset(), 300);

    // The overlay slot now reads /dashboard too, so one Back stays on the
    // dashboard before leaving it.
    let urls: Vec<&str> = env.slots().iter().map(|slot| slot.url.as_str()).collect();
    assert_eq!(urls, ["/dashboard", "/dashboard"]);
    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::Dashboard);
    assert_eq!(env.current_url(), "/dashboard");
    assert_eq!(env.back(), None);
}

#[test]
fn id_deep_link_is_rewritten_to_slug_without_new_entry() {
    let mut env = MemoryEnvironment::new("/article/42");
    let navigator = start_loaded(&mut env);
    assert_eq!(navigator.view(), &article_view("42", "arctic-sea-ice"));
    assert_eq!(env.current_url(), "/article/arctic-sea-ice");
    assert_eq!(env.history_len(), 1);
    assert_eq!(env.push_count(), 0);
}

#[test]
fn slow_index_still_completes_deep_link() {
    let mut env = MemoryEnvironment::new("/article/coral-bleaching");
    let mut navigator = start(&mut env);
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(navigator.pending_article(), Some("coral-bleaching"));
    assert_eq!(env.current_url(), "/article/coral-bleaching");

    navigator.articles_failed("timeout");
    navigator.articles_loaded(&mut env, articles());
    assert_eq!(navigator.view(), &article_view("7", "coral-bleaching"));
    assert_eq!(navigator.pending_article(), None);
    assert_eq!(env.history_len(), 1);
    assert_eq!(
        navigator
            .current_article()
            .map(|article| article.title.as_str()),
        Some("Coral bleaching spreads across the Pacific")
    );
}

#[test]
fn navigating_before_index_arrives_drops_deep_link() {
    let mut env = MemoryEnvironment::new("/article/coral-bleaching");
    let mut navigator = start(&mut env);
    navigator.navigate(&mut env, NavigationRequest::About);
    navigator.articles_loaded(&mut env, articles());
    assert_eq!(navigator.view(), &ViewState::About);
    assert_eq!(env.current_url(), "/about");

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &article_view("7", "coral-bleaching"));
}

#[test]
fn missing_deep_linked_article_settles_on_home() {
    let mut env = MemoryEnvironment::new("/article/retracted-story");
    let mut navigator = start(&mut env);
    navigator.articles_loaded(&mut env, articles());
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(env.history_entry(), Some(HistoryEntry::for_view(&ViewState::Home)));
}

#[test]
fn home_link_while_url_names_an_article_pushes_root() {
    let mut env = MemoryEnvironment::new("/article/arctic-sea-ice");
    let mut navigator = start(&mut env);
    assert_eq!(
        navigator.navigate(&mut env, NavigationRequest::Home),
        NavigationOutcome::Pushed
    );
    navigator.articles_loaded(&mut env, articles());
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(env.current_url(), "/");

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &article_view("42", "arctic-sea-ice"));
    assert_eq!(env.current_url(), "/article/arctic-sea-ice");

    let mut env = MemoryEnvironment::new("/article/retracted-story");
    let mut navigator = start(&mut env);
    navigator.articles_loaded(&mut env, articles());
    assert_eq!(env.current_url(), "/article/retracted-story");
    assert_eq!(
        navigator.navigate(&mut env, NavigationRequest::Home),
        NavigationOutcome::Pushed
    );
    assert_eq!(env.current_url(), "/");
    assert_eq!(env.history_len(), 2);
}

#[test]
fn article_link_before_index_loads_completes_on_arrival() {
    let mut env = MemoryEnvironment::new("/about");
    let mut navigator = start(&mut env);
    assert_eq!(
        navigator.navigate(&mut env, NavigationRequest::Article("coral-bleaching".to_string())),
        NavigationOutcome::Pushed
    );
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(navigator.pending_article(), Some("coral-bleaching"));
    assert_eq!(env.current_url(), "/article/coral-bleaching");

    navigator.articles_loaded(&mut env, articles());
    assert_eq!(navigator.view(), &article_view("7", "coral-bleaching"));
    assert_eq!(env.current_url(), "/article/coral-bleaching");
    assert_eq!(env.history_len(), 2);
    assert_eq!(env.push_count(), 1);

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::About);
    forward(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &article_view("7", "coral-bleaching"));
}

#[test]
fn in_page_fragment_link_keeps_hash_and_position() {
    let mut env = MemoryEnvironment::new("/").with_element("latest-articles", false);
    let mut navigator = start_loaded(&mut env);
    navigator.after_render(&mut env);

    env.follow_fragment("latest-articles");
    env.set_scroll_offset(1800);
    let replaces = env.replace_count();
    navigator.handle_popstate(&mut env, None);
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(env.current_url(), "/#latest-articles");
    assert_eq!(env.replace_count(), replaces);
    navigator.after_render(&mut env);
    assert_eq!(env.scroll_offset(), 1800);
}

#[test]
fn legacy_category_query_is_replaced_and_unreachable_by_back() {
    let mut env = MemoryEnvironment::new("/?category=Biodiversity");
    let mut navigator = start_loaded(&mut env);
    assert_eq!(env.current_url(), "/category/biodiversity-and-oceans");
    assert_eq!(env.history_len(), 1);
    assert_eq!(env.back(), None);

    navigator.navigate(&mut env, NavigationRequest::About);
    back(&mut env, &mut navigator);
    assert_eq!(env.current_url(), "/category/biodiversity-and-oceans");
    assert_eq!(
        navigator.view(),
        &ViewState::Category {
            label: "Biodiversity & Oceans".to_string()
        }
    );
}

#[test]
fn search_on_home_with_results_visible_does_nothing() {
    let mut env = MemoryEnvironment::new("/").with_element("latest-articles", true);
    let mut navigator = start_loaded(&mut env);
    let pushes = env.push_count();
    let replaces = env.replace_count();

    assert_eq!(
        navigator.search(&mut env, "coral"),
        SearchOutcome::AlreadyVisible
    );
    navigator.after_render(&mut env);
    assert_eq!(env.push_count(), pushes);
    assert_eq!(env.replace_count(), replaces);
    assert!(env.smooth_scrolls().is_empty());
    assert_eq!(navigator.search_query(), "coral");
}

#[test]
fn search_scrolls_to_listing_when_needed() {
    let mut env = MemoryEnvironment::new("/").with_element("latest-articles", false);
    let mut navigator = start_loaded(&mut env);
    assert_eq!(navigator.search(&mut env, "   "), SearchOutcome::Idle);
    assert_eq!(
        navigator.search(&mut env, "kelp"),
        SearchOutcome::ScrolledToResults
    );
    assert_eq!(env.push_count(), 0);
    assert_eq!(env.smooth_scrolls(), ["latest-articles".to_string()]);
}

#[test]
fn search_from_another_view_switches_home_then_scrolls_after_render() {
    let mut env = MemoryEnvironment::new("/about").with_element("latest-articles", false);
    let mut navigator = start_loaded(&mut env);
    assert_eq!(
        navigator.search(&mut env, "ice"),
        SearchOutcome::SwitchedHome
    );
    assert_eq!(navigator.view(), &ViewState::Home);
    assert_eq!(env.current_url(), "/");
    assert_eq!(env.push_count(), 1);
    assert!(env.smooth_scrolls().is_empty());

    navigator.after_render(&mut env);
    assert_eq!(env.smooth_scrolls(), ["latest-articles".to_string()]);
}

#[test]
fn missing_popstate_payload_is_resolved_from_url() {
    let mut env = MemoryEnvironment::new("/privacy");
    let mut navigator = start_loaded(&mut env);
    env.clear_current_entry();
    navigator.navigate(&mut env, NavigationRequest::Terms);

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::Privacy);
    assert_eq!(
        env.history_entry(),
        Some(HistoryEntry::for_view(&ViewState::Privacy))
    );

    let garbage = HistoryEntry::from_json(&serde_json::json!({ "view": 17 }));
    navigator.handle_popstate(&mut env, garbage);
    assert_eq!(navigator.view(), &ViewState::Privacy);
}

#[test]
fn unavailable_session_storage_never_blocks_navigation() {
    let mut env = MemoryEnvironment::new("/dashboard").without_session_storage();
    let mut navigator = start_loaded(&mut env);
    env.set_scroll_offset(500);

    assert_eq!(
        navigator.open_explanation(&mut env, ocean_heat()),
        NavigationOutcome::Pushed
    );
    assert_eq!(navigator.view().tag(), ViewTag::Explanation);

    back(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::Dashboard);
    assert_eq!(navigator.pending_effect(), Some(&PostRenderEffect::ScrollToTop));
    navigator.after_render(&mut env);
    assert_eq!(env.scroll_offset(), 0);

    forward(&mut env, &mut navigator);
    assert_eq!(navigator.view(), &ViewState::Dashboard);
    assert_eq!(env.current_url(), "/dashboard");
}

#[test]
fn listing_is_newest_first_and_filtered() {
    let mut env = MemoryEnvironment::new("/");
    let navigator = start_loaded(&mut env);
    let index = navigator.article_index();

    let ids = |filter: ListingFilter| -> Vec<String> {
        index
            .listing(&filter)
            .into_iter()
            .map(|article| article.id.clone())
            .collect()
    };

    assert_eq!(ids(ListingFilter::default()), ["7", "42", "9"]);
    assert_eq!(
        ids(ListingFilter {
            category: Some("Biodiversity & Oceans".to_string()),
            ..ListingFilter::default()
        }),
        ["7", "9"]
    );
    assert_eq!(
        ids(ListingFilter {
            tag: Some("sea-ice".to_string()),
            ..ListingFilter::default()
        }),
        ["42"]
    );
    assert_eq!(
        ids(ListingFilter {
            query: Some("CORAL".to_string()),
            ..ListingFilter::default()
        }),
        ["7", "9"]
    );
}

#[test]
fn category_slugs_round_trip() {
    assert_eq!(
        slug_to_category("policy-and-economics"),
        Some("Policy, Governance & Finance")
    );
    assert_eq!(
        category_to_slug("Climate & Energy Systems"),
        "climate-and-energy-systems"
    );
    for label in CATEGORY_LABELS {
        assert_eq!(slug_to_category(&category_to_slug(label)), Some(label));
    }
}
