#![allow(clippy::needless_pass_by_value)]

mod shell_state;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

pub use shell_state::{
    ShellError, decode_article_feed, navigation_outcome_label, parse_navigation_request,
    request_for_link_path, router_config_with_override, search_outcome_label,
    view_snapshot_json,
};

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::{Cell, RefCell};

    use gloo_net::http::Request;
    use planetary_brief_app_state::{
        Article, ExplanationPayload, HistoryEntry, ListingFilter, Location,
        NavigationEnvironment, NavigationRequest, Navigator, RouterConfig, SessionStore,
        SessionStoreError,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{
        HtmlAnchorElement, MouseEvent, PopStateEvent, ScrollBehavior, ScrollIntoViewOptions,
        ScrollLogicalPosition, ScrollRestoration,
    };

    use crate::shell_state::{
        BootDiagnostics, ShellError, decode_article_feed, navigation_outcome_label,
        parse_navigation_request, request_for_link_path, router_config_with_override,
        search_outcome_label, view_snapshot_json,
    };
    use crate::wasm_constants::*;

    mod browser;
    mod lifecycle;
    mod network;
    mod routing;

    use browser::*;
    use lifecycle::*;
    use network::*;
    use routing::*;

    thread_local! {
        static NAVIGATOR: RefCell<Option<Navigator>> = const { RefCell::new(None) };
        static DIAGNOSTICS: RefCell<BootDiagnostics> = RefCell::new(BootDiagnostics::default());
        static VIEW_LISTENERS: RefCell<Vec<js_sys::Function>> = const { RefCell::new(Vec::new()) };
        static AFTER_RENDER_SCHEDULED: Cell<bool> = const { Cell::new(false) };
        static AFTER_RENDER_CALLBACK: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
        static ROUTE_POPSTATE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static ROUTE_LINK_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        set_boot_phase("booting", "initializing Planetary Brief navigation");
        if let Err(error) = boot() {
            set_boot_error(&error.to_string());
        }
    }

    #[wasm_bindgen]
    pub fn boot_diagnostics_json() -> String {
        DIAGNOSTICS.with(|state| {
            serde_json::to_string(&*state.borrow()).unwrap_or_else(|_| {
                "{\"phase\":\"error\",\"detail\":\"diagnostics serialization failed\"}".to_string()
            })
        })
    }

    #[wasm_bindgen]
    pub fn current_view_json() -> String {
        with_navigator(|navigator, env| view_snapshot_json(navigator, &env.location().href()))
            .unwrap_or_else(|_| "{\"view\":\"home\"}".to_string())
    }

    /// Registers `callback(snapshot)`; it runs after every view change.
    #[wasm_bindgen]
    pub fn subscribe_view_changes(callback: js_sys::Function) {
        VIEW_LISTENERS.with(|listeners| listeners.borrow_mut().push(callback));
    }

    #[wasm_bindgen]
    pub fn navigate_to(kind: String, value: Option<String>) -> Result<String, JsValue> {
        let request = parse_navigation_request(&kind, value.as_deref()).map_err(js_error)?;
        apply_navigation(request).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn open_explanation(payload_json: String) -> Result<String, JsValue> {
        let payload: ExplanationPayload = serde_json::from_str(&payload_json)
            .map_err(|error| ShellError::InvalidExplanation {
                reason: error.to_string(),
            })
            .map_err(js_error)?;
        let outcome = with_navigator(|navigator, env| navigator.open_explanation(env, payload))
            .map_err(js_error)?;
        publish_view_change();
        Ok(navigation_outcome_label(outcome).to_string())
    }

    #[wasm_bindgen]
    pub fn close_explanation() -> Result<String, JsValue> {
        let outcome = with_navigator(|navigator, env| navigator.close_explanation(env))
            .map_err(js_error)?;
        publish_view_change();
        Ok(navigation_outcome_label(outcome).to_string())
    }

    #[wasm_bindgen]
    pub fn submit_search(query: String) -> Result<String, JsValue> {
        let outcome =
            with_navigator(|navigator, env| navigator.search(env, &query)).map_err(js_error)?;
        publish_view_change();
        Ok(search_outcome_label(outcome).to_string())
    }

    /// Runs the pending post-render effect now. For renderers that know when
    /// their commit finished; otherwise the next animation frame does it.
    #[wasm_bindgen]
    pub fn after_render() {
        run_after_render();
    }

    #[wasm_bindgen]
    pub fn listing_json(
        category: Option<String>,
        tag: Option<String>,
        query: Option<String>,
    ) -> String {
        let filter = ListingFilter {
            category,
            tag,
            query,
        };
        with_navigator(|navigator, _env| {
            let listing = navigator.article_index().listing(&filter);
            serde_json::to_string(&listing).unwrap_or_else(|_| "[]".to_string())
        })
        .unwrap_or_else(|_| "[]".to_string())
    }

    fn boot() -> Result<(), ShellError> {
        let config = match router_config_with_override(endpoint_override().as_deref()) {
            Ok(config) => config,
            Err(error) => {
                console_warn(&format!("ignoring articles endpoint override: {error}"));
                RouterConfig::default()
            }
        };
        let endpoint = config.articles_endpoint.clone();
        DIAGNOSTICS.with(|state| {
            state.borrow_mut().articles_endpoint = Some(endpoint.clone());
        });

        let mut env = BrowserEnvironment::from_window()?;
        let navigator = Navigator::start(&mut env, config);
        NAVIGATOR.with(|slot| *slot.borrow_mut() = Some(navigator));
        install_browser_navigation_handlers();
        publish_view_change();
        set_boot_phase("ready", "navigation booted; loading articles");

        spawn_local(async move {
            load_article_index(&endpoint).await;
        });
        Ok(())
    }

    fn with_navigator<R>(
        apply: impl FnOnce(&mut Navigator, &mut BrowserEnvironment) -> R,
    ) -> Result<R, ShellError> {
        let mut env = BrowserEnvironment::from_window()?;
        NAVIGATOR.with(|slot| {
            let mut slot = slot.borrow_mut();
            let navigator = slot.as_mut().ok_or(ShellError::NotBooted)?;
            Ok(apply(navigator, &mut env))
        })
    }

    fn js_error(error: ShellError) -> JsValue {
        JsValue::from_str(&error.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::boot_diagnostics_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn boot_diagnostics_json() -> String {
    let diagnostics = shell_state::BootDiagnostics {
        phase: "native".to_string(),
        detail: "web shell diagnostics only available on wasm".to_string(),
        ..shell_state::BootDiagnostics::default()
    };
    serde_json::to_string(&diagnostics).unwrap_or_default()
}
