use super::*;

    /// `NavigationEnvironment` over the live `window`.
    pub(super) struct BrowserEnvironment {
        window: web_sys::Window,
    }

    impl BrowserEnvironment {
        pub(super) fn from_window() -> Result<Self, ShellError> {
            let window = web_sys::window().ok_or(ShellError::WindowUnavailable)?;
            Ok(Self { window })
        }

        fn history(&self) -> Option<web_sys::History> {
            self.window.history().ok()
        }

        fn session_storage(&self) -> Option<web_sys::Storage> {
            self.window.session_storage().ok().flatten()
        }

        fn write_history(&self, entry: &HistoryEntry, url: &str, replace: bool) {
            let Some(history) = self.history() else {
                console_warn("history API unavailable; navigation not recorded");
                return;
            };
            let state = entry_to_js(entry);
            let result = if replace {
                history.replace_state_with_url(&state, "", Some(url))
            } else {
                history.push_state_with_url(&state, "", Some(url))
            };
            if let Err(error) = result {
                console_warn(&format!(
                    "history write for {url} rejected: {}",
                    js_error_text(&error)
                ));
            }
        }
    }

    impl SessionStore for BrowserEnvironment {
        fn read_session_value(&self, key: &str) -> Option<String> {
            self.session_storage()?.get_item(key).ok().flatten()
        }

        fn write_session_value(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
            let storage = self.session_storage().ok_or(SessionStoreError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|error| SessionStoreError::WriteRejected {
                    key: key.to_string(),
                    reason: js_error_text(&error),
                })
        }
    }

    impl NavigationEnvironment for BrowserEnvironment {
        fn location(&self) -> Location {
            let location = self.window.location();
            Location::from_parts(
                &location.pathname().unwrap_or_default(),
                &location.search().unwrap_or_default(),
                &location.hash().unwrap_or_default(),
            )
        }

        fn history_entry(&self) -> Option<HistoryEntry> {
            let state = self.history()?.state().ok()?;
            entry_from_js(&state)
        }

        fn push_history(&mut self, entry: &HistoryEntry, url: &str) {
            self.write_history(entry, url, false);
        }

        fn replace_history(&mut self, entry: &HistoryEntry, url: &str) {
            self.write_history(entry, url, true);
        }

        fn disable_native_scroll_restoration(&mut self) {
            if let Some(history) = self.history() {
                let _ = history.set_scroll_restoration(ScrollRestoration::Manual);
            }
        }

        fn scroll_offset(&self) -> i32 {
            let offset = self.window.scroll_y().unwrap_or(0.0);
            if offset.is_finite() {
                offset.round().max(0.0) as i32
            } else {
                0
            }
        }

        fn scroll_to(&mut self, offset: i32) {
            self.window
                .scroll_to_with_x_and_y(0.0, f64::from(offset.max(0)));
        }

        fn element_in_viewport(&self, element_id: &str) -> Option<bool> {
            let element = self.window.document()?.get_element_by_id(element_id)?;
            let viewport_height = self.window.inner_height().ok()?.as_f64()?;
            let rect = element.get_bounding_client_rect();
            Some(rect.top() < viewport_height && rect.bottom() > 0.0)
        }

        fn smooth_scroll_to_element(&mut self, element_id: &str) -> bool {
            let Some(element) = self
                .window
                .document()
                .and_then(|document| document.get_element_by_id(element_id))
            else {
                return false;
            };
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            element.scroll_into_view_with_scroll_into_view_options(&options);
            true
        }
    }

    /// `history.state` arrives as an arbitrary JS value; anything that does
    /// not decode into a complete entry is `None`.
    pub(super) fn entry_from_js(state: &JsValue) -> Option<HistoryEntry> {
        if state.is_null() || state.is_undefined() {
            return None;
        }
        let text = js_sys::JSON::stringify(state).ok()?.as_string()?;
        let value: serde_json::Value = serde_json::from_str(&text).ok()?;
        HistoryEntry::from_json(&value)
    }

    pub(super) fn entry_to_js(entry: &HistoryEntry) -> JsValue {
        serde_json::to_string(&entry.to_json())
            .ok()
            .and_then(|text| js_sys::JSON::parse(&text).ok())
            .unwrap_or(JsValue::NULL)
    }

    pub(super) fn js_error_text(error: &JsValue) -> String {
        error
            .as_string()
            .or_else(|| {
                error
                    .dyn_ref::<js_sys::Error>()
                    .map(|error| String::from(error.message()))
            })
            .unwrap_or_else(|| "unknown javascript error".to_string())
    }
