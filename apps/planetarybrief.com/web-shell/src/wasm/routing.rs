use super::*;

    pub(super) fn apply_navigation(request: NavigationRequest) -> Result<String, ShellError> {
        let outcome = with_navigator(|navigator, env| navigator.navigate(env, request))?;
        publish_view_change();
        Ok(navigation_outcome_label(outcome).to_string())
    }

    /// Hands the new view to subscribers, then queues the post-render effect
    /// for the next animation frame.
    pub(super) fn publish_view_change() {
        let Ok((snapshot, view, url, article_count)) = with_navigator(|navigator, env| {
            let url = env.location().href();
            (
                view_snapshot_json(navigator, &url),
                navigator.view().tag().as_str().to_string(),
                url,
                navigator.article_index().len(),
            )
        }) else {
            return;
        };
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.view = Some(view);
            state.url = Some(url);
            state.article_count = article_count;
        });

        let payload = js_sys::JSON::parse(&snapshot).unwrap_or_else(|_| JsValue::from_str(&snapshot));
        let listeners = VIEW_LISTENERS.with(|listeners| listeners.borrow().clone());
        for listener in listeners {
            if let Err(error) = listener.call1(&JsValue::NULL, &payload) {
                console_warn(&format!("view listener failed: {}", js_error_text(&error)));
            }
        }
        schedule_after_render();
    }

    pub(super) fn schedule_after_render() {
        if AFTER_RENDER_SCHEDULED.with(Cell::get) {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        AFTER_RENDER_CALLBACK.with(|slot| {
            let mut slot = slot.borrow_mut();
            let callback = slot.get_or_insert_with(|| {
                Closure::<dyn FnMut(f64)>::wrap(Box::new(|_timestamp| {
                    AFTER_RENDER_SCHEDULED.with(|scheduled| scheduled.set(false));
                    run_after_render();
                }))
            });
            if window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .is_ok()
            {
                AFTER_RENDER_SCHEDULED.with(|scheduled| scheduled.set(true));
            }
        });
    }

    pub(super) fn run_after_render() {
        let _ = with_navigator(|navigator, env| navigator.after_render(env));
    }

    pub(super) fn install_browser_navigation_handlers() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        ROUTE_POPSTATE_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
                let entry = event
                    .dyn_ref::<PopStateEvent>()
                    .and_then(|event| entry_from_js(&event.state()));
                if with_navigator(|navigator, env| navigator.handle_popstate(env, entry)).is_ok() {
                    publish_view_change();
                }
            }));
            let _ = window
                .add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref());
            *slot.borrow_mut() = Some(callback);
        });

        ROUTE_LINK_CLICK_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
                intercept_internal_link_click(event);
            }));
            let _ = document.add_event_listener_with_callback_and_bool(
                "click",
                callback.as_ref().unchecked_ref(),
                true,
            );
            *slot.borrow_mut() = Some(callback);
        });
    }

    pub(super) fn intercept_internal_link_click(event: web_sys::Event) {
        if event.default_prevented() {
            return;
        }
        let Some(mouse_event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        if mouse_event.button() != 0
            || mouse_event.meta_key()
            || mouse_event.ctrl_key()
            || mouse_event.shift_key()
            || mouse_event.alt_key()
        {
            return;
        }

        let Some(anchor) = anchor_from_event(&event) else {
            return;
        };
        let href_attribute = anchor.get_attribute("href").unwrap_or_default();
        if href_attribute.trim().is_empty() || href_attribute.starts_with('#') {
            return;
        }
        if anchor.has_attribute("download") {
            return;
        }
        let target = anchor.target();
        if !target.is_empty() && target != "_self" {
            return;
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(origin) = window.location().origin() else {
            return;
        };
        let Some(relative) = anchor.href().strip_prefix(&origin).map(ToString::to_string) else {
            return;
        };

        // Links carrying a query or fragment go through a full load so the
        // legacy-form resolver sees them.
        let location = Location::parse(&relative);
        if !location.query.is_empty() || !location.hash.is_empty() {
            return;
        }
        let Some(request) = request_for_link_path(&location.path) else {
            return;
        };

        event.prevent_default();
        if let Err(error) = apply_navigation(request) {
            console_warn(&format!("link navigation failed: {error}"));
        }
    }

    pub(super) fn anchor_from_event(event: &web_sys::Event) -> Option<HtmlAnchorElement> {
        let composed_path = event.composed_path();
        for index in 0..composed_path.length() {
            let value = composed_path.get(index);
            if let Ok(anchor) = value.dyn_into::<HtmlAnchorElement>() {
                return Some(anchor);
            }
        }
        None
    }
