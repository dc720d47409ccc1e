use super::*;

    pub(super) fn set_boot_phase(phase: &str, detail: &str) {
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.phase = phase.to_string();
            state.detail = detail.to_string();
            if phase != "error" {
                state.last_error = None;
            }
        });
        update_status_dom(phase, detail);
        console_info(&format!("boot {phase}: {detail}"));
    }

    pub(super) fn set_boot_error(message: &str) {
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.phase = "error".to_string();
            state.detail = "startup failed".to_string();
            state.last_error = Some(message.to_string());
        });
        update_status_dom("error", message);
        web_sys::console::error_1(&JsValue::from_str(&format!("{LOG_PREFIX} boot error: {message}")));
    }

    /// Mirrors the boot phase into `data-phase` on the status element when the
    /// page provides one.
    pub(super) fn update_status_dom(phase: &str, detail: &str) {
        let Some(status) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(BOOT_STATUS_ELEMENT_ID))
        else {
            return;
        };
        let _ = status.set_attribute("data-phase", phase);
        let _ = status.set_attribute("title", detail);
    }

    pub(super) fn endpoint_override() -> Option<String> {
        let window = web_sys::window()?;
        let value =
            js_sys::Reflect::get(&window, &JsValue::from_str(ARTICLES_ENDPOINT_OVERRIDE_KEY)).ok()?;
        let endpoint = value.as_string()?.trim().to_string();
        if endpoint.is_empty() { None } else { Some(endpoint) }
    }

    pub(super) fn console_info(message: &str) {
        web_sys::console::info_1(&JsValue::from_str(&format!("{LOG_PREFIX} {message}")));
    }

    pub(super) fn console_warn(message: &str) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("{LOG_PREFIX} {message}")));
    }
