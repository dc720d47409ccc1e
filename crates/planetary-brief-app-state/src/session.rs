//! Session-scoped checkpoints.
//!
//! Everything here is a best-effort cache: a failed or malformed read is the
//! same as an absent value.

use tracing::debug;

use crate::explanation::ExplanationPayload;

pub const DASHBOARD_SCROLL_KEY: &str = "dashboardScroll";
pub const EXPLANATION_DATA_KEY: &str = "explanationData";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session storage is unavailable")]
    Unavailable,
    #[error("session storage rejected write for '{key}': {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("failed to encode session value for '{key}': {reason}")]
    Encode { key: String, reason: String },
}

pub trait SessionStore {
    fn read_session_value(&self, key: &str) -> Option<String>;
    fn write_session_value(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError>;
}

/// Saved vertical scroll offset for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCheckpoint {
    pub offset: i32,
}

pub fn load_dashboard_checkpoint<S>(store: &S) -> Option<ScrollCheckpoint>
where
    S: SessionStore + ?Sized,
{
    let raw = store.read_session_value(DASHBOARD_SCROLL_KEY)?;
    let offset = parse_offset(&raw);
    if offset.is_none() {
        debug!(value = %raw, "ignoring malformed dashboard scroll checkpoint");
    }
    offset.map(|offset| ScrollCheckpoint { offset })
}

pub fn save_dashboard_checkpoint<S>(
    store: &mut S,
    checkpoint: ScrollCheckpoint,
) -> Result<(), SessionStoreError>
where
    S: SessionStore + ?Sized,
{
    store.write_session_value(DASHBOARD_SCROLL_KEY, &checkpoint.offset.to_string())
}

pub fn load_explanation<S>(store: &S) -> Option<ExplanationPayload>
where
    S: SessionStore + ?Sized,
{
    let raw = store.read_session_value(EXPLANATION_DATA_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(payload) => Some(payload),
        Err(error) => {
            debug!(%error, "ignoring malformed explanation payload");
            None
        }
    }
}

pub fn save_explanation<S>(
    store: &mut S,
    payload: &ExplanationPayload,
) -> Result<(), SessionStoreError>
where
    S: SessionStore + ?Sized,
{
    let encoded = serde_json::to_string(payload).map_err(|error| SessionStoreError::Encode {
        key: EXPLANATION_DATA_KEY.to_string(),
        reason: error.to_string(),
    })?;
    store.write_session_value(EXPLANATION_DATA_KEY, &encoded)
}

// Browsers report fractional offsets on zoomed pages.
fn parse_offset(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(offset) = trimmed.parse::<i32>() {
        return Some(offset.max(0));
    }
    let offset = trimmed.parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some(offset.round().clamp(0.0, f64::from(i32::MAX)) as i32)
}
