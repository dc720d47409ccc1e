use std::collections::BTreeMap;

use crate::location::Location;
use crate::route::HistoryEntry;
use crate::session::{SessionStore, SessionStoreError};

/// Everything the navigator needs from the browser.
///
/// The web shell implements this over `window`; tests and the CLI use
/// [`MemoryEnvironment`].
pub trait NavigationEnvironment: SessionStore {
    fn location(&self) -> Location;
    /// Payload attached to the current history slot, if any decodes.
    fn history_entry(&self) -> Option<HistoryEntry>;
    fn push_history(&mut self, entry: &HistoryEntry, url: &str);
    fn replace_history(&mut self, entry: &HistoryEntry, url: &str);
    fn disable_native_scroll_restoration(&mut self);
    fn scroll_offset(&self) -> i32;
    fn scroll_to(&mut self, offset: i32);
    /// `None` when no element has this id.
    fn element_in_viewport(&self, element_id: &str) -> Option<bool>;
    /// Returns `false` when the element does not exist.
    fn smooth_scroll_to_element(&mut self, element_id: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySlot {
    pub url: String,
    pub entry: Option<HistoryEntry>,
}

/// In-memory browser: a session-history stack with a cursor, a session
/// store, a scroll offset and a set of page elements.
#[derive(Debug, Clone)]
pub struct MemoryEnvironment {
    slots: Vec<MemorySlot>,
    cursor: usize,
    session: BTreeMap<String, String>,
    session_available: bool,
    scroll_offset: i32,
    elements: BTreeMap<String, bool>,
    native_scroll_restoration: bool,
    smooth_scrolls: Vec<String>,
    pushes: usize,
    replaces: usize,
}

impl MemoryEnvironment {
    /// A fresh tab opened at `url`; the only slot carries no entry.
    pub fn new(url: &str) -> Self {
        Self {
            slots: vec![MemorySlot {
                url: Location::parse(url).href(),
                entry: None,
            }],
            cursor: 0,
            session: BTreeMap::new(),
            session_available: true,
            scroll_offset: 0,
            elements: BTreeMap::new(),
            native_scroll_restoration: true,
            smooth_scrolls: Vec::new(),
            pushes: 0,
            replaces: 0,
        }
    }

    pub fn with_session_value(mut self, key: &str, value: &str) -> Self {
        self.session.insert(key.to_string(), value.to_string());
        self
    }

    /// Storage disabled: reads see nothing and writes fail.
    pub fn without_session_storage(mut self) -> Self {
        self.session_available = false;
        self
    }

    pub fn with_element(mut self, element_id: &str, in_viewport: bool) -> Self {
        self.elements.insert(element_id.to_string(), in_viewport);
        self
    }

    pub fn set_element_in_viewport(&mut self, element_id: &str, in_viewport: bool) {
        self.elements.insert(element_id.to_string(), in_viewport);
    }

    pub fn set_scroll_offset(&mut self, offset: i32) {
        self.scroll_offset = offset;
    }

    /// Simulates the Back button. Returns the popstate payload of the slot
    /// moved to, or `None` when already at the oldest slot.
    pub fn back(&mut self) -> Option<Option<HistoryEntry>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current_slot().and_then(|slot| slot.entry.clone()))
    }

    pub fn forward(&mut self) -> Option<Option<HistoryEntry>> {
        if self.cursor + 1 >= self.slots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current_slot().and_then(|slot| slot.entry.clone()))
    }

    /// Simulates following an in-page `#fragment` link: the browser pushes a
    /// slot with no payload, and the `popstate` it fires carries `None`.
    pub fn follow_fragment(&mut self, fragment: &str) {
        let base = self
            .current_url()
            .split_once('#')
            .map_or(self.current_url(), |(base, _)| base);
        let url = format!("{base}#{fragment}");
        self.slots.truncate(self.cursor + 1);
        self.slots.push(MemorySlot { url, entry: None });
        self.cursor = self.slots.len() - 1;
    }

    /// Drops the current slot's payload, as some browsers do for the oldest
    /// entry.
    pub fn clear_current_entry(&mut self) {
        if let Some(slot) = self.slots.get_mut(self.cursor) {
            slot.entry = None;
        }
    }

    pub fn current_url(&self) -> &str {
        self.current_slot().map_or("/", |slot| slot.url.as_str())
    }

    pub fn slots(&self) -> &[MemorySlot] {
        &self.slots
    }

    pub fn history_len(&self) -> usize {
        self.slots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn push_count(&self) -> usize {
        self.pushes
    }

    pub fn replace_count(&self) -> usize {
        self.replaces
    }

    pub fn native_scroll_restoration(&self) -> bool {
        self.native_scroll_restoration
    }

    pub fn smooth_scrolls(&self) -> &[String] {
        &self.smooth_scrolls
    }

    pub fn session_value(&self, key: &str) -> Option<&str> {
        self.session.get(key).map(String::as_str)
    }

    fn current_slot(&self) -> Option<&MemorySlot> {
        self.slots.get(self.cursor)
    }
}

impl SessionStore for MemoryEnvironment {
    fn read_session_value(&self, key: &str) -> Option<String> {
        if !self.session_available {
            return None;
        }
        self.session.get(key).cloned()
    }

    fn write_session_value(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        if !self.session_available {
            return Err(SessionStoreError::Unavailable);
        }
        self.session.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl NavigationEnvironment for MemoryEnvironment {
    fn location(&self) -> Location {
        Location::parse(self.current_url())
    }

    fn history_entry(&self) -> Option<HistoryEntry> {
        self.current_slot().and_then(|slot| slot.entry.clone())
    }

    fn push_history(&mut self, entry: &HistoryEntry, url: &str) {
        self.slots.truncate(self.cursor + 1);
        self.slots.push(MemorySlot {
            url: url.to_string(),
            entry: Some(entry.clone()),
        });
        self.cursor = self.slots.len() - 1;
        self.pushes += 1;
    }

    fn replace_history(&mut self, entry: &HistoryEntry, url: &str) {
        let slot = MemorySlot {
            url: url.to_string(),
            entry: Some(entry.clone()),
        };
        match self.slots.get_mut(self.cursor) {
            Some(current) => *current = slot,
            None => self.slots.push(slot),
        }
        self.replaces += 1;
    }

    fn disable_native_scroll_restoration(&mut self) {
        self.native_scroll_restoration = false;
    }

    fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    fn scroll_to(&mut self, offset: i32) {
        self.scroll_offset = offset.max(0);
    }

    fn element_in_viewport(&self, element_id: &str) -> Option<bool> {
        self.elements.get(element_id).copied()
    }

    fn smooth_scroll_to_element(&mut self, element_id: &str) -> bool {
        if !self.elements.contains_key(element_id) {
            return false;
        }
        self.smooth_scrolls.push(element_id.to_string());
        if let Some(in_viewport) = self.elements.get_mut(element_id) {
            *in_viewport = true;
        }
        true
    }
}
