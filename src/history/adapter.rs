//! In-memory history stack emitting path-change events.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use tokio::sync::mpsc;
use url::Url;
use uuid::Uuid;

use crate::config::HistoryConfig;

/// Bytes escaped when an in-app path is written into a URL path.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// How `navigate_to` treats the current entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Add a new entry after the current one.
    Push,
    /// Overwrite the current entry.
    Replace,
}

/// What caused a navigation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTrigger {
    Load,
    Push,
    Replace,
    Back,
    Forward,
}

/// One entry on the history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Per-entry key, like the browser's history state key.
    pub key: Uuid,
    pub path: String,
}

impl HistoryEntry {
    fn new(path: impl Into<String>) -> Self {
        Self {
            key: Uuid::new_v4(),
            path: path.into(),
        }
    }
}

/// Path-change event consumed by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEvent {
    pub path: String,
    pub trigger: NavigationTrigger,
    pub key: Uuid,
}

/// Bridges navigation actions to path-change events.
#[derive(Debug)]
pub struct HistoryAdapter {
    base: String,
    entries: Vec<HistoryEntry>,
    cursor: usize,
    events_tx: mpsc::UnboundedSender<NavigationEvent>,
}

impl HistoryAdapter {
    /// Create a new adapter.
    ///
    /// Returns the adapter and a receiver for its navigation events.
    pub fn new(config: &HistoryConfig) -> (Self, mpsc::UnboundedReceiver<NavigationEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let base = config.base.trim_end_matches('/').to_string();

        (Self {
            base,
            entries: Vec::new(),
            cursor: 0,
            events_tx,
        }, events_rx)
    }

    /// Record the initial location and emit a `Load` event.
    pub fn load(&mut self, path: impl Into<String>) -> NavigationEvent {
        self.entries = vec![HistoryEntry::new(path)];
        self.cursor = 0;
        self.emit(NavigationTrigger::Load)
    }

    /// Initial load from a full location such as `https://host/base/api?x=1`.
    pub fn load_location(&mut self, href: &str) -> Result<NavigationEvent, url::ParseError> {
        let path = self.location_to_path(href)?;
        Ok(self.load(path))
    }

    /// Navigate to `path`, pushing or replacing the current entry.
    pub fn navigate_to(&mut self, path: impl Into<String>, mode: NavigationMode) -> NavigationEvent {
        let entry = HistoryEntry::new(path);

        if self.entries.is_empty() {
            self.entries.push(entry);
            self.cursor = 0;
        } else {
            match mode {
                NavigationMode::Push => {
                    self.entries.truncate(self.cursor + 1);
                    self.entries.push(entry);
                    self.cursor += 1;
                }
                NavigationMode::Replace => {
                    self.entries[self.cursor] = entry;
                }
            }
        }

        let trigger = match mode {
            NavigationMode::Push => NavigationTrigger::Push,
            NavigationMode::Replace => NavigationTrigger::Replace,
        };
        self.emit(trigger)
    }

    pub fn push(&mut self, path: impl Into<String>) -> NavigationEvent {
        self.navigate_to(path, NavigationMode::Push)
    }

    pub fn replace(&mut self, path: impl Into<String>) -> NavigationEvent {
        self.navigate_to(path, NavigationMode::Replace)
    }

    pub fn back(&mut self) -> Option<NavigationEvent> {
        self.go(-1)
    }

    pub fn forward(&mut self) -> Option<NavigationEvent> {
        self.go(1)
    }

    /// Move the cursor by `delta` entries. Out-of-range moves emit nothing.
    pub fn go(&mut self, delta: isize) -> Option<NavigationEvent> {
        if delta == 0 || self.entries.is_empty() {
            return None;
        }

        let target = self.cursor.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }

        self.cursor = target;
        let trigger = if delta < 0 {
            NavigationTrigger::Back
        } else {
            NavigationTrigger::Forward
        };
        Some(self.emit(trigger))
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// In-app path for a full location: query and fragment dropped,
    /// percent escapes decoded, base stripped.
    ///
    /// A path whose escapes do not decode to UTF-8 is kept as written.
    pub fn location_to_path(&self, href: &str) -> Result<String, url::ParseError> {
        let url = Url::parse(href)?;
        let raw = url.path();
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .unwrap_or(Cow::Borrowed(raw));
        let path: &str = &decoded;
        let stripped = match path.strip_prefix(self.base.as_str()) {
            Some(rest) if self.base.is_empty() || rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        };

        if stripped.is_empty() {
            Ok("/".to_string())
        } else {
            Ok(stripped.to_string())
        }
    }

    /// Visible URL path for an in-app path, percent-encoded.
    pub fn href_for(&self, path: &str) -> String {
        let href = format!("{}{}", self.base, path);
        utf8_percent_encode(&href, PATH_ESCAPES).to_string()
    }

    fn emit(&self, trigger: NavigationTrigger) -> NavigationEvent {
        let entry = &self.entries[self.cursor];
        let event = NavigationEvent {
            path: entry.path.clone(),
            trigger,
            key: entry.key,
        };

        tracing::debug!(path = %event.path, trigger = ?trigger, "History changed");

        // Router may be gone during teardown.
        let _ = self.events_tx.send(event.clone());
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(base: &str) -> (HistoryAdapter, mpsc::UnboundedReceiver<NavigationEvent>) {
        HistoryAdapter::new(&HistoryConfig { base: base.to_string() })
    }

    #[test]
    fn test_push_back_forward() {
        let (mut history, mut rx) = adapter("/");
        history.load("/");
        history.push("/api");
        history.push("/settings");

        assert_eq!(history.entries().len(), 3);
        assert_eq!(history.back().unwrap().path, "/api");
        assert_eq!(history.back().unwrap().path, "/");
        assert!(history.back().is_none());
        assert_eq!(history.forward().unwrap().trigger, NavigationTrigger::Forward);

        let paths: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).map(|e| e.path).collect();
        assert_eq!(paths, vec!["/", "/api", "/settings", "/api", "/", "/api"]);
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let (mut history, _rx) = adapter("/");
        history.load("/");
        history.push("/a");
        history.push("/b");
        history.back();
        history.push("/c");

        let paths: Vec<_> = history.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/a", "/c"]);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_replace_keeps_length() {
        let (mut history, _rx) = adapter("/");
        history.load("/");
        let before = history.current().unwrap().key;
        let event = history.replace("/api");

        assert_eq!(event.trigger, NavigationTrigger::Replace);
        assert_eq!(history.entries().len(), 1);
        assert_ne!(history.current().unwrap().key, before);
        assert!(!history.can_go_back());
    }

    #[test]
    fn test_go_out_of_range() {
        let (mut history, _rx) = adapter("/");
        assert!(history.go(-1).is_none());
        history.load("/");
        assert!(history.go(5).is_none());
        assert!(history.go(0).is_none());
        assert_eq!(history.current().unwrap().path, "/");
    }

    #[test]
    fn test_location_base_stripping() {
        let (history, _rx) = adapter("/app/");
        assert_eq!(history.location_to_path("https://example.com/app/api?x=1#top").unwrap(), "/api");
        assert_eq!(history.location_to_path("https://example.com/app").unwrap(), "/");
        assert_eq!(history.location_to_path("https://example.com/apple").unwrap(), "/apple");
        assert_eq!(history.href_for("/api"), "/app/api");

        let (root, _rx) = adapter("/");
        assert_eq!(root.location_to_path("http://localhost:34115/api").unwrap(), "/api");
        assert_eq!(root.href_for("/api"), "/api");
        assert!(root.location_to_path("not a url").is_err());
    }

    #[test]
    fn test_location_decodes_percent_escapes() {
        let (root, _rx) = adapter("/");
        assert_eq!(root.location_to_path("http://localhost/设置").unwrap(), "/设置");
        assert_eq!(root.location_to_path("http://localhost/%E8%AE%BE%E7%BD%AE").unwrap(), "/设置");
        assert_eq!(root.location_to_path("http://localhost/my%20page").unwrap(), "/my page");
        assert_eq!(root.location_to_path("http://localhost/bad%FF").unwrap(), "/bad%FF");

        let (app, _rx) = adapter("/应用/");
        assert_eq!(app.location_to_path("http://localhost/%E5%BA%94%E7%94%A8/设置").unwrap(), "/设置");

        for path in ["/设置", "/my page", "/100%", "/a?b#c"] {
            let href = format!("http://localhost{}", app.href_for(path));
            assert_eq!(app.location_to_path(&href).unwrap(), path);
        }
        assert_eq!(root.href_for("/my page"), "/my%20page");
    }
}
