use std::collections::HashMap;

use crate::shared::viewport::ViewportRect;

/// Presentation record for one recognized identity.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelEntry {
    pub identity: String,
    /// Text the overlay draws; currently the identity name itself.
    pub text: String,
    /// Viewport box of the crop that most recently matched this identity.
    pub anchor: ViewportRect,
    pub visible: bool,
}

/// Identity-keyed label store backing the overlay.
///
/// Entries are created lazily on first successful recognition, hidden
/// wholesale when a new batch dispatches, and shown again only by a fresh
/// match within that batch. Entries are never removed, so an identity that
/// reappears keeps its record.
#[derive(Debug, Default)]
pub struct LabelCache {
    entries: HashMap<String, LabelEntry>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides every entry without removing any.
    pub fn hide_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.visible = false;
        }
    }

    /// Upserts the entry for `identity`, anchors it to the matching crop's
    /// viewport box, and makes it visible.
    pub fn apply_match(&mut self, identity: &str, anchor: ViewportRect) {
        let entry = self
            .entries
            .entry(identity.to_string())
            .or_insert_with(|| LabelEntry {
                identity: identity.to_string(),
                text: identity.to_string(),
                anchor,
                visible: false,
            });
        entry.anchor = anchor;
        entry.visible = true;
    }

    pub fn get(&self, identity: &str) -> Option<&LabelEntry> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visible entries in identity order, deterministic for rendering and
    /// tests.
    pub fn visible(&self) -> Vec<LabelEntry> {
        let mut visible: Vec<LabelEntry> = self
            .entries
            .values()
            .filter(|entry| entry.visible)
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.identity.cmp(&b.identity));
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn rect(x: f32, y: f32) -> ViewportRect {
        ViewportRect {
            min: Point2::new(x, y),
            max: Point2::new(x + 50.0, y + 50.0),
        }
    }

    #[test]
    fn test_match_after_hide_shows_exactly_that_entry() {
        let mut cache = LabelCache::new();
        cache.apply_match("alice", rect(0.0, 0.0));
        cache.apply_match("bob", rect(100.0, 0.0));

        cache.hide_all();
        cache.apply_match("alice", rect(10.0, 10.0));

        let visible = cache.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].identity, "alice");
        // Bob's entry is hidden but retained.
        assert_eq!(cache.len(), 2);
        assert!(!cache.get("bob").unwrap().visible);
    }

    #[test]
    fn test_match_updates_anchor() {
        let mut cache = LabelCache::new();
        cache.apply_match("alice", rect(0.0, 0.0));
        cache.apply_match("alice", rect(200.0, 300.0));

        let entry = cache.get("alice").unwrap();
        assert_eq!(entry.anchor, rect(200.0, 300.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hide_all_on_empty_cache_is_noop() {
        let mut cache = LabelCache::new();
        cache.hide_all();
        assert!(cache.is_empty());
        assert!(cache.visible().is_empty());
    }

    #[test]
    fn test_visible_is_sorted_by_identity() {
        let mut cache = LabelCache::new();
        cache.apply_match("carol", rect(0.0, 0.0));
        cache.apply_match("alice", rect(0.0, 0.0));
        cache.apply_match("bob", rect(0.0, 0.0));

        let visible = cache.visible();
        let names: Vec<&str> = visible.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
