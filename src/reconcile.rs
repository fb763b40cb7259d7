//! Incremental reconciliation between a live document scan and the persisted
//! TOC state.
//!
//! [`HeadingReconciler`] keeps one TOC instance's entry sequence current as
//! the document changes: every change batch within its scope triggers a
//! fresh scan that is merged against the previously persisted entries so
//! user customizations survive edits they shouldn't lose: retitling a
//! heading's whitespace, reordering sections, inserting unrelated blocks.
//! The merge identity is the normalized heading text, not the anchor and not
//! the position.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::document::{BlockId, DocumentStore, ScanScope, Subscription};
use crate::entry::TocEntry;
use crate::slug::normalize_title;

/// Merge a freshly scanned heading list onto the previously persisted
/// entries.
///
/// Scanned headings come in document order; the output follows that order.
/// A heading whose normalized text matches a previous entry carries that
/// entry's `custom_label` and `ignore` forward; anything else starts fresh.
/// Returns `None` when the result is field-for-field identical to
/// `previous`, so callers can skip redundant writes.
pub fn reconcile(scanned: &[String], previous: &[TocEntry]) -> Option<Vec<TocEntry>> {
    // Last entry wins when two previous headings normalize identically,
    // matching the map-build order of the scan that produced them.
    let prior: HashMap<String, &TocEntry> = previous
        .iter()
        .map(|entry| (normalize_title(&entry.text), entry))
        .collect();

    let next: Vec<TocEntry> = scanned
        .iter()
        .map(|text| {
            let mut entry = TocEntry::new(text);
            if let Some(prev) = prior.get(&normalize_title(text)) {
                entry.custom_label = prev.custom_label.clone();
                entry.ignore = prev.ignore;
            }
            entry
        })
        .collect();

    if next == previous {
        None
    } else {
        Some(next)
    }
}

/// Scan the document scope of `toc_block` and fold the result into
/// `entries`. Returns whether the persisted sequence changed. A TOC block
/// that is no longer part of the document is a no-op, prior state untouched.
#[tracing::instrument(skip_all)]
fn run_scan(store: &DocumentStore, toc_block: BlockId, entries: &RwLock<Vec<TocEntry>>) -> bool {
    let scanned: Vec<String> = {
        let doc = store.read();
        let Some(scope) = doc.scope_of(toc_block) else {
            tracing::debug!("TOC block {toc_block} not in document, skipping scan");
            return false;
        };
        doc.headings_in(scope)
            .iter()
            .map(|(_, text)| text.to_string())
            .collect()
    };

    let mut guard = entries.write();
    match reconcile(&scanned, &guard) {
        Some(next) => {
            tracing::debug!("Reconciled {} headings into TOC state", next.len());
            *guard = next;
            true
        }
        None => {
            tracing::trace!("Scan matches persisted state, skipping write");
            false
        }
    }
}

/// Maintains the persisted entry sequence of one TOC instance against a live
/// document.
///
/// The document is reached only through the injected [`DocumentStore`]
/// handle. [`HeadingReconciler::attach`] runs the initial scan and
/// subscribes to change batches for the instance's scope; dropping the
/// reconciler (or calling [`HeadingReconciler::detach`]) releases the
/// subscription.
pub struct HeadingReconciler {
    store: Arc<DocumentStore>,
    toc_block: BlockId,
    entries: Arc<RwLock<Vec<TocEntry>>>,
    subscription: Option<Subscription>,
}

impl HeadingReconciler {
    /// `entries` is the shared persisted state, typically seeded from
    /// [`crate::entry::load_entries`] or an empty vec for a new instance.
    pub fn new(
        store: Arc<DocumentStore>,
        toc_block: BlockId,
        entries: Arc<RwLock<Vec<TocEntry>>>,
    ) -> Self {
        HeadingReconciler {
            store,
            toc_block,
            entries,
            subscription: None,
        }
    }

    /// Run the initial scan and start observing the document. Scope is
    /// resolved once here; a TOC block not currently in the document falls
    /// back to observing the whole document (each scan re-resolves scope, so
    /// a later insertion is picked up).
    pub fn attach(&mut self) {
        self.reconcile_now();
        let scope = self
            .store
            .read()
            .scope_of(self.toc_block)
            .unwrap_or(ScanScope::Document);
        let store = self.store.clone();
        let entries = self.entries.clone();
        let toc_block = self.toc_block;
        let subscription = self.store.watch(scope, move |_events| {
            run_scan(&store, toc_block, &entries);
        });
        self.subscription = Some(subscription);
    }

    /// Stop observing the document. Idempotent.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    /// Force a scan outside the notification path. Returns whether the
    /// persisted sequence changed.
    pub fn reconcile_now(&self) -> bool {
        run_scan(&self.store, self.toc_block, &self.entries)
    }

    /// Snapshot of the current persisted sequence.
    pub fn entries(&self) -> Vec<TocEntry> {
        self.entries.read().clone()
    }

    /// Set the display override of every entry whose current anchor is
    /// `anchor`. Entries are addressed by anchor, not by the normalized-text
    /// merge key, so two headings that slugify identically are updated
    /// together.
    pub fn set_custom_label(&self, anchor: &str, value: &str) {
        let mut entries = self.entries.write();
        for entry in entries.iter_mut().filter(|e| e.anchor == anchor) {
            entry.custom_label = value.to_string();
        }
    }

    /// Set the visibility flag of every entry whose current anchor is
    /// `anchor`. Same addressing as [`HeadingReconciler::set_custom_label`].
    pub fn set_ignore(&self, anchor: &str, flag: bool) {
        let mut entries = self.entries.write();
        for entry in entries.iter_mut().filter(|e| e.anchor == anchor) {
            entry.ignore = flag;
        }
    }
}

impl Drop for HeadingReconciler {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, Document};

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fresh_scan_defaults() {
        let next = reconcile(&texts(&["Setup", "FAQ"]), &[]).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].anchor, "setup");
        assert_eq!(next[1].anchor, "faq");
        assert!(next.iter().all(|e| e.custom_label.is_empty() && !e.ignore));
    }

    #[test]
    fn test_customizations_survive_whitespace_change() {
        let previous = vec![TocEntry {
            custom_label: "Start Here".into(),
            ignore: true,
            ..TocEntry::new("Getting Started")
        }];
        let next = reconcile(&texts(&["  Getting \t  Started "]), &previous).unwrap();
        assert_eq!(next[0].custom_label, "Start Here");
        assert!(next[0].ignore);
        // Text and anchor track the scan, not the stored row.
        assert_eq!(next[0].text, "  Getting \t  Started ");
        assert_eq!(next[0].anchor, "getting-started");
    }

    #[test]
    fn test_retitled_heading_resets_customizations() {
        let previous = vec![TocEntry {
            custom_label: "Start Here".into(),
            ignore: true,
            ..TocEntry::new("Getting Started")
        }];
        let next = reconcile(&texts(&["Installation"]), &previous).unwrap();
        assert_eq!(next[0].custom_label, "");
        assert!(!next[0].ignore);
    }

    #[test]
    fn test_reorder_follows_document_order() {
        let previous = vec![
            TocEntry {
                custom_label: "One".into(),
                ..TocEntry::new("Setup")
            },
            TocEntry::new("FAQ"),
        ];
        let next = reconcile(&texts(&["FAQ", "Setup"]), &previous).unwrap();
        assert_eq!(next[0].text, "FAQ");
        assert_eq!(next[1].text, "Setup");
        assert_eq!(next[1].custom_label, "One");
    }

    #[test]
    fn test_identical_scan_is_noop() {
        let previous = vec![TocEntry::new("Setup"), TocEntry::new("FAQ")];
        assert_eq!(reconcile(&texts(&["Setup", "FAQ"]), &previous), None);
    }

    #[test]
    fn test_removed_heading_drops_entry() {
        let previous = vec![TocEntry::new("Setup"), TocEntry::new("FAQ")];
        let next = reconcile(&texts(&["FAQ"]), &previous).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].text, "FAQ");
    }

    fn store_with_section(titles: &[&str]) -> (Arc<DocumentStore>, BlockId, Vec<BlockId>) {
        let mut doc = Document::new();
        let section = doc.insert(None, None, BlockKind::Section).unwrap();
        let toc = doc.insert(Some(section), None, BlockKind::Toc).unwrap();
        let headings = titles
            .iter()
            .map(|t| {
                doc.insert(
                    Some(section),
                    None,
                    BlockKind::Heading {
                        level: 2,
                        text: t.to_string(),
                    },
                )
                .unwrap()
            })
            .collect();
        (DocumentStore::new(doc), toc, headings)
    }

    #[test]
    fn test_attach_scans_and_tracks_edits() {
        let (store, toc, headings) = store_with_section(&["Setup", "FAQ"]);
        let entries = Arc::new(RwLock::new(Vec::new()));
        let mut reconciler = HeadingReconciler::new(store.clone(), toc, entries.clone());
        reconciler.attach();

        assert_eq!(
            reconciler
                .entries()
                .iter()
                .map(|e| e.anchor.clone())
                .collect::<Vec<_>>(),
            vec!["setup", "faq"]
        );

        store.set_heading_text(headings[0], "Install");
        assert_eq!(reconciler.entries()[0].anchor, "install");
    }

    #[test]
    fn test_detach_stops_tracking() {
        let (store, toc, headings) = store_with_section(&["Setup"]);
        let entries = Arc::new(RwLock::new(Vec::new()));
        let mut reconciler = HeadingReconciler::new(store.clone(), toc, entries);
        reconciler.attach();
        reconciler.detach();

        store.set_heading_text(headings[0], "Install");
        assert_eq!(reconciler.entries()[0].anchor, "setup");
    }

    #[test]
    fn test_missing_toc_block_is_noop() {
        let store = DocumentStore::new(Document::new());
        let entries = Arc::new(RwLock::new(vec![TocEntry::new("Old")]));
        let reconciler = HeadingReconciler::new(store, 99, entries);
        assert!(!reconciler.reconcile_now());
        assert_eq!(reconciler.entries()[0].text, "Old");
    }

    #[test]
    fn test_edit_by_anchor_cross_applies_to_duplicates() {
        let (store, toc, _) = store_with_section(&["Setup", "Setup"]);
        let entries = Arc::new(RwLock::new(Vec::new()));
        let mut reconciler = HeadingReconciler::new(store, toc, entries);
        reconciler.attach();

        reconciler.set_custom_label("setup", "Both Of Them");
        reconciler.set_ignore("setup", true);
        let entries = reconciler.entries();
        assert!(entries
            .iter()
            .all(|e| e.custom_label == "Both Of Them" && e.ignore));
    }
}
