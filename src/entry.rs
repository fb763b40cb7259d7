//! The persisted TOC entry and its storage round-trip.
//!
//! An ordered `Vec<TocEntry>` is the entire serialized state of one TOC
//! instance. The wire form is a JSON array of
//! `{ text, anchor, customLabel, ignore }` objects and must survive storage
//! between authoring sessions unchanged.

use std::fs::{read_to_string, write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TocError;
use crate::slug::slugify;

/// One heading's row in the persisted TOC state.
///
/// `anchor` is always `slugify(text)` as of the most recent scan; it is
/// recomputed on every scan and never edited independently. `custom_label`
/// and `ignore` are the user-owned fields the reconciler carries across
/// document edits.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TocEntry {
    pub text: String,
    pub anchor: String,
    /// Display override for the rendered link; empty means "use text".
    pub custom_label: String,
    /// Excludes the heading from the rendered list (the heading still gets a
    /// document identifier at render time).
    pub ignore: bool,
}

impl TocEntry {
    /// Fresh entry for a scanned heading, customizations at their defaults.
    pub fn new(text: &str) -> Self {
        TocEntry {
            text: text.to_string(),
            anchor: slugify(text),
            custom_label: String::new(),
            ignore: false,
        }
    }

    /// Link text for the rendered list: the custom label when present,
    /// otherwise the raw heading text. Used verbatim, untrimmed.
    pub fn effective_label(&self) -> &str {
        if self.custom_label.is_empty() {
            &self.text
        } else {
            &self.custom_label
        }
    }

    /// Whether this entry appears in the rendered list: not ignored, with a
    /// non-blank effective label and a non-blank anchor.
    pub fn is_listed(&self) -> bool {
        !self.ignore
            && !self.effective_label().trim().is_empty()
            && !self.anchor.trim().is_empty()
    }
}

/// Serialize entries to their wire form.
pub fn entries_to_json(entries: &[TocEntry]) -> Result<String, TocError> {
    Ok(serde_json::to_string(entries)?)
}

/// Deserialize entries from their wire form. Malformed or empty payloads are
/// treated as an empty sequence; stale or corrupt persisted state must
/// never be fatal to an authoring session.
pub fn entries_from_json(payload: &str) -> Vec<TocEntry> {
    match serde_json::from_str(payload) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("Discarding unreadable TOC state: {err}");
            Vec::new()
        }
    }
}

/// Load persisted entries from `path`. A missing file is an empty sequence.
pub fn load_entries(path: &Path) -> Vec<TocEntry> {
    if !path.exists() {
        tracing::debug!("TOC state file not found, starting empty: {path:?}");
        return Vec::new();
    }
    match read_to_string(path) {
        Ok(payload) => entries_from_json(&payload),
        Err(err) => {
            tracing::debug!("Could not read TOC state from {path:?}: {err}");
            Vec::new()
        }
    }
}

/// Write entries to `path` in their wire form.
pub fn store_entries(path: &Path, entries: &[TocEntry]) -> Result<(), TocError> {
    tracing::debug!("Writing {} TOC entries to {path:?}", entries.len());
    let payload = entries_to_json(entries)?;
    write(path, payload)?;
    Ok(())
}
