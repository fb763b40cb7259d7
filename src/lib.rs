//! # toc-core
//!
//! A reconciling table-of-contents engine for block documents.
//!
//! toc-core derives a navigable TOC from the level-2 headings of a document
//! and keeps heading anchors consistent between an editable, live document
//! and its final rendered form. It maintains a persisted, user-customizable
//! entry list (display label overrides, per-heading visibility) that
//! survives the document being edited underneath it.
//!
//! ### Key pieces
//!
//! - **[`slug`]**: anchor derivation (`slugify`) and the normalized-title
//!   merge key. Both the authoring scan and the final-render identifier pass
//!   go through the same function, which is what keeps the two sides
//!   byte-for-byte consistent.
//! - **[`document`]**: the block-tree model and [`document::DocumentStore`],
//!   an observable handle over a live document with explicit
//!   `watch`/[`document::Subscription`] lifecycle.
//! - **[`reconcile`]**: [`reconcile::HeadingReconciler`] re-scans on every
//!   change batch and merges against the persisted entries by normalized
//!   heading text, so customizations survive whitespace retitles and
//!   reorders but reset when a heading is genuinely rewritten.
//! - **[`render`]**: the one-shot final pass: collision-free `id`
//!   assignment for every level-2 heading (`-2`, `-3`, ... suffixes) and the
//!   `<nav>` list rendered from persisted entries.
//! - **[`markdown`]**: CommonMark ingestion; `<!-- toc -->` places a TOC
//!   instance, level-1 headings bound sectional scopes.
//! - **[`entry`]**: the persisted `TocEntry` record and its JSON wire form
//!   (`{ text, anchor, customLabel, ignore }`).
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parking_lot::RwLock;
//! use toc_core::document::{BlockKind, DocumentStore};
//! use toc_core::markdown::parse_document;
//! use toc_core::reconcile::HeadingReconciler;
//! use toc_core::render::render_document;
//!
//! let doc = parse_document("# Guide\n\n<!-- toc -->\n\n## Setup\n\n## FAQ\n");
//! let mut toc_block = None;
//! doc.walk(&mut |block| {
//!     if block.kind == BlockKind::Toc {
//!         toc_block = Some(block.id);
//!     }
//! });
//! let toc_block = toc_block.expect("document carries a <!-- toc --> marker");
//!
//! let store = DocumentStore::new(doc);
//! let entries = Arc::new(RwLock::new(Vec::new()));
//! let mut reconciler = HeadingReconciler::new(store.clone(), toc_block, entries.clone());
//! reconciler.attach();
//!
//! // The entry list is live: edits to the document re-scan and merge.
//! reconciler.set_custom_label("setup", "Getting Started");
//!
//! // Final render works on a static snapshot.
//! let mut snapshot = store.read().clone();
//! let html = render_document(&mut snapshot, &reconciler.entries());
//! assert!(html.contains("<a href=\"#setup\">Getting Started</a>"));
//! assert!(html.contains("<h2 id=\"setup\">Setup</h2>"));
//! ```
//!
//! ## Persistence
//!
//! The ordered entry list is the entire state of one TOC instance and
//! round-trips through JSON unchanged between authoring sessions:
//!
//! ```rust
//! use toc_core::entry::{entries_from_json, entries_to_json, TocEntry};
//!
//! let entries = vec![TocEntry::new("Setup")];
//! let payload = entries_to_json(&entries)?;
//! assert_eq!(entries_from_json(&payload), entries);
//! // Unreadable state degrades to an empty sequence, never an error.
//! assert!(entries_from_json("not json").is_empty());
//! # Ok::<(), toc_core::TocError>(())
//! ```
//!
//! ## Lifecycle notes
//!
//! Everything is single-threaded and synchronous: watcher callbacks run to
//! completion inside the commit that triggered them, one coalesced batch per
//! commit. Detach reconcilers (or just drop them) when an authoring session
//! ends; a dangling subscription is released with its guard.

pub mod document;
pub mod entry;
pub mod error;
pub mod event;
pub mod markdown;
pub mod reconcile;
pub mod render;
pub mod slug;

pub use error::*;
pub use slug::slugify;
