//! Live-session example for toc-core
//!
//! Drives a document through the kinds of edits an authoring surface makes
//! (insert, retitle, reorder, remove) and prints the reconciled TOC entries
//! after each change batch.
//!
//! Run with: cargo run --example watch_session

use std::sync::Arc;

use parking_lot::RwLock;
use toc_core::document::{BlockKind, DocumentStore, ScanScope};
use toc_core::markdown::parse_document;
use toc_core::reconcile::HeadingReconciler;

fn print_entries(step: &str, reconciler: &HeadingReconciler) {
    println!("{step}");
    for entry in reconciler.entries() {
        let flag = if entry.ignore { " (hidden)" } else { "" };
        let label = if entry.custom_label.is_empty() {
            entry.text.clone()
        } else {
            format!("{} [label: {}]", entry.text, entry.custom_label)
        };
        println!("   #{:24} {label}{flag}", entry.anchor);
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("=== toc-core Watch Session Example ===\n");

    let doc = parse_document("<!-- toc -->\n\n## Introduction\n\n## Roadmap\n");
    let store = DocumentStore::new(doc);
    let mut toc_block = None;
    store.read().walk(&mut |block| {
        if block.kind == BlockKind::Toc {
            toc_block = Some(block.id);
        }
    });

    let entries = Arc::new(RwLock::new(Vec::new()));
    let mut reconciler =
        HeadingReconciler::new(store.clone(), toc_block.expect("toc marker"), entries);
    reconciler.attach();
    print_entries("Initial scan:", &reconciler);

    reconciler.set_custom_label("introduction", "Start Here");
    print_entries("After relabeling the introduction:", &reconciler);

    store.insert_block(
        None,
        None,
        BlockKind::Heading {
            level: 2,
            text: "Release Notes".into(),
        },
    );
    print_entries("After inserting a heading:", &reconciler);

    let roadmap = store
        .read()
        .headings_in(ScanScope::Document)
        .iter()
        .find(|(_, text)| *text == "Roadmap")
        .map(|(id, _)| *id)
        .expect("roadmap heading");
    store.set_heading_text(roadmap, "Roadmap  (2026)");
    print_entries("After retitling Roadmap:", &reconciler);

    // Root children: [toc, Introduction, Roadmap (2026), Release Notes]
    store.reorder_children(None, 3, 1);
    print_entries("After moving Release Notes to the top:", &reconciler);

    store.remove_block(roadmap);
    print_entries("After deleting the roadmap:", &reconciler);

    // Session teardown: further edits go unobserved.
    reconciler.detach();
    store.insert_block(
        None,
        None,
        BlockKind::Heading {
            level: 2,
            text: "Unseen".into(),
        },
    );
    print_entries("After detach (unchanged):", &reconciler);
}
