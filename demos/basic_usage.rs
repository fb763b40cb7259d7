//! Basic usage example for toc-core
//!
//! This example demonstrates:
//! - Parsing a markdown guide into a block document
//! - Reconciling the TOC entries while the document changes
//! - Customizing labels and visibility
//! - Rendering the final document with disambiguated heading ids
//!
//! Run with: cargo run --example basic_usage

use std::sync::Arc;

use parking_lot::RwLock;
use toc_core::document::{BlockKind, DocumentStore};
use toc_core::entry::{entries_from_json, entries_to_json};
use toc_core::markdown::parse_document;
use toc_core::reconcile::HeadingReconciler;
use toc_core::render::render_document;
use toc_core::TocError;

const GUIDE: &str = "\
# Field Guide

<!-- toc -->

## Setup

Plug it in.

## Setup

No really, plug it in.

## Frequently Asked Questions

Why is it unplugged?
";

fn main() -> Result<(), TocError> {
    // Set up logging to see what's happening
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== toc-core Basic Usage Example ===\n");

    println!("1. Parsing the guide...");
    let doc = parse_document(GUIDE);
    let mut toc_block = None;
    doc.walk(&mut |block| {
        if block.kind == BlockKind::Toc {
            toc_block = Some(block.id);
        }
    });
    let toc_block = toc_block.expect("the guide carries a <!-- toc --> marker");
    let store = DocumentStore::new(doc);

    println!("2. Attaching the reconciler...");
    let entries = Arc::new(RwLock::new(Vec::new()));
    let mut reconciler = HeadingReconciler::new(store.clone(), toc_block, entries);
    reconciler.attach();

    println!("   Scanned entries:");
    for entry in reconciler.entries() {
        println!("   - {:30} -> #{}", entry.text, entry.anchor);
    }
    println!();

    println!("3. Customizing: shorten the FAQ label, hide the Setup rows...");
    reconciler.set_custom_label("frequently-asked-questions", "FAQ");
    reconciler.set_ignore("setup", true);

    println!("4. Round-tripping state through its wire form...");
    let payload = entries_to_json(&reconciler.entries())?;
    println!("   {payload}");
    let restored = entries_from_json(&payload);
    assert_eq!(restored, reconciler.entries());
    println!();

    println!("5. Rendering the final document...");
    let mut final_doc = store.read().clone();
    let html = render_document(&mut final_doc, &restored);
    println!("{html}\n");
    println!("   (note the id=\"setup\" / id=\"setup-2\" pair: duplicate");
    println!("    headings stay addressable even while hidden from the list)");

    reconciler.detach();
    Ok(())
}
