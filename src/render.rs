//! Final-render identifier assignment and HTML output.
//!
//! Rendering is a one-shot, synchronous pass over a now-static document: the
//! level-2 headings get collision-free `id` attributes (independent of the
//! persisted entries, so in-page targets exist even for headings hidden from
//! the list), and the persisted entries become the visible `<nav>` list.
//!
//! The list's `href` targets use the raw persisted anchors, not the
//! disambiguated identifiers; duplicated headings therefore link to the
//! first duplicate's target.

use std::collections::HashSet;
use std::fmt::Write;

use crate::document::{Block, BlockKind, Document, TOC_HEADING_LEVEL};
use crate::entry::TocEntry;
use crate::slug::slugify;

/// Class attribute of the rendered list's `<nav>` wrapper.
pub const NAV_CLASS: &str = "toc-block-inner-toc";

/// Assign a unique `id` to every level-2 heading, in document order.
///
/// Each heading's slug is recomputed from its current text; a slug already
/// assigned earlier in the pass is suffixed `-2`, `-3`, ... until unused.
/// Returns the assigned identifiers in document order.
pub fn assign_heading_ids(doc: &mut Document) -> Vec<String> {
    let mut assigned: HashSet<String> = HashSet::new();
    let mut ids = Vec::new();
    doc.walk_mut(&mut |block| {
        let BlockKind::Heading { level, text } = &block.kind else {
            return;
        };
        if *level != TOC_HEADING_LEVEL {
            return;
        }
        let base = slugify(text);
        let mut candidate = base.clone();
        let mut n = 2;
        while assigned.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        assigned.insert(candidate.clone());
        block.html_id = Some(candidate.clone());
        ids.push(candidate);
    });
    ids
}

/// Render the visible TOC list from persisted entries.
///
/// Entries that are ignored, have a blank effective label, or a blank anchor
/// are skipped; everything else becomes one `<li>` in persisted order.
pub fn render_toc(entries: &[TocEntry]) -> String {
    let mut out = String::new();
    let _ = write!(out, "<nav class=\"{NAV_CLASS}\"><ul>");
    for entry in entries.iter().filter(|e| e.is_listed()) {
        let _ = write!(
            out,
            "<li><a href=\"#{}\">{}</a></li>",
            escape_attr(&entry.anchor),
            escape_text(entry.effective_label()),
        );
    }
    out.push_str("</ul></nav>");
    out
}

/// Assign heading identifiers, then serialize the whole document, replacing
/// each TOC block with the rendered list.
pub fn render_document(doc: &mut Document, entries: &[TocEntry]) -> String {
    assign_heading_ids(doc);
    let toc_html = render_toc(entries);
    let mut out = String::new();
    for block in doc.roots() {
        render_block(block, &toc_html, &mut out);
    }
    out
}

fn render_block(block: &Block, toc_html: &str, out: &mut String) {
    match &block.kind {
        BlockKind::Section => {
            out.push_str("<section>");
            for child in &block.children {
                render_block(child, toc_html, out);
            }
            out.push_str("</section>");
        }
        BlockKind::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            match &block.html_id {
                Some(id) => {
                    let _ = write!(
                        out,
                        "<h{level} id=\"{}\">{}</h{level}>",
                        escape_attr(id),
                        escape_text(text),
                    );
                }
                None => {
                    let _ = write!(out, "<h{level}>{}</h{level}>", escape_text(text));
                }
            }
        }
        BlockKind::Paragraph(text) => {
            let _ = write!(out, "<p>{}</p>", escape_text(text));
        }
        BlockKind::Toc => out.push_str(toc_html),
    }
}

/// Escape for HTML text content.
fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape for a double-quoted HTML attribute value.
fn escape_attr(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
