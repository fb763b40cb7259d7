//! Markdown ingestion: CommonMark source into the block-document model.
//!
//! Level-1 headings open a new sectional container holding everything up to
//! the next level-1 heading, which is what gives a per-section TOC its scope
//! when one document carries several instances. A block consisting of the
//! literal marker `<!-- toc -->` becomes a [`BlockKind::Toc`] position
//! marker.

use pulldown_cmark::{Event as MdEvent, Options, Parser as MdParser, Tag as MdTag, TagEnd};

use crate::document::{BlockId, BlockKind, Document};

/// Marker block that places a TOC instance in a markdown source.
pub const TOC_MARKER: &str = "<!-- toc -->";

/// Parser extensions are enabled explicitly rather than via `Options::all()`
/// for reproducibility across pulldown-cmark upgrades.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Parse markdown into a fresh [`Document`].
///
/// Total: any input yields a document, with constructs outside the block
/// model (tables, lists, footnote definitions) contributing nothing. Heading
/// text is the concatenated inline text of the heading, trimmed.
pub fn parse_document(input: &str) -> Document {
    let mut doc = Document::new();
    let mut current_section: Option<BlockId> = None;
    let mut heading_level: Option<u8> = None;
    // Some while collecting the inline text of a heading or paragraph.
    let mut text_buf: Option<String> = None;

    for event in MdParser::new_ext(input, markdown_options()) {
        match event {
            MdEvent::Start(MdTag::Heading { level, .. }) => {
                heading_level = Some(level as u8);
                text_buf = Some(String::new());
            }
            MdEvent::End(TagEnd::Heading(_)) => {
                let text = text_buf.take().unwrap_or_default().trim().to_string();
                let level = heading_level.take().unwrap_or(2);
                if level == 1 {
                    let section = doc
                        .insert(None, None, BlockKind::Section)
                        .expect("root insert is infallible");
                    doc.insert(Some(section), None, BlockKind::Heading { level, text });
                    current_section = Some(section);
                } else {
                    doc.insert(current_section, None, BlockKind::Heading { level, text });
                }
            }
            MdEvent::Start(MdTag::Paragraph) => {
                text_buf = Some(String::new());
            }
            MdEvent::End(TagEnd::Paragraph) => {
                let text = text_buf.take().unwrap_or_default().trim().to_string();
                if text == TOC_MARKER {
                    doc.insert(current_section, None, BlockKind::Toc);
                } else if !text.is_empty() {
                    doc.insert(current_section, None, BlockKind::Paragraph(text));
                }
            }
            MdEvent::Text(t) | MdEvent::Code(t) => {
                if let Some(buf) = text_buf.as_mut() {
                    buf.push_str(&t);
                }
            }
            MdEvent::SoftBreak | MdEvent::HardBreak => {
                if let Some(buf) = text_buf.as_mut() {
                    buf.push(' ');
                }
            }
            MdEvent::Html(html) | MdEvent::InlineHtml(html) => {
                if html.trim() == TOC_MARKER {
                    doc.insert(current_section, None, BlockKind::Toc);
                }
            }
            _ => {}
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ScanScope;

    #[test]
    fn test_flat_document() {
        let doc = parse_document("## Setup\n\nSome body text.\n\n## FAQ\n");
        let titles: Vec<&str> = doc
            .headings_in(ScanScope::Document)
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(titles, vec!["Setup", "FAQ"]);
        assert!(doc
            .roots()
            .iter()
            .any(|b| b.kind == BlockKind::Paragraph("Some body text.".into())));
    }

    #[test]
    fn test_h1_opens_section() {
        let doc = parse_document("# Part One\n\n## Alpha\n\n# Part Two\n\n## Beta\n");
        let sections: Vec<&crate::document::Block> =
            doc.roots().iter().filter(|b| b.is_section()).collect();
        assert_eq!(sections.len(), 2);

        let alpha: Vec<&str> = doc
            .headings_in(ScanScope::Section(sections[0].id))
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(alpha, vec!["Alpha"]);

        let beta: Vec<&str> = doc
            .headings_in(ScanScope::Section(sections[1].id))
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(beta, vec!["Beta"]);
    }

    #[test]
    fn test_toc_marker_becomes_toc_block() {
        let doc = parse_document("# Guide\n\n<!-- toc -->\n\n## Setup\n");
        let mut toc_id = None;
        doc.walk(&mut |block| {
            if block.kind == BlockKind::Toc {
                toc_id = Some(block.id);
            }
        });
        let toc_id = toc_id.expect("marker should produce a Toc block");
        // The marker sits inside the Guide section, so that is its scope.
        match doc.scope_of(toc_id) {
            Some(ScanScope::Section(section)) => {
                let titles: Vec<&str> = doc
                    .headings_in(ScanScope::Section(section))
                    .iter()
                    .map(|(_, t)| *t)
                    .collect();
                assert_eq!(titles, vec!["Setup"]);
            }
            other => panic!("expected section scope, got {other:?}"),
        }
    }

    #[test]
    fn test_heading_with_inline_code() {
        let doc = parse_document("## Using `cargo test` locally\n");
        let titles: Vec<&str> = doc
            .headings_in(ScanScope::Document)
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(titles, vec!["Using cargo test locally"]);
    }

    #[test]
    fn test_soft_break_joins_paragraph_lines() {
        let doc = parse_document("line one\nline two\n");
        assert!(doc
            .roots()
            .iter()
            .any(|b| b.kind == BlockKind::Paragraph("line one line two".into())));
    }

    #[test]
    fn test_empty_input() {
        let doc = parse_document("");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_deeper_headings_preserved_not_scanned() {
        let doc = parse_document("### Minor\n\n## Major\n");
        let titles: Vec<&str> = doc
            .headings_in(ScanScope::Document)
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(titles, vec!["Major"]);
        // The H3 still exists in the tree for rendering.
        let mut levels = Vec::new();
        doc.walk(&mut |block| {
            if let BlockKind::Heading { level, .. } = block.kind {
                levels.push(level);
            }
        });
        assert_eq!(levels, vec![3, 2]);
    }
}
