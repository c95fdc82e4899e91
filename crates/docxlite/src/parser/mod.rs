//! Block extraction: classifies the markup tree into the document model.

pub mod list;
pub mod media;
pub mod styles;
pub mod table;

use ecow::EcoString;

use crate::ir::{
    Alignment, Block, DocumentModel, ListMetadata, ParagraphBlock, StyleSet, TextRun,
};
use crate::markup::{ElementKind, MarkupElement, MarkupNode};

use list::ListTracker;
use styles::cascade;

/// Walks the top-level children of the markup body and classifies each node
/// into a block, threading the list continuity state through the pass.
#[derive(Debug, Default)]
pub struct ModelExtractor {
    list: ListTracker,
    blocks: Vec<Block>,
}

impl ModelExtractor {
    /// Creates an extractor with fresh per-pass state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts the document model from the body element, in source order.
    pub fn extract(mut self, root: &MarkupElement) -> DocumentModel {
        for child in &root.children {
            self.process_node(child, None);
        }
        DocumentModel {
            blocks: self.blocks,
        }
    }

    fn process_node(&mut self, node: &MarkupNode, parent: Option<&MarkupElement>) {
        let element = match node {
            MarkupNode::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    self.list.flush();
                    self.blocks.push(Block::Paragraph(ParagraphBlock {
                        runs: vec![TextRun {
                            text: text.into(),
                            styles: StyleSet::default(),
                        }],
                        ..Default::default()
                    }));
                }
                return;
            }
            MarkupNode::Element(element) => element,
        };

        match element.kind {
            ElementKind::Table => {
                self.list.flush();
                self.blocks.push(Block::Table(table::convert_table(element)));
            }
            ElementKind::Image => {
                self.list.flush();
                self.blocks
                    .push(Block::Image(media::convert_image(element, parent)));
            }
            // List containers produce no block of their own; their items are
            // classified individually and the run closes with the container.
            ElementKind::List => {
                for child in &element.children {
                    self.process_node(child, Some(element));
                }
                self.list.flush();
            }
            ElementKind::ListItem
                if element
                    .attr("data-list")
                    .is_some_and(|value| !value.is_empty()) =>
            {
                let (list_type, indent) = list::parse_annotation(element);
                let metadata = self.list.advance(list_type, indent);
                self.blocks
                    .push(Block::Paragraph(build_paragraph(element, Some(metadata))));
            }
            _ => {
                self.list.flush();
                let paragraph = build_paragraph(element, None);
                if paragraph.runs.is_empty() {
                    // Pure wrapper: it may itself wrap paragraphs, tables or
                    // images, so classify its children instead.
                    for child in &element.children {
                        self.process_node(child, Some(element));
                    }
                } else {
                    self.blocks.push(Block::Paragraph(paragraph));
                }
            }
        }
    }
}

/// Builds a paragraph block from an element's inline content.
pub fn build_paragraph(element: &MarkupElement, list: Option<ListMetadata>) -> ParagraphBlock {
    let mut runs = Vec::new();
    let base = cascade(element, &StyleSet::default());
    for child in &element.children {
        collect_runs(child, &base, &mut runs);
    }

    let heading = match element.kind {
        ElementKind::Heading(level) => Some(level),
        _ => None,
    };

    ParagraphBlock {
        runs,
        alignment: derive_alignment(element),
        heading,
        list,
    }
}

fn collect_runs(node: &MarkupNode, styles: &StyleSet, runs: &mut Vec<TextRun>) {
    match node {
        MarkupNode::Text(text) => {
            let text = collapse_whitespace(text);
            if text.trim().is_empty() {
                return;
            }
            runs.push(TextRun {
                text,
                styles: styles.clone(),
            });
        }
        MarkupNode::Element(element) => {
            let next = cascade(element, styles);
            for child in &element.children {
                collect_runs(child, &next, runs);
            }
        }
    }
}

/// Resolves a declared alignment: `align` attribute first, then the
/// `text-align` style declaration, then the editing surface's `ql-align-*`
/// class convention. First match wins.
pub(crate) fn derive_alignment(element: &MarkupElement) -> Option<Alignment> {
    if let Some(alignment) = element
        .attr("align")
        .and_then(|value| Alignment::from_keyword(value.trim()))
    {
        return Some(alignment);
    }
    if let Some(alignment) = element
        .style_decl("text-align")
        .and_then(|value| Alignment::from_keyword(&value))
    {
        return Some(alignment);
    }
    element.classes().find_map(|class| {
        class
            .strip_prefix("ql-align-")
            .and_then(Alignment::from_keyword)
    })
}

fn collapse_whitespace(text: &str) -> EcoString {
    let mut out = EcoString::new();
    let mut in_whitespace = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}
