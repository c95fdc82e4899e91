//! Table extraction.

use crate::ir::{ParagraphBlock, TableBlock, TableCellBlock, TableRowBlock, TextRun};
use crate::markup::{ElementKind, MarkupElement, MarkupNode};

use super::build_paragraph;

/// Converts a table element into a table block.
///
/// Row elements are collected from the whole subtree so `thead`/`tbody`
/// wrappers stay transparent. Cell content is limited to paragraphs: element
/// children become paragraphs through the regular paragraph builder and bare
/// text children become single-run paragraphs, never nested tables or lists.
pub fn convert_table(element: &MarkupElement) -> TableBlock {
    let mut rows = Vec::new();
    collect_rows(element, &mut rows);
    TableBlock { rows }
}

fn collect_rows(element: &MarkupElement, rows: &mut Vec<TableRowBlock>) {
    for child in &element.children {
        if let MarkupNode::Element(child) = child {
            if child.kind == ElementKind::Row {
                rows.push(convert_row(child));
            } else {
                collect_rows(child, rows);
            }
        }
    }
}

fn convert_row(row: &MarkupElement) -> TableRowBlock {
    let cells = row
        .children
        .iter()
        .filter_map(|child| match child {
            MarkupNode::Element(cell) => Some(convert_cell(cell)),
            MarkupNode::Text(_) => None,
        })
        .collect();
    TableRowBlock { cells }
}

fn convert_cell(cell: &MarkupElement) -> TableCellBlock {
    let mut blocks = Vec::new();
    for child in &cell.children {
        match child {
            MarkupNode::Element(element) => blocks.push(build_paragraph(element, None)),
            MarkupNode::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    blocks.push(ParagraphBlock {
                        runs: vec![TextRun {
                            text: text.into(),
                            styles: Default::default(),
                        }],
                        ..Default::default()
                    });
                }
            }
        }
    }

    // A renderable cell needs at least one paragraph.
    if blocks.is_empty() {
        blocks.push(ParagraphBlock::default());
    }

    TableCellBlock {
        blocks,
        colspan: span_attr(cell, "colspan"),
        rowspan: span_attr(cell, "rowspan"),
    }
}

fn span_attr(cell: &MarkupElement, name: &str) -> Option<usize> {
    cell.attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|span| *span >= 1)
}
