//! List numbering management for DOCX output.
//!
//! Every contiguous list run in the model carries a reference id; the
//! serializer wants numeric numbering definitions. One abstract numbering is
//! emitted per reference, with one level entry per indent the run uses, so
//! numbering restarts exactly where the extraction recorded a new run.

use docx_rs::*;
use ecow::{EcoString, eco_format};

use crate::ir::{Block, DocumentModel, ListType};

/// Maps model reference ids onto the serializer's numbering definitions.
#[derive(Clone, Debug)]
pub struct DocxNumbering {
    ids: Vec<(EcoString, usize)>,
    next_id: usize,
}

impl Default for DocxNumbering {
    fn default() -> Self {
        Self::new()
    }
}

struct ReferenceGroup {
    reference: EcoString,
    list_type: ListType,
    /// Indent level → recorded start value, insertion-ordered.
    levels: Vec<(usize, Option<u32>)>,
}

impl DocxNumbering {
    /// Create a new numbering manager.
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers one numbering definition per reference id used in the model
    /// and returns the document with the definitions attached.
    pub fn register(&mut self, mut docx: Docx, model: &DocumentModel) -> Docx {
        for group in collect_groups(model) {
            let abstract_id = self.next_id;
            let numbering_id = self.next_id;
            self.next_id += 1;

            let mut abstract_numbering = AbstractNumbering::new(abstract_id);
            let mut levels = group.levels;
            levels.sort_by_key(|(indent, _)| *indent);
            for (indent, start) in levels {
                abstract_numbering =
                    abstract_numbering.add_level(create_level(indent, group.list_type, start));
            }

            docx = docx
                .add_abstract_numbering(abstract_numbering)
                .add_numbering(Numbering::new(numbering_id, abstract_id));
            self.ids.push((group.reference, numbering_id));
        }
        docx
    }

    /// Numeric numbering id for a model reference.
    pub fn id_for(&self, reference: &str) -> Option<usize> {
        self.ids
            .iter()
            .find(|(known, _)| known == reference)
            .map(|(_, id)| *id)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no definition was registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn collect_groups(model: &DocumentModel) -> Vec<ReferenceGroup> {
    let mut groups: Vec<ReferenceGroup> = Vec::new();
    for block in &model.blocks {
        let Block::Paragraph(paragraph) = block else {
            continue;
        };
        let Some(list) = &paragraph.list else {
            continue;
        };
        let index = match groups
            .iter()
            .position(|group| group.reference == list.reference)
        {
            Some(index) => index,
            None => {
                groups.push(ReferenceGroup {
                    reference: list.reference.clone(),
                    list_type: list.list_type,
                    levels: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        // The first sighting of an indent fixes its start value.
        if !group.levels.iter().any(|(indent, _)| *indent == list.indent) {
            group.levels.push((list.indent, list.start));
        }
    }
    groups
}

/// Create a list level with the specified parameters.
fn create_level(indent: usize, list_type: ListType, start: Option<u32>) -> Level {
    let (format, text, hanging) = match list_type {
        ListType::Ordered => ("decimal", eco_format!("%{}.", indent + 1), 420),
        ListType::Bullet => ("bullet", EcoString::inline("•"), 360),
    };
    let indent_size = 720 * (indent + 1) as i32;

    // The serializer requires an explicit start on every level; runs without
    // a recorded start count from 1.
    Level::new(
        indent,
        Start::new(start.unwrap_or(1) as usize),
        NumberFormat::new(format),
        LevelText::new(text.as_str()),
        LevelJc::new("left"),
    )
    .indent(
        Some(indent_size),
        Some(SpecialIndentType::Hanging(hanging)),
        None,
        None,
    )
}
