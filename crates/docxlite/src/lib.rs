//! # Docxlite
//!
//! Converts rich-text editor markup into DOCX documents. The pipeline parses
//! markup into a normalized document model, resolves image payloads, and maps
//! the model onto the primitives of an external DOCX serializer which packs
//! the final byte blob.

pub mod ir;
pub mod markup;
pub mod parser;
pub mod template;
pub mod writer;

mod error;

pub use error::*;

use crate::ir::DocumentModel;
use crate::parser::ModelExtractor;
use crate::writer::{DocxImageProcessor, DocxWriter, ImagePayloads};

/// The result type for docxlite.
pub type Result<T, Err = Error> = std::result::Result<T, Err>;

/// Features for the export.
#[derive(Debug, Default, Clone)]
pub struct ExportFeat {
    /// Remove the editing surface's placeholder highlight wrappers from a
    /// template before rendering it.
    pub strip_decorations: bool,
}

/// Task builder for exporting markup to a DOCX document.
#[derive(Debug, Default)]
pub struct DocxExport {
    feat: ExportFeat,
}

impl DocxExport {
    /// Creates a new export task with default features.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets export features.
    pub fn with_feature(mut self, feat: ExportFeat) -> Self {
        self.feat = feat;
        self
    }

    /// Exports markup to DOCX bytes.
    ///
    /// Extraction and mapping are synchronous; the only suspension point is
    /// image payload resolution, which runs one concurrent fetch per image
    /// block and completes before mapping starts.
    pub async fn export(&self, markup: &str) -> Result<Vec<u8>> {
        let model = parse_document_model(markup);
        let processor = DocxImageProcessor::new();
        let payloads = ImagePayloads::resolve(&processor, &model).await;
        DocxWriter::new().write(&model, &payloads)
    }

    /// Renders a template against a value mapping, then exports the expanded
    /// markup.
    ///
    /// A render failure is a top-level export failure: no output artifact is
    /// produced. Use [`template::render`] directly for the preview surface,
    /// which wants the diagnostic text instead.
    pub async fn export_template(
        &self,
        template: &str,
        values: &serde_json::Value,
    ) -> Result<Vec<u8>> {
        let template = if self.feat.strip_decorations {
            template::strip_decoration_spans(template)
        } else {
            template.to_string()
        };
        let rendered = template::render(&template, values);
        if rendered.is_error {
            return Err(format!("template rendering failed: {}", rendered.markup).into());
        }
        self.export(&rendered.markup).await
    }
}

/// Parses markup into the normalized document model.
///
/// When no markup-parsing capability is available the result is an empty
/// model, which is a valid, if degenerate, document.
pub fn parse_document_model(markup: &str) -> DocumentModel {
    match markup::parse_markup(markup) {
        Some(root) => ModelExtractor::new().extract(&root),
        None => DocumentModel::default(),
    }
}

#[cfg(test)]
mod tests;
