//! DOCX output built on the external serializer.
//!
//! This module is organized into several components:
//! - Writer: maps the document model onto serializer primitives
//! - Styles: document style management
//! - Numbering: list numbering definitions per reference id
//! - Image processor: payload resolution and picture conversion

mod image_processor;
mod numbering;
mod styles;
mod writer;

pub use image_processor::{DocxImageProcessor, ImagePayloads};
pub use numbering::DocxNumbering;
pub use styles::DocxStyles;
pub use writer::DocxWriter;
