//! Writer implementations for the output side of the pipeline.

pub mod docx;

pub use docx::{DocxImageProcessor, DocxWriter, ImagePayloads};
