//! Document style management for DOCX output.

use docx_rs::*;

/// Registers the paragraph styles the mapper refers to by name.
#[derive(Clone, Debug, Default)]
pub struct DocxStyles;

impl DocxStyles {
    /// Create a new style manager.
    pub fn new() -> Self {
        Self
    }

    /// Create a heading style with the specified parameters.
    fn create_heading_style(name: &str, display_name: &str, size: usize) -> Style {
        Style::new(name, StyleType::Paragraph)
            .name(display_name)
            .size(size)
            .bold()
    }

    /// Initialize all document styles.
    pub fn initialize_styles(&self, docx: Docx) -> Docx {
        let heading1 = Self::create_heading_style("Heading1", "Heading 1", 32);
        let heading2 = Self::create_heading_style("Heading2", "Heading 2", 28);
        let heading3 = Self::create_heading_style("Heading3", "Heading 3", 26);
        let heading4 = Self::create_heading_style("Heading4", "Heading 4", 24);
        let heading5 = Self::create_heading_style("Heading5", "Heading 5", 22);
        let heading6 = Self::create_heading_style("Heading6", "Heading 6", 20);

        let caption = Style::new("Caption", StyleType::Paragraph)
            .name("Caption")
            .italic()
            .size(16)
            .align(AlignmentType::Center);

        docx.add_style(heading1)
            .add_style(heading2)
            .add_style(heading3)
            .add_style(heading4)
            .add_style(heading5)
            .add_style(heading6)
            .add_style(caption)
    }
}
