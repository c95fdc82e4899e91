//! DOCX document writer.
//!
//! Maps the normalized document model onto the serializer's primitives. Color
//! and size values are normalized here, at the boundary, because the model
//! carries them as written in the markup.

use std::io::Cursor;
use std::sync::OnceLock;

use docx_rs::*;
use log::{debug, warn};
use regex::Regex;

use crate::Result;
use crate::ir::{
    Alignment, Block, DocumentModel, ImageBlock, ParagraphBlock, TableBlock, TextRun,
    VerticalScript,
};

use super::image_processor::{DocxImageProcessor, ImagePayloads};
use super::numbering::DocxNumbering;
use super::styles::DocxStyles;

/// DOCX writer that generates the output document from a document model.
pub struct DocxWriter {
    styles: DocxStyles,
    numbering: DocxNumbering,
    image_processor: DocxImageProcessor,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxWriter {
    /// Create a writer with fresh style and numbering managers.
    pub fn new() -> Self {
        Self {
            styles: DocxStyles::new(),
            numbering: DocxNumbering::new(),
            image_processor: DocxImageProcessor::new(),
        }
    }

    /// Generate the DOCX byte blob for a model and its resolved image
    /// payloads.
    pub fn write(&mut self, model: &DocumentModel, payloads: &ImagePayloads) -> Result<Vec<u8>> {
        let mut docx = Docx::new();
        docx = self.styles.initialize_styles(docx);
        docx = self.numbering.register(docx, model);

        for (index, block) in model.blocks.iter().enumerate() {
            match block {
                Block::Paragraph(paragraph) => {
                    docx = docx.add_paragraph(self.map_paragraph(paragraph));
                }
                Block::Table(table) => {
                    if table.rows.is_empty() {
                        debug!("skipping table without rows");
                        continue;
                    }
                    docx = docx.add_table(self.map_table(table));
                }
                Block::Image(image) => {
                    let Some(data) = payloads.get(index) else {
                        warn!("omitting image block with unresolved source");
                        continue;
                    };
                    docx = self.add_image(docx, image, data);
                }
            }
        }

        let built = docx.build();
        let mut buffer = Vec::new();
        built
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|err| format!("failed to pack document: {err}"))?;
        Ok(buffer)
    }

    fn map_paragraph(&self, block: &ParagraphBlock) -> Paragraph {
        let mut paragraph = Paragraph::new();

        if block.runs.is_empty() {
            paragraph = paragraph.add_run(Run::new().add_text(""));
        }
        for run in &block.runs {
            paragraph = paragraph.add_run(map_run(run));
        }

        if let Some(level) = block.heading {
            paragraph = paragraph.style(heading_style(level));
        }
        if let Some(alignment) = block.alignment {
            paragraph = paragraph.align(map_alignment(alignment));
        }
        if let Some(list) = &block.list
            && let Some(id) = self.numbering.id_for(&list.reference)
        {
            paragraph = paragraph.numbering(NumberingId::new(id), IndentLevel::new(list.indent));
        }

        paragraph
    }

    fn map_table(&self, table: &TableBlock) -> Table {
        let columns = table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| cell.colspan.unwrap_or(1).max(1))
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0);

        let mut rows = Vec::with_capacity(table.rows.len());
        let mut vmerge = vec![0usize; columns];

        for row in &table.rows {
            let mut cells = Vec::new();
            let mut cell_iter = row.cells.iter();
            let mut col_index = 0;

            while col_index < columns {
                if vmerge[col_index] > 0 {
                    cells.push(TableCell::new().vertical_merge(VMergeType::Continue));
                    vmerge[col_index] -= 1;
                    col_index += 1;
                    continue;
                }

                if let Some(cell) = cell_iter.next() {
                    let span = cell.colspan.unwrap_or(1).max(1);
                    let mut table_cell = TableCell::new();

                    // A cell list that lost its paragraphs on the way here is
                    // still rendered as one empty paragraph.
                    if cell.blocks.is_empty() {
                        table_cell = table_cell
                            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("")));
                    }
                    for paragraph in &cell.blocks {
                        table_cell = table_cell.add_paragraph(self.map_paragraph(paragraph));
                    }

                    if span > 1 {
                        table_cell = table_cell.grid_span(span);
                    }
                    if let Some(rowspan) = cell.rowspan.filter(|rowspan| *rowspan > 1) {
                        table_cell = table_cell.vertical_merge(VMergeType::Restart);
                        for offset in 0..span {
                            if col_index + offset < columns {
                                vmerge[col_index + offset] =
                                    vmerge[col_index + offset].max(rowspan - 1);
                            }
                        }
                    }

                    cells.push(table_cell);
                    col_index += span;
                } else {
                    cells.push(TableCell::new());
                    col_index += 1;
                }
            }

            rows.push(TableRow::new(cells));
        }

        Table::new(rows)
            .width(5000, WidthType::Pct)
            .layout(TableLayoutType::Fixed)
    }

    fn add_image(&self, docx: Docx, image: &ImageBlock, data: &[u8]) -> Docx {
        let Some(pic) = self.image_processor.to_pic(data, image) else {
            return docx;
        };

        let mut paragraph = Paragraph::new().add_run(Run::new().add_image(pic));
        if let Some(alignment) = image.alignment {
            paragraph = paragraph.align(map_alignment(alignment));
        }
        let docx = docx.add_paragraph(paragraph);

        match &image.alt {
            Some(alt) if !alt.is_empty() => docx.add_paragraph(
                Paragraph::new()
                    .style("Caption")
                    .add_run(Run::new().add_text(alt.as_str())),
            ),
            _ => docx,
        }
    }
}

fn map_run(run: &TextRun) -> Run {
    let mut mapped = Run::new().add_text(run.text.as_str());
    let styles = &run.styles;

    if styles.bold {
        mapped = mapped.bold();
    }
    if styles.italic {
        mapped = mapped.italic();
    }
    if let Some(font) = &styles.font {
        mapped = mapped.fonts(RunFonts::new().ascii(font.as_str()));
    }
    if let Some(raw) = styles.size.as_deref() {
        match normalize_size(raw) {
            Some(size) => mapped = mapped.size(size),
            None => debug!("dropping unparseable font size {raw:?}"),
        }
    }
    if let Some(raw) = styles.color.as_deref() {
        match normalize_color(raw) {
            Some(color) => mapped = mapped.color(color),
            None => debug!("dropping unsupported color {raw:?}"),
        }
    }
    // Run highlights accept only named colors; hex and rgb() backgrounds are
    // dropped instead of producing invalid markup.
    match styles.script {
        Some(VerticalScript::Superscript) => {
            mapped.run_property = mapped.run_property.vert_align(VertAlignType::SuperScript);
        }
        Some(VerticalScript::Subscript) => {
            mapped.run_property = mapped.run_property.vert_align(VertAlignType::SubScript);
        }
        None => {}
    }

    mapped
}

fn heading_style(level: u8) -> &'static str {
    match level {
        1 => "Heading1",
        2 => "Heading2",
        3 => "Heading3",
        4 => "Heading4",
        5 => "Heading5",
        _ => "Heading6",
    }
}

fn map_alignment(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
        // The format spells justification as "both".
        Alignment::Justify => AlignmentType::Both,
    }
}

/// Normalizes a color declaration to six uppercase hex digits.
///
/// Accepts `#abc`, `#aabbcc` and `rgb()`/`rgba()` notation with every channel
/// in range; anything else is dropped so the run degrades to the default
/// color instead of carrying an invalid value.
fn normalize_color(value: &str) -> Option<String> {
    let trimmed = value.trim().to_ascii_lowercase();

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            3 => Some(
                hex.chars()
                    .flat_map(|ch| [ch, ch])
                    .collect::<String>()
                    .to_ascii_uppercase(),
            ),
            6 => Some(hex.to_ascii_uppercase()),
            _ => None,
        };
    }

    static RGB: OnceLock<Regex> = OnceLock::new();
    let rgb = RGB.get_or_init(|| {
        Regex::new(r"rgba?\((\d{1,3}),\s*(\d{1,3}),\s*(\d{1,3})").unwrap()
    });
    let captures = rgb.captures(&trimmed)?;
    let mut channels = [0u32; 3];
    for (slot, capture) in channels.iter_mut().zip(captures.iter().skip(1)) {
        let channel: u32 = capture?.as_str().parse().ok()?;
        if channel > 255 {
            return None;
        }
        *slot = channel;
    }
    Some(format!(
        "{:02X}{:02X}{:02X}",
        channels[0], channels[1], channels[2]
    ))
}

/// Parses the numeric portion of a size declaration and converts it to the
/// serializer's unit (value × 0.5, rounded). Non-numeric sizes are omitted.
fn normalize_size(value: &str) -> Option<usize> {
    let numeric: String = value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.')
        .collect();
    let parsed: f64 = numeric.parse().ok()?;
    Some((parsed * 0.5).round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::StyleSet;

    #[test]
    fn bold_only_run_maps_to_a_bold_primitive() {
        let run = map_run(&TextRun {
            text: "x".into(),
            styles: StyleSet {
                bold: true,
                ..Default::default()
            },
        });
        assert!(run.run_property.bold.is_some());
        assert!(run.run_property.italic.is_none());
        assert!(run.run_property.color.is_none());
        assert!(run.run_property.sz.is_none());
    }

    #[test]
    fn three_digit_hex_expands() {
        assert_eq!(normalize_color("#abc").as_deref(), Some("AABBCC"));
        assert_eq!(normalize_color("#AaBbCc").as_deref(), Some("AABBCC"));
    }

    #[test]
    fn rgb_notation_converts_to_hex() {
        assert_eq!(normalize_color("rgb(10, 20, 30)").as_deref(), Some("0A141E"));
        assert_eq!(normalize_color("rgba(0,0,0,0.5)").as_deref(), Some("000000"));
    }

    #[test]
    fn out_of_range_channel_rejects_the_color() {
        assert_eq!(normalize_color("rgb(300, 10, 10)"), None);
    }

    #[test]
    fn unsupported_representations_are_dropped() {
        assert_eq!(normalize_color("red"), None);
        assert_eq!(normalize_color("#ab"), None);
        assert_eq!(normalize_color("#abcg12"), None);
        assert_eq!(normalize_color("hsl(10, 20%, 30%)"), None);
    }

    #[test]
    fn sizes_convert_to_half_units() {
        assert_eq!(normalize_size("24px"), Some(12));
        assert_eq!(normalize_size("13pt"), Some(7));
        assert_eq!(normalize_size("18"), Some(9));
    }

    #[test]
    fn non_numeric_sizes_are_omitted() {
        assert_eq!(normalize_size("large"), None);
        assert_eq!(normalize_size(""), None);
        assert_eq!(normalize_size("1.2.3em"), None);
    }
}
