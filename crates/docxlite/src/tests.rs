use serde_json::json;

use super::*;
use crate::ir::{Alignment, Block, ListType, VerticalScript};

fn model(markup: &str) -> DocumentModel {
    parse_document_model(markup)
}

fn paragraph(block: &Block) -> &ir::ParagraphBlock {
    match block {
        Block::Paragraph(paragraph) => paragraph,
        other => panic!("expected paragraph, got {other:?}"),
    }
}

// A valid 1x1 transparent PNG.
const PNG_1X1: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk",
    "YPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==",
);

#[test]
fn styled_runs_cascade_through_nesting() {
    let model = model(r##"<p>plain <strong>bold <em>both</em></strong></p>"##);
    assert_eq!(model.blocks.len(), 1);
    let paragraph = paragraph(&model.blocks[0]);
    assert_eq!(paragraph.runs.len(), 3);
    assert_eq!(paragraph.runs[0].text, "plain ");
    assert!(!paragraph.runs[0].styles.bold);
    assert!(paragraph.runs[1].styles.bold);
    assert!(!paragraph.runs[1].styles.italic);
    assert!(paragraph.runs[2].styles.bold);
    assert!(paragraph.runs[2].styles.italic);
}

#[test]
fn inline_declarations_reach_nested_runs() {
    let model = model(r##"<p><span style="color:#abc">a<sup>b</sup></span></p>"##);
    let paragraph = paragraph(&model.blocks[0]);
    assert_eq!(paragraph.runs.len(), 2);
    assert_eq!(paragraph.runs[0].styles.color.as_deref(), Some("#abc"));
    assert_eq!(paragraph.runs[0].styles.script, None);
    assert_eq!(paragraph.runs[1].styles.color.as_deref(), Some("#abc"));
    assert_eq!(
        paragraph.runs[1].styles.script,
        Some(VerticalScript::Superscript)
    );
}

#[test]
fn headings_classify_with_alignment_convention() {
    let model = model(r#"<h2 class="ql-align-center">Title</h2>"#);
    let paragraph = paragraph(&model.blocks[0]);
    assert_eq!(paragraph.heading, Some(2));
    assert_eq!(paragraph.alignment, Some(Alignment::Center));
}

#[test]
fn consecutive_ordered_items_share_one_reference() {
    let model = model(concat!(
        r#"<ol>"#,
        r#"<li data-list="ordered" data-indent="0">first</li>"#,
        r#"<li data-list="ordered" data-indent="0">second</li>"#,
        r#"</ol>"#,
    ));
    assert_eq!(model.blocks.len(), 2);
    let first = paragraph(&model.blocks[0]).list.clone().unwrap();
    let second = paragraph(&model.blocks[1]).list.clone().unwrap();
    assert_eq!(first.reference, second.reference);
    assert_eq!(first.start, Some(1));
    assert_eq!(second.start, None);
    assert_eq!(first.list_type, ListType::Ordered);
}

#[test]
fn indent_change_splits_the_numbering_run() {
    let model = model(concat!(
        r#"<ol>"#,
        r#"<li data-list="ordered" data-indent="0">outer</li>"#,
        r#"<li data-list="ordered" data-indent="1">inner</li>"#,
        r#"</ol>"#,
    ));
    let outer = paragraph(&model.blocks[0]).list.clone().unwrap();
    let inner = paragraph(&model.blocks[1]).list.clone().unwrap();
    assert_ne!(outer.reference, inner.reference);
    assert_eq!(inner.start, Some(1));
    assert_eq!(inner.indent, 1);
}

#[test]
fn interrupting_block_discards_the_run() {
    let model = model(concat!(
        r#"<ol><li data-list="bullet">one</li></ol>"#,
        r#"<p>interruption</p>"#,
        r#"<ol><li data-list="bullet">two</li></ol>"#,
    ));
    assert_eq!(model.blocks.len(), 3);
    let before = paragraph(&model.blocks[0]).list.clone().unwrap();
    let after = paragraph(&model.blocks[2]).list.clone().unwrap();
    assert_ne!(before.reference, after.reference);
    assert_eq!(after.start, Some(1));
}

#[test]
fn corrupted_annotations_degrade_to_bullet_at_indent_zero() {
    let model = model(r#"<ol><li data-list="fancy" data-indent="deep">x</li></ol>"#);
    let list = paragraph(&model.blocks[0]).list.clone().unwrap();
    assert_eq!(list.list_type, ListType::Bullet);
    assert_eq!(list.indent, 0);
}

#[test]
fn two_by_two_table_keeps_its_shape() {
    let model = model(concat!(
        r#"<table>"#,
        r#"<tr><td>a</td><td>b</td></tr>"#,
        r#"<tr><td>c</td><td>d</td></tr>"#,
        r#"</table>"#,
    ));
    assert_eq!(model.blocks.len(), 1);
    let Block::Table(table) = &model.blocks[0] else {
        panic!("expected table");
    };
    assert_eq!(table.rows.len(), 2);
    for row in &table.rows {
        assert_eq!(row.cells.len(), 2);
    }
    assert_eq!(table.rows[0].cells[0].blocks[0].runs[0].text, "a");
}

#[test]
fn empty_cell_still_holds_one_paragraph() {
    let model = model(r#"<table><tr><td></td></tr></table>"#);
    let Block::Table(table) = &model.blocks[0] else {
        panic!("expected table");
    };
    let cell = &table.rows[0].cells[0];
    assert_eq!(cell.blocks.len(), 1);
    assert!(cell.blocks[0].runs.is_empty());
}

#[test]
fn cell_spans_parse_from_attributes() {
    let model = model(concat!(
        r#"<table><tr>"#,
        r#"<td colspan="2" rowspan="3">wide</td>"#,
        r#"<td colspan="0">bad</td>"#,
        r#"</tr></table>"#,
    ));
    let Block::Table(table) = &model.blocks[0] else {
        panic!("expected table");
    };
    let cells = &table.rows[0].cells;
    assert_eq!(cells[0].colspan, Some(2));
    assert_eq!(cells[0].rowspan, Some(3));
    assert_eq!(cells[1].colspan, None);
}

#[test]
fn wrappers_recurse_instead_of_emitting_empty_blocks() {
    let model = model(r#"<div><p>inner</p><table><tr><td>x</td></tr></table></div>"#);
    assert_eq!(model.blocks.len(), 2);
    assert_eq!(paragraph(&model.blocks[0]).runs[0].text, "inner");
    assert!(matches!(model.blocks[1], Block::Table(_)));
}

#[test]
fn bare_text_becomes_a_single_run_paragraph() {
    let model = model("loose text<p>block</p>");
    assert_eq!(model.blocks.len(), 2);
    assert_eq!(paragraph(&model.blocks[0]).runs[0].text, "loose text");
}

#[test]
fn image_wrapped_in_aligned_paragraph_inherits_alignment() {
    let model = model(concat!(
        r#"<p class="ql-align-center">"#,
        r#"<img src="https://example.com/pic.png" alt="a pic" width="320" height="200">"#,
        r#"</p>"#,
    ));
    assert_eq!(model.blocks.len(), 1);
    let Block::Image(image) = &model.blocks[0] else {
        panic!("expected image");
    };
    assert_eq!(image.source, "https://example.com/pic.png");
    assert_eq!(image.alt.as_deref(), Some("a pic"));
    assert_eq!(image.width, Some(320));
    assert_eq!(image.height, Some(200));
    assert_eq!(image.alignment, Some(Alignment::Center));
}

#[test]
fn unparseable_markup_capability_yields_an_empty_model() {
    assert!(model("").blocks.is_empty());
}

#[tokio::test]
async fn export_embeds_inline_images() {
    let markup = format!(
        r#"<h1>Report</h1><p><img src="data:image/png;base64,{PNG_1X1}"></p>"#
    );
    let bytes = DocxExport::new().export(&markup).await.unwrap();
    assert!(bytes.starts_with(b"PK"), "expected a packed archive");
}

#[tokio::test]
async fn unreachable_image_is_omitted_but_the_rest_exports() {
    let markup = concat!(
        r#"<p>kept</p>"#,
        r#"<p><img src="http://127.0.0.1:9/missing.png"></p>"#,
        r#"<p>also kept</p>"#,
    );
    let model = parse_document_model(markup);
    assert_eq!(model.blocks.len(), 3);
    let bytes = DocxExport::new().export(markup).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn template_render_failure_produces_no_output() {
    let result = DocxExport::new()
        .export_template("{{#a}}oops", &json!({ "a": true }))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn template_values_flow_into_the_model() {
    let bytes = DocxExport::new()
        .export_template(
            "<p>Dear {{name}},</p>{{#ps}}<p>PS: {{ps}}</p>{{/ps}}",
            &json!({ "name": "Ada", "ps": "see you" }),
        )
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}
