//! Image extraction.

use crate::ir::ImageBlock;
use crate::markup::MarkupElement;

use super::derive_alignment;

/// Converts an image element into an image block.
///
/// The source is captured verbatim, inline-encoded or remote; payload
/// resolution happens later in the pipeline. Alignment falls back to the
/// enclosing element because editors typically align the wrapping paragraph
/// rather than the image itself.
pub fn convert_image(element: &MarkupElement, parent: Option<&MarkupElement>) -> ImageBlock {
    ImageBlock {
        source: element.attr("src").cloned().unwrap_or_default(),
        alt: element.attr("alt").cloned(),
        width: dimension_attr(element, "width"),
        height: dimension_attr(element, "height"),
        alignment: derive_alignment(element).or_else(|| parent.and_then(derive_alignment)),
    }
}

fn dimension_attr(element: &MarkupElement, name: &str) -> Option<u32> {
    element
        .attr(name)
        .and_then(|value| value.trim().parse::<u32>().ok())
}
