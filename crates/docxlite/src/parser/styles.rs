//! Inline style cascade.

use crate::ir::{StyleSet, VerticalScript};
use crate::markup::{ElementKind, MarkupElement, SpanMark};

/// Class tokens the editing surface uses to highlight template tokens. The
/// wrappers carry presentation-only styling that must not leak into runs.
pub(crate) const DECORATION_CLASSES: &[&str] = &["template-placeholder", "template-section"];

/// Resolves the inline style of an element given its inherited context.
///
/// Pure merge: the returned set starts from the inherited one and only the
/// fields the element declares are replaced. Superscript and subscript are
/// mutually exclusive, so the closest marker wins by virtue of being applied
/// last on the path from the root.
pub fn cascade(element: &MarkupElement, inherited: &StyleSet) -> StyleSet {
    let mut next = inherited.clone();

    if is_decoration(element) {
        return next;
    }

    match element.kind {
        ElementKind::Span(SpanMark::Bold) => next.bold = true,
        ElementKind::Span(SpanMark::Italic) => next.italic = true,
        ElementKind::Span(SpanMark::Superscript) => {
            next.script = Some(VerticalScript::Superscript)
        }
        ElementKind::Span(SpanMark::Subscript) => next.script = Some(VerticalScript::Subscript),
        _ => {}
    }

    if let Some(color) = element.style_decl("color") {
        next.color = Some(color);
    }
    if let Some(background) = element
        .style_decl("background")
        .or_else(|| element.style_decl("background-color"))
    {
        next.background = Some(background);
    }
    if let Some(font) = element.style_decl("font-family") {
        next.font = Some(font);
    }
    if let Some(size) = element.style_decl("font-size") {
        next.size = Some(size);
    }

    // Legacy presentational attributes of `font` elements take precedence
    // over a style declaration on the same element.
    if element.tag == "font" {
        if let Some(face) = element.attr("face").filter(|face| !face.is_empty()) {
            next.font = Some(face.clone());
        }
        if let Some(size) = element.attr("size").filter(|size| !size.is_empty()) {
            next.size = Some(size.clone());
        }
    }

    next
}

fn is_decoration(element: &MarkupElement) -> bool {
    element
        .classes()
        .any(|class| DECORATION_CLASSES.contains(&class))
}
