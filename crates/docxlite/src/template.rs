//! Template-engine boundary.
//!
//! The substitution engine itself is an external collaborator: given a
//! template string and a value mapping it returns expanded markup or fails on
//! malformed token nesting. Failures surface as diagnostic text rather than
//! propagating, so a live preview keeps functioning while the user edits.

use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::markup::find_element;
use crate::parser::styles::DECORATION_CLASSES;

/// Outcome of a template render.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Expanded markup, or the engine's diagnostic text on failure.
    pub markup: String,
    /// Whether `markup` holds diagnostic text instead of a render result.
    pub is_error: bool,
}

/// Renders a template against a value mapping.
///
/// `{{key}}` tokens substitute values; `{{#key}}...{{/key}}` sections render
/// when the bound value is truthy and repeat per element for sequences.
pub fn render(template: &str, values: &serde_json::Value) -> Rendered {
    let compiled = match mustache::compile_str(template) {
        Ok(compiled) => compiled,
        Err(err) => {
            return Rendered {
                markup: err.to_string(),
                is_error: true,
            };
        }
    };
    match compiled.render_to_string(values) {
        Ok(markup) => Rendered {
            markup,
            is_error: false,
        },
        Err(err) => Rendered {
            markup: err.to_string(),
            is_error: true,
        },
    }
}

/// Unwraps the editing surface's placeholder and section highlight spans,
/// keeping their children in place.
///
/// The editor decorates template tokens with styled `<span>` wrappers so they
/// stand out while editing; a template leaving the editor carries them and
/// they must not reach the render step. Input that cannot be parsed is
/// returned unchanged.
pub fn strip_decoration_spans(markup: &str) -> String {
    let Ok(dom) = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
    else {
        return markup.to_string();
    };
    let Some(body) = find_element(&dom.document, "body") else {
        return markup.to_string();
    };

    unwrap_decorations(&body);

    let mut out = Vec::new();
    let serializable = SerializableHandle::from(body);
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    match serialize(&mut out, &serializable, opts) {
        Ok(()) => String::from_utf8(out).unwrap_or_else(|_| markup.to_string()),
        Err(_) => markup.to_string(),
    }
}

fn unwrap_decorations(handle: &Handle) {
    let children: Vec<Handle> = handle.children.borrow().clone();
    let mut rebuilt = Vec::with_capacity(children.len());
    for child in children {
        unwrap_decorations(&child);
        if is_decoration_span(&child) {
            rebuilt.extend(child.children.borrow().iter().cloned());
        } else {
            rebuilt.push(child);
        }
    }
    *handle.children.borrow_mut() = rebuilt;
}

fn is_decoration_span(handle: &Handle) -> bool {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return false;
    };
    if &*name.local != "span" {
        return false;
    }
    attrs.borrow().iter().any(|attr| {
        &*attr.name.local == "class"
            && attr
                .value
                .split_whitespace()
                .any(|class| DECORATION_CLASSES.contains(&class))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_tokens_substitute() {
        let rendered = render("Hello {{name}}", &json!({ "name": "World" }));
        assert!(!rendered.is_error);
        assert_eq!(rendered.markup, "Hello World");
    }

    #[test]
    fn sections_gate_on_truthiness() {
        let template = "{{#flag}}Yes{{/flag}}";
        let off = render(template, &json!({ "flag": false }));
        assert_eq!(off.markup, "");
        let on = render(template, &json!({ "flag": true }));
        assert_eq!(on.markup, "Yes");
    }

    #[test]
    fn sections_repeat_over_sequences() {
        let rendered = render(
            "{{#items}}<li>{{label}}</li>{{/items}}",
            &json!({ "items": [{ "label": "a" }, { "label": "b" }] }),
        );
        assert!(!rendered.is_error);
        assert_eq!(rendered.markup, "<li>a</li><li>b</li>");
    }

    #[test]
    fn malformed_nesting_yields_diagnostic_text() {
        let rendered = render("{{#a}}unclosed", &json!({ "a": true }));
        assert!(rendered.is_error);
        assert!(!rendered.markup.is_empty());
    }

    #[test]
    fn decoration_spans_unwrap_in_place() {
        let markup = concat!(
            r#"<p>Dear <span data-placeholder="name" class="template-placeholder">{{name}}</span>,"#,
            r#" <span style="color: red">stay</span></p>"#,
        );
        let stripped = strip_decoration_spans(markup);
        assert!(stripped.contains("{{name}}"));
        assert!(!stripped.contains("template-placeholder"));
        assert!(stripped.contains(r#"<span style="color: red">stay</span>"#));
    }
}
