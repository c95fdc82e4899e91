//! Markup tree capability.
//!
//! Extraction operates on a small owned tree of classified nodes rather than
//! on a parser-specific DOM, so the parsing facility can vary per platform.
//! The adapter provided here is backed by `html5ever`; environments without a
//! markup parser simply yield no tree, which callers must treat as an empty
//! document.

use ecow::EcoString;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    /// A text node.
    Text(EcoString),
    /// An element node.
    Element(MarkupElement),
}

/// An element of the markup tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    /// Classified kind of the element.
    pub kind: ElementKind,
    /// Lowercased tag name as written in the markup.
    pub tag: EcoString,
    /// Attributes in source order.
    pub attrs: Vec<MarkupAttr>,
    /// Child nodes in source order.
    pub children: Vec<MarkupNode>,
}

/// A markup attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupAttr {
    /// Attribute name.
    pub name: EcoString,
    /// Attribute value.
    pub value: EcoString,
}

/// Block classification of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Generic paragraph-level container (`p`, `div`, `blockquote`, ...).
    Paragraph,
    /// Heading with level 1..=6.
    Heading(u8),
    /// List container (`ol`, `ul`).
    List,
    /// List item (`li`).
    ListItem,
    /// Table (`table`).
    Table,
    /// Table row (`tr`).
    Row,
    /// Table cell (`td`, `th`).
    Cell,
    /// Image (`img`).
    Image,
    /// Inline span carrying a style marker.
    Span(SpanMark),
    /// Anything else; treated as a transparent wrapper when it has no runs.
    Other,
}

/// Style marker carried by an inline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanMark {
    /// Bold marker (`strong`, `b`).
    Bold,
    /// Italic marker (`em`, `i`, `cite`).
    Italic,
    /// Superscript marker (`sup`).
    Superscript,
    /// Subscript marker (`sub`).
    Subscript,
    /// Inline element without an intrinsic marker (`span`, `a`, `font`, ...).
    Plain,
}

impl MarkupElement {
    /// Looks up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&EcoString> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    /// Looks up a property inside the element's inline `style` declaration.
    pub fn style_decl(&self, property: &str) -> Option<EcoString> {
        let style = self.attr("style")?;
        for part in style.split(';') {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if key.trim().eq_ignore_ascii_case(property) && !value.is_empty() {
                return Some(value.into());
            }
        }
        None
    }

    /// Iterates the element's class tokens.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .map(|value| value.split_whitespace())
            .into_iter()
            .flatten()
    }
}

/// Parses markup into a tree rooted at the document body.
///
/// Returns `None` when no markup-parsing capability is available or the input
/// cannot be read; callers map that to an empty document model.
pub fn parse_markup(markup: &str) -> Option<MarkupElement> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .ok()?;
    let body = find_element(&dom.document, "body")?;
    Some(convert_element(&body))
}

/// Finds the first element with the given tag name, depth first.
pub(crate) fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data
        && &*name.local == tag
    {
        return Some(handle.clone());
    }
    for child in handle.children.borrow().iter() {
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

fn convert_element(handle: &Handle) -> MarkupElement {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        unreachable!("convert_element is only called on element nodes");
    };
    let tag: EcoString = (&*name.local).into();
    let attrs = attrs
        .borrow()
        .iter()
        .map(|attr| MarkupAttr {
            name: (&*attr.name.local).into(),
            value: (&*attr.value).into(),
        })
        .collect();
    let children = handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect();

    MarkupElement {
        kind: classify(&tag),
        tag,
        attrs,
        children,
    }
}

fn convert_node(handle: &Handle) -> Option<MarkupNode> {
    match &handle.data {
        NodeData::Text { contents } => {
            let contents = contents.borrow();
            let text: &str = &contents;
            Some(MarkupNode::Text(text.into()))
        }
        NodeData::Element { .. } => Some(MarkupNode::Element(convert_element(handle))),
        // Comments, doctypes and processing instructions carry no content.
        _ => None,
    }
}

fn classify(tag: &str) -> ElementKind {
    match tag {
        "p" | "div" | "blockquote" | "pre" | "section" | "article" | "header" | "footer" => {
            ElementKind::Paragraph
        }
        "h1" => ElementKind::Heading(1),
        "h2" => ElementKind::Heading(2),
        "h3" => ElementKind::Heading(3),
        "h4" => ElementKind::Heading(4),
        "h5" => ElementKind::Heading(5),
        "h6" => ElementKind::Heading(6),
        "ol" | "ul" => ElementKind::List,
        "li" => ElementKind::ListItem,
        "table" => ElementKind::Table,
        "tr" => ElementKind::Row,
        "td" | "th" => ElementKind::Cell,
        "img" => ElementKind::Image,
        "strong" | "b" => ElementKind::Span(SpanMark::Bold),
        "em" | "i" | "cite" => ElementKind::Span(SpanMark::Italic),
        "sup" => ElementKind::Span(SpanMark::Superscript),
        "sub" => ElementKind::Span(SpanMark::Subscript),
        "span" | "a" | "u" | "s" | "font" | "code" | "br" => {
            ElementKind::Span(SpanMark::Plain)
        }
        _ => ElementKind::Other,
    }
}
