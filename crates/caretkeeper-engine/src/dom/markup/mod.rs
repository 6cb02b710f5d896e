//! # Markup Codec
//!
//! Reads and writes the HTML subset that editing surfaces exchange as
//! "serialized content". The parser is lenient the way a browser's
//! `innerHTML` setter is: stray close tags are dropped and open elements are
//! closed at end of input. Only truly unreadable input (a tag or comment that
//! never ends) is an error.
//!
//! Serialization is the inverse for everything the parser produces, with one
//! deliberate asymmetry: a non-breaking space is always written as `&nbsp;`,
//! matching what hosts emit.

pub mod scanner;

use scanner::Scanner;

use super::{Element, NodeData, NodeId, NodeSpec, Tree, TreeError, is_void_tag};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),
    #[error("Unterminated comment starting at byte {0}")]
    UnterminatedComment(usize),
    #[error("Unterminated attribute value starting at byte {0}")]
    UnterminatedAttribute(usize),
    #[error("Missing tag name at byte {0}")]
    InvalidTagName(usize),
    #[error("Tree rejected parsed markup: {0}")]
    Tree(#[from] TreeError),
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

/// True at `<x`, `</` or `<!`, the only places `<` opens markup.
fn at_markup_start(sc: &Scanner<'_>) -> bool {
    sc.peek() == Some(b'<')
        && matches!(sc.peek_at(1), Some(b) if b.is_ascii_alphabetic() || b == b'/' || b == b'!')
}

/// Parses markup into detached node descriptions.
pub fn parse_fragment(src: &str) -> Result<Vec<NodeSpec>, MarkupError> {
    let mut sc = Scanner::new(src);
    let mut top: Vec<NodeSpec> = Vec::new();
    // Open elements, innermost last.
    let mut open: Vec<(Element, Vec<NodeSpec>)> = Vec::new();

    fn push(top: &mut Vec<NodeSpec>, open: &mut [(Element, Vec<NodeSpec>)], node: NodeSpec) {
        let siblings = match open.last_mut() {
            Some((_, children)) => children,
            None => top,
        };
        // Adjacent text collapses into one node, as a host would.
        if let NodeSpec::Text(text) = &node
            && let Some(NodeSpec::Text(previous)) = siblings.last_mut()
        {
            previous.push_str(text);
            return;
        }
        siblings.push(node);
    }

    fn close_top(top: &mut Vec<NodeSpec>, open: &mut Vec<(Element, Vec<NodeSpec>)>) {
        if let Some((element, children)) = open.pop() {
            push(top, open, NodeSpec::Element { element, children });
        }
    }

    while !sc.eof() {
        let start = sc.pos();

        if sc.starts_with(b"<!--") {
            sc.bump_n(4);
            sc.take_until("-->")
                .ok_or(MarkupError::UnterminatedComment(start))?;
            continue;
        }

        if sc.starts_with(b"<!") {
            // Doctype and friends carry nothing for an editable fragment.
            sc.take_until(">").ok_or(MarkupError::UnterminatedTag(start))?;
            continue;
        }

        if sc.starts_with(b"</") {
            sc.bump_n(2);
            let name = sc.eat_while(is_name_byte).to_ascii_lowercase();
            if name.is_empty() {
                return Err(MarkupError::InvalidTagName(start));
            }
            sc.take_until(">").ok_or(MarkupError::UnterminatedTag(start))?;
            if let Some(depth) = open.iter().rposition(|(element, _)| element.tag == name) {
                while open.len() > depth {
                    close_top(&mut top, &mut open);
                }
            }
            continue;
        }

        if at_markup_start(&sc) {
            let (element, self_closing) = parse_start_tag(&mut sc)?;
            if self_closing || is_void_tag(&element.tag) {
                push(
                    &mut top,
                    &mut open,
                    NodeSpec::Element {
                        element,
                        children: Vec::new(),
                    },
                );
            } else {
                open.push((element, Vec::new()));
            }
            continue;
        }

        // Text runs to the next real markup start; a lone `<` is text.
        sc.bump();
        while !sc.eof() && !at_markup_start(&sc) {
            sc.bump();
        }
        let raw = sc.slice(start, sc.pos());
        let text = html_escape::decode_html_entities(raw).into_owned();
        push(&mut top, &mut open, NodeSpec::Text(text));
    }

    while !open.is_empty() {
        close_top(&mut top, &mut open);
    }
    Ok(top)
}

fn parse_start_tag(sc: &mut Scanner<'_>) -> Result<(Element, bool), MarkupError> {
    let start = sc.pos();
    sc.bump(); // <
    let name = sc.eat_while(is_name_byte);
    if name.is_empty() {
        return Err(MarkupError::InvalidTagName(start));
    }
    let mut element = Element::new(name);

    loop {
        sc.skip_whitespace();
        match sc.peek() {
            None => return Err(MarkupError::UnterminatedTag(start)),
            Some(b'>') => {
                sc.bump();
                return Ok((element, false));
            }
            Some(b'/') if sc.peek_at(1) == Some(b'>') => {
                sc.bump_n(2);
                return Ok((element, true));
            }
            Some(_) => {}
        }

        let attr_name =
            sc.eat_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'));
        if attr_name.is_empty() {
            // A stray `/` or `=`; skip it rather than loop forever.
            sc.bump();
            continue;
        }

        sc.skip_whitespace();
        let value = if sc.peek() == Some(b'=') {
            sc.bump();
            sc.skip_whitespace();
            let value_start = sc.pos();
            match sc.peek() {
                Some(quote @ (b'"' | b'\'')) => {
                    sc.bump();
                    let delimiter = if quote == b'"' { "\"" } else { "'" };
                    sc.take_until(delimiter)
                        .ok_or(MarkupError::UnterminatedAttribute(value_start))?
                }
                _ => sc.eat_while(|b| !b.is_ascii_whitespace() && b != b'>'),
            }
        } else {
            ""
        };
        element = element.with_attribute(
            attr_name,
            html_escape::decode_html_entities(value).into_owned(),
        );
    }
}

/// Replaces every child of the tree root with nodes parsed from `src`.
///
/// Previous children are detached, so handles into the old content go stale.
pub fn parse_into(tree: &mut Tree, src: &str) -> Result<Vec<NodeId>, MarkupError> {
    let specs = parse_fragment(src)?;
    let built: Vec<NodeId> = specs.iter().map(|spec| tree.build(spec)).collect();
    tree.replace_children(tree.root(), built.clone())?;
    Ok(built)
}

/// Serializes the children of `node` (the `innerHTML` of it).
pub fn serialize_children(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(node) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Serializes `node` itself (the `outerHTML` of it).
pub fn serialize_node(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

enum Visit {
    Open(NodeId),
    Close(NodeId),
}

fn write_node(tree: &Tree, node: NodeId, out: &mut String) {
    let mut pending = vec![Visit::Open(node)];
    while let Some(visit) = pending.pop() {
        let node = match visit {
            Visit::Open(node) => node,
            Visit::Close(node) => {
                if let Some(tag) = tree.tag(node) {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                continue;
            }
        };
        match tree.data(node) {
            Some(NodeData::Text(text)) => {
                let escaped = html_escape::encode_text(text);
                out.push_str(&escaped.replace('\u{a0}', "&nbsp;"));
            }
            Some(NodeData::Element(element)) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if is_void_tag(&element.tag) {
                    continue;
                }
                pending.push(Visit::Close(node));
                pending.extend(tree.children(node).iter().rev().map(|&child| Visit::Open(child)));
            }
            None => {}
        }
    }
}
