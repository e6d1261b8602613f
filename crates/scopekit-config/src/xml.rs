//! XML persistence for configuration trees
//!
//! Text and CDATA content become the node value. Repeated sibling names are
//! folded into the first occurrence with [`ConfigNode::extend_child`].
//! Text of an element is collected in full and trimmed once when the
//! element closes; whitespace-only text around child elements is dropped.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::ConfigError;
use crate::node::ConfigNode;

/// Parse XML markup into a tree rooted at the document element
///
/// # Errors
/// Returns [`ConfigError::Xml`] for malformed markup and
/// [`ConfigError::EmptyDocument`] when there is no root element.
pub fn parse_str(xml: &str) -> Result<ConfigNode, ConfigError> {
    let mut reader = Reader::from_str(xml);

    // Open elements, innermost last
    let mut stack: Vec<ConfigNode> = Vec::new();
    let mut root: Option<ConfigNode> = None;

    loop {
        match reader.read_event().map_err(ConfigError::xml)? {
            Event::Start(start) => {
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                let node = open_element(&start)?;
                close_element(node, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let mut node = stack
                    .pop()
                    .ok_or_else(|| ConfigError::Xml("unbalanced closing tag".to_string()))?;
                finish_text(&mut node);
                close_element(node, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(ConfigError::xml)?;
                append_text(&mut stack, &value);
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let value = std::str::from_utf8(&raw).map_err(ConfigError::xml)?;
                append_text(&mut stack, value);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ConfigError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or(ConfigError::EmptyDocument)
}

/// Serialize a tree as indented XML
///
/// # Errors
/// Returns [`ConfigError::Xml`] if the writer fails.
pub fn to_string(node: &ConfigNode) -> Result<String, ConfigError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_node(&mut writer, node)?;
    String::from_utf8(writer.into_inner()).map_err(ConfigError::xml)
}

fn open_element(start: &BytesStart<'_>) -> Result<ConfigNode, ConfigError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(ConfigError::xml)?
        .to_string();
    let mut node = ConfigNode::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(ConfigError::xml)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(ConfigError::xml)?
            .to_string();
        let value = attr.unescape_value().map_err(ConfigError::xml)?;
        node.set_attribute(key, value.into_owned());
    }
    Ok(node)
}

fn close_element(
    node: ConfigNode,
    stack: &mut [ConfigNode],
    root: &mut Option<ConfigNode>,
) -> Result<(), ConfigError> {
    match stack.last_mut() {
        Some(parent) => {
            if parent.child(node.name()).is_some() {
                parent.extend_child(&node, true);
            } else {
                parent.add_child(node);
            }
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(ConfigError::Xml("multiple root elements".to_string())),
    }
}

/// Trim collected text; `<a></a>` is an empty leaf, `<a/>` carries no value
fn finish_text(node: &mut ConfigNode) {
    let trimmed = node.value().map(|v| v.trim().to_string());
    let value = match trimmed {
        Some(text) if !text.is_empty() => Some(text),
        _ if node.has_children() => None,
        _ => Some(String::new()),
    };
    node.set_value(value);
}

fn append_text(stack: &mut [ConfigNode], text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(current) = stack.last_mut() {
        let value = match current.value() {
            Some(existing) => format!("{existing}{text}"),
            None => text.to_string(),
        };
        current.set_value(Some(value));
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &ConfigNode) -> Result<(), ConfigError> {
    let start = BytesStart::new(node.name()).with_attributes(node.attributes());

    if !node.has_children() && node.value().is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(ConfigError::xml);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(ConfigError::xml)?;
    if let Some(value) = node.value() {
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(ConfigError::xml)?;
    }
    for child in node.children() {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(Cow::Borrowed(node.name()))))
        .map_err(ConfigError::xml)
}
