// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Lightweight XML-to-tree conversion for the public-data API responses.
//!
//! Elements become keys, text becomes string values, attributes are dropped.
//! Repeated sibling elements become a list; a lone element stays a single
//! value. The upstream API relies on this: `<items>` holds one `<item>` or
//! many, and the caller decides what to do with each shape.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

/// Key under which text is kept when an element also has child elements.
pub const TEXT_KEY: &str = "_";

/// Child elements keyed by tag name.
pub type XmlMap = BTreeMap<String, XmlValue>;

/// A normalized XML node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// Leaf element: its trimmed text content (possibly empty).
    Text(String),
    /// Element with child elements.
    Map(XmlMap),
    /// Repeated sibling elements sharing a tag name.
    List(Vec<XmlValue>),
}

/// The input is not well-formed XML.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} (at byte {position})")]
pub struct XmlError {
    message: String,
    position: u64,
}

impl XmlError {
    fn new(message: impl Into<String>, position: u64) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl XmlValue {
    /// Looks up a child element by name. `None` for leaves and lists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            Self::Text(_) | Self::List(_) => None,
        }
    }

    /// Text content of a leaf element.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) | Self::List(_) => None,
        }
    }

    /// Children of a non-leaf element.
    #[must_use]
    pub const fn as_map(&self) -> Option<&XmlMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Text(_) | Self::List(_) => None,
        }
    }

    /// Follows a path of element names from this node.
    #[must_use]
    pub fn path(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }
}

impl From<XmlValue> for serde_json::Value {
    fn from(value: XmlValue) -> Self {
        match value {
            XmlValue::Text(text) => Self::String(text),
            XmlValue::Map(map) => Self::Object(
                map.into_iter()
                    .map(|(key, child)| (key, Self::from(child)))
                    .collect(),
            ),
            XmlValue::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
        }
    }
}

/// An element that has been opened but not yet closed.
struct Frame {
    name: String,
    children: XmlMap,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: XmlMap::new(),
            text: String::new(),
        }
    }

    fn finish(self) -> (String, XmlValue) {
        let text = self.text.trim().to_string();
        if self.children.is_empty() {
            return (self.name, XmlValue::Text(text));
        }
        let mut children = self.children;
        if !text.is_empty() {
            insert_child(&mut children, TEXT_KEY.to_string(), XmlValue::Text(text));
        }
        (self.name, XmlValue::Map(children))
    }
}

/// Adds a child, turning repeated names into a list.
fn insert_child(children: &mut XmlMap, name: String, value: XmlValue) {
    match children.remove(&name) {
        None => {
            children.insert(name, value);
        }
        Some(XmlValue::List(mut items)) => {
            items.push(value);
            children.insert(name, XmlValue::List(items));
        }
        Some(existing) => {
            children.insert(name, XmlValue::List(vec![existing, value]));
        }
    }
}

fn byte_offset<R>(reader: &Reader<R>) -> u64 {
    u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX)
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parses an XML document into a single-key map `{root_name: root_value}`.
///
/// # Errors
///
/// Returns [`XmlError`] if the input is not well-formed: syntax errors,
/// mismatched or unclosed tags, no root element, several root elements, or
/// text outside the root element.
pub fn parse(input: &str) -> Result<XmlValue, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, XmlValue)> = None;

    loop {
        let position = byte_offset(&reader);
        let event = reader
            .read_event()
            .map_err(|e| XmlError::new(e.to_string(), position))?;

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::new("multiple root elements", position));
                }
                stack.push(Frame::new(element_name(start.name().as_ref())));
            }
            Event::Empty(empty) => {
                let name = element_name(empty.name().as_ref());
                let value = XmlValue::Text(String::new());
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None if root.is_none() => root = Some((name, value)),
                    None => return Err(XmlError::new("multiple root elements", position)),
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(XmlError::new("unexpected closing tag", position));
                };
                let (name, value) = frame.finish();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| XmlError::new(e.to_string(), position))?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError::new("text outside of root element", position)),
                }
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let text = String::from_utf8_lossy(&raw);
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None => return Err(XmlError::new("CDATA outside of root element", position)),
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::new(
            format!("unclosed element <{}>", open.name),
            byte_offset(&reader),
        ));
    }

    let (name, value) = root.ok_or_else(|| XmlError::new("document has no root element", 0))?;
    let mut document = XmlMap::new();
    document.insert(name, value);
    Ok(XmlValue::Map(document))
}
