/*
Copyright 2022 Daniel Brotsky. All rights reserved.

All of the copyrighted work in this repository is licensed under the
GNU Affero General Public License, reproduced in the LICENSE-AGPL file.

Attribution:

Some source files in this repository are derived from files in two Adobe Open
Source projects: the Adobe License Decoder repository found at this URL:
    https://github.com/adobe/adobe-license-decoder.rs
and the FRL Online Proxy repository found at this URL:
    https://github.com/adobe/frl-online-proxy

The files in those original works are copyright 2022 Adobe and the use of those
materials in this work is permitted by the MIT license under which they were
released.  That license is reproduced here in the LICENSE-MIT file.
*/
//! The self-describing document format license content travels in.
//!
//! Documents follow the `java.beans.XMLEncoder` conventions: every value
//! is an element that names its own type, either directly (`<string>`,
//! `<long>`) or through the `class` attribute of an `<object>`, and
//! composite objects list their properties as `<void property="...">`
//! children.  Decoding dispatches on those embedded tags, never on what
//! the caller expects to find.

use quick_xml::escape::escape;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tlc_base::Timestamp;

pub const ROOT_TAG: &str = "java";
pub const OBJECT_TAG: &str = "object";
pub const PROPERTY_TAG: &str = "void";
pub const STRING_TAG: &str = "string";
pub const LONG_TAG: &str = "long";
pub const DATE_CLASS: &str = "java.util.Date";
pub const PRINCIPAL_CLASS: &str = "javax.security.auth.x500.X500Principal";

/// How deeply objects may nest.  License documents only ever nest
/// one object inside the document element.
pub const MAX_DEPTH: usize = 16;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_START: &str = r#"<java version="1.4.0" class="java.beans.XMLDecoder">"#;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),
    #[error("{0}")]
    Attribute(#[from] AttrError),
    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),
    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),
    #[error("unexpected text \"{0}\"")]
    UnexpectedText(String),
    #[error("<{element}> has no {attribute} attribute")]
    MissingAttribute { element: String, attribute: &'static str },
    #[error("\"{0}\" is not a valid long value")]
    InvalidLong(String),
    #[error("document ended unexpectedly")]
    UnexpectedEof,
    #[error("content follows the document element")]
    TrailingContent,
    #[error("objects are nested more than {} deep", MAX_DEPTH)]
    TooDeep,
}

/// The type tags a document value can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    String,
    Timestamp,
    Principal,
    Record,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::String => STRING_TAG.fmt(f),
            Tag::Timestamp => DATE_CLASS.fmt(f),
            Tag::Principal => PRINCIPAL_CLASS.fmt(f),
            Tag::Record => OBJECT_TAG.fmt(f),
        }
    }
}

/// A tagged document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    /// A `java.util.Date`, carried as epoch milliseconds.
    Timestamp(Timestamp),
    /// An `X500Principal`, carried as its distinguished name.
    Principal(String),
    Record(Record),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::String(_) => Tag::String,
            Value::Timestamp(_) => Tag::Timestamp,
            Value::Principal(_) => Tag::Principal,
            Value::Record(_) => Tag::Record,
        }
    }
}

/// A composite object: its class name and its named properties,
/// in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub class: String,
    pub properties: Vec<(String, Value)>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self { class: class.into(), properties: Vec::new() }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.properties.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }
}

/// Render a value as a complete document.
pub fn to_xml(value: &Value) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(ROOT_START);
    out.push('\n');
    write_value(&mut out, value, 1);
    out.push_str("</java>\n");
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::String(s) => write_leaf(out, STRING_TAG, &escape_text(s), depth),
        Value::Timestamp(ts) => {
            write_line(out, depth, &format!(r#"<object class="{}">"#, DATE_CLASS));
            write_leaf(out, LONG_TAG, &ts.to_millis().to_string(), depth + 1);
            write_line(out, depth, "</object>");
        }
        Value::Principal(name) => {
            write_line(out, depth, &format!(r#"<object class="{}">"#, PRINCIPAL_CLASS));
            write_leaf(out, STRING_TAG, &escape_text(name), depth + 1);
            write_line(out, depth, "</object>");
        }
        Value::Record(record) => {
            write_line(out, depth, &format!(r#"<object class="{}">"#, escape(&record.class)));
            for (name, value) in &record.properties {
                let open = format!(r#"<{} property="{}">"#, PROPERTY_TAG, escape(name));
                write_line(out, depth + 1, &open);
                write_value(out, value, depth + 2);
                write_line(out, depth + 1, "</void>");
            }
            write_line(out, depth, "</object>");
        }
    }
}

fn write_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push(' ');
    }
    out.push_str(line);
    out.push('\n');
}

fn write_leaf(out: &mut String, tag: &str, text: &str, depth: usize) {
    write_line(out, depth, &format!("<{}>{}</{}>", tag, text, tag));
}

// a literal carriage return would be normalized away by XML readers
fn escape_text(s: &str) -> String {
    escape(s).replace('\r', "&#13;")
}

/// Parse a complete document into the value it holds.
pub fn from_xml(text: &str) -> Result<Value, DocumentError> {
    let mut parser = Parser { reader: Reader::from_str(text), depth: 0 };
    match parser.next_node()? {
        Node::Open(start) if element_name(&start) == ROOT_TAG => {}
        other => return Err(other.unexpected()),
    }
    let node = parser.next_node()?;
    let value = parser.parse_value(node)?;
    parser.expect_close(ROOT_TAG)?;
    match parser.next_node()? {
        Node::Eof => Ok(value),
        _ => Err(DocumentError::TrailingContent),
    }
}

enum Node<'a> {
    Open(BytesStart<'a>),
    Empty(BytesStart<'a>),
    Close(String),
    Eof,
}

impl Node<'_> {
    fn unexpected(self) -> DocumentError {
        match self {
            Node::Open(start) | Node::Empty(start) => {
                DocumentError::UnexpectedElement(element_name(&start))
            }
            Node::Close(name) => DocumentError::UnexpectedEnd(name),
            Node::Eof => DocumentError::UnexpectedEof,
        }
    }
}

fn element_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attribute(start: &BytesStart, key: &'static str) -> Result<String, DocumentError> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Err(DocumentError::MissingAttribute { element: element_name(start), attribute: key })
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// The next structural event, skipping declarations, comments,
    /// and the whitespace that indents the document.
    fn next_node(&mut self) -> Result<Node<'a>, DocumentError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => return Ok(Node::Open(start)),
                Event::Empty(start) => return Ok(Node::Empty(start)),
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    return Ok(Node::Close(name));
                }
                Event::Eof => return Ok(Node::Eof),
                Event::Text(text) => {
                    let text = text.unescape()?;
                    if !text.trim().is_empty() {
                        return Err(DocumentError::UnexpectedText(text.trim().to_string()));
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    if !text.trim().is_empty() {
                        return Err(DocumentError::UnexpectedText(text.trim().to_string()));
                    }
                }
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    fn expect_close(&mut self, tag: &str) -> Result<(), DocumentError> {
        match self.next_node()? {
            Node::Close(name) if name == tag => Ok(()),
            other => Err(other.unexpected()),
        }
    }

    fn parse_value(&mut self, node: Node<'a>) -> Result<Value, DocumentError> {
        match node {
            Node::Open(start) => match element_name(&start).as_str() {
                STRING_TAG => Ok(Value::String(self.read_text(STRING_TAG)?)),
                OBJECT_TAG => {
                    let class = attribute(&start, "class")?;
                    self.parse_object(class)
                }
                _ => Err(Node::Open(start).unexpected()),
            },
            Node::Empty(start) if element_name(&start) == STRING_TAG => {
                Ok(Value::String(String::new()))
            }
            other => Err(other.unexpected()),
        }
    }

    fn parse_object(&mut self, class: String) -> Result<Value, DocumentError> {
        match class.as_str() {
            DATE_CLASS => {
                let text = self.read_leaf(LONG_TAG)?;
                let millis = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| DocumentError::InvalidLong(text.clone()))?;
                self.expect_close(OBJECT_TAG)?;
                Ok(Value::Timestamp(Timestamp::from_millis(millis)))
            }
            PRINCIPAL_CLASS => {
                let name = self.read_leaf(STRING_TAG)?;
                self.expect_close(OBJECT_TAG)?;
                Ok(Value::Principal(name))
            }
            _ => self.parse_record(class),
        }
    }

    fn parse_record(&mut self, class: String) -> Result<Value, DocumentError> {
        if self.depth >= MAX_DEPTH {
            return Err(DocumentError::TooDeep);
        }
        self.depth += 1;
        let result = self.parse_properties(class);
        self.depth -= 1;
        result
    }

    fn parse_properties(&mut self, class: String) -> Result<Value, DocumentError> {
        let mut record = Record::new(class);
        loop {
            match self.next_node()? {
                Node::Close(name) if name == OBJECT_TAG => return Ok(Value::Record(record)),
                Node::Open(start) if element_name(&start) == PROPERTY_TAG => {
                    let name = attribute(&start, "property")?;
                    let node = self.next_node()?;
                    let value = self.parse_value(node)?;
                    self.expect_close(PROPERTY_TAG)?;
                    record.push(name, value);
                }
                other => return Err(other.unexpected()),
            }
        }
    }

    fn read_leaf(&mut self, tag: &str) -> Result<String, DocumentError> {
        match self.next_node()? {
            Node::Open(start) if element_name(&start) == tag => self.read_text(tag),
            Node::Empty(start) if element_name(&start) == tag => Ok(String::new()),
            other => Err(other.unexpected()),
        }
    }

    /// Character content up to the closing tag, taken verbatim.
    fn read_text(&mut self, tag: &str) -> Result<String, DocumentError> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(chunk) => text.push_str(&chunk.unescape()?),
                Event::CData(chunk) => text.push_str(&String::from_utf8_lossy(&chunk)),
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    return if name == tag {
                        Ok(text)
                    } else {
                        Err(DocumentError::UnexpectedEnd(name))
                    };
                }
                Event::Start(start) | Event::Empty(start) => {
                    return Err(DocumentError::UnexpectedElement(element_name(&start)))
                }
                Event::Eof => return Err(DocumentError::UnexpectedEof),
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }
}
