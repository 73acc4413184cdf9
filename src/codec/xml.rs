// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Element tree codec.
//!
//! ```text
//! <User><id>1</id><name>Melissa Raspberry</name></User>
//! ```
//!
//! maps to `{"id": "1", "name": "Melissa Raspberry"}`. Elements with child
//! elements become objects, repeated children become arrays and leaf
//! elements become strings. The root element name is the entity name and is
//! dropped on decode. Attributes, comments and processing instructions are
//! ignored.
//!
//! Scalars always decode as strings, so a field declared as a number in the
//! target type cannot be read from xml.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::escape;
use serde_json::{Map, Value};
use error::CodecError;
use super::{Codec, MediaType, APPLICATION_XML, TEXT_XML};

pub struct XmlCodec {
    types: Vec<MediaType>,
}

impl XmlCodec {
    pub fn new() -> Self {
        let types = [APPLICATION_XML, TEXT_XML].iter().filter_map(|t| MediaType::parse(t)).collect();
        XmlCodec { types }
    }
}

impl Default for XmlCodec {
    fn default() -> Self {
        XmlCodec::new()
    }
}

impl Codec for XmlCodec {
    fn media_types(&self) -> &[MediaType] {
        &self.types
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<Value> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                debug!("Could not parse input as xml: {:?}", e);
                CodecError::decode(e)
            })?;
            match event {
                Event::Start(ref start) => {
                    if root.is_some() {
                        return Err(CodecError::decode("more than one root element"));
                    }
                    stack.push(Frame::new(element_name(start)?));
                }
                Event::Empty(ref start) => {
                    if root.is_some() {
                        return Err(CodecError::decode("more than one root element"));
                    }
                    let frame = Frame::new(element_name(start)?);
                    close(frame, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let frame = stack.pop().ok_or_else(|| CodecError::decode("unbalanced end element"))?;
                    close(frame, &mut stack, &mut root)?;
                }
                Event::Text(ref text) => {
                    let text = text.unescape().map_err(CodecError::decode)?;
                    append_text(&mut stack, &text)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned()).map_err(CodecError::decode)?;
                    append_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(CodecError::decode(format!("element <{}> is not closed", open.name)));
        }
        root.ok_or_else(|| CodecError::decode("document has no root element"))
    }

    fn encode(&self, root: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut out = String::new();
        match *value {
            Value::Null => {
                check_name(root)?;
                out.push_str(&format!("<{}></{}>", root, root));
            }
            Value::Array(_) => return Err(CodecError::encode("a list needs an enclosing element")),
            _ => write_element(&mut out, root, value)?,
        }
        Ok(out.into_bytes())
    }
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
    has_children: bool,
}

impl Frame {
    fn new(name: String) -> Self {
        Frame { name, children: Map::new(), text: String::new(), has_children: false }
    }

    fn into_value(self, is_root: bool) -> Result<Value, CodecError> {
        if self.has_children {
            if !self.text.trim().is_empty() {
                return Err(CodecError::decode(format!("element <{}> mixes text and elements", self.name)));
            }
            Ok(Value::Object(self.children))
        } else if is_root && self.text.trim().is_empty() {
            Ok(Value::Object(Map::new()))
        } else {
            Ok(Value::String(self.text))
        }
    }
}

fn element_name(start: &BytesStart) -> Result<String, CodecError> {
    String::from_utf8(start.local_name().as_ref().to_vec()).map_err(CodecError::decode)
}

fn append_text(stack: &mut Vec<Frame>, text: &str) -> Result<(), CodecError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(CodecError::decode("text outside of the root element")),
    }
}

fn close(frame: Frame, stack: &mut Vec<Frame>, root: &mut Option<Value>) -> Result<(), CodecError> {
    let name = frame.name.clone();
    let value = frame.into_value(stack.is_empty())?;
    match stack.last_mut() {
        Some(parent) => {
            parent.has_children = true;
            let merged = match parent.children.remove(&name) {
                None => value,
                Some(Value::Array(mut items)) => {
                    items.push(value);
                    Value::Array(items)
                }
                Some(existing) => Value::Array(vec![existing, value]),
            };
            parent.children.insert(name, merged);
        }
        None => *root = Some(value),
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), CodecError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => (first.is_alphabetic() || first == '_') && chars.all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CodecError::encode(format!("'{}' is not a valid element name", name)))
    }
}

fn write_element(out: &mut String, name: &str, value: &Value) -> Result<(), CodecError> {
    check_name(name)?;
    match *value {
        Value::Null => {}
        Value::Array(ref items) => {
            for item in items {
                if let Value::Array(_) = *item {
                    return Err(CodecError::encode(format!("nested list in <{}>", name)));
                }
                write_element(out, name, item)?;
            }
        }
        Value::Object(ref map) => {
            out.push_str(&format!("<{}>", name));
            for (key, child) in map {
                write_element(out, key, child)?;
            }
            out.push_str(&format!("</{}>", name));
        }
        Value::String(ref s) => {
            out.push_str(&format!("<{}>{}</{}>", name, escape(s.as_str()), name));
        }
        Value::Bool(b) => out.push_str(&format!("<{}>{}</{}>", name, b, name)),
        Value::Number(ref n) => out.push_str(&format!("<{}>{}</{}>", name, n, name)),
    }
    Ok(())
}
