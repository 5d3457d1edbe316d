//! # XML codec
//!
//! The V2 gateway speaks a very small dialect of XML: a single `<xml>` document element whose children are leaves,
//! each one wrapped in CDATA. We never need a general purpose DOM, so this module maps that dialect straight onto a
//! [`ParameterMap`].
//!
//! Encoding rules:
//! * every non-blank entry becomes `<key><![CDATA[value]]></key>`, using [`Value::to_wire_string`];
//! * blank entries (null or `""`) are skipped entirely instead of being written as empty tags.
//!
//! Decoding rules:
//! * attributes are collected under `@name` keys;
//! * a leaf element decodes to its trimmed text, or to a map of its attributes plus a `text` key;
//! * repeated sibling tags are folded into a list, in document order;
//! * entity references other than the five predefined ones are rejected, as is any `<!DOCTYPE>`, so there is nothing
//!   for an XXE payload to hook into.

use log::{debug, trace};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    errors::{PayError, Result},
    value::{ParameterMap, Value},
};

/// Document element used for every request and reply.
pub const ROOT_ELEMENT: &str = "xml";
/// Anything nested deeper than this is not a gateway message.
const MAX_DEPTH: usize = 64;

pub fn encode(map: &ParameterMap, root: &str) -> String {
    let mut xml = format!("<{root}>");
    for (key, value) in map.iter().filter(|(_, v)| !v.is_blank()) {
        xml.push('<');
        xml.push_str(key);
        xml.push('>');
        push_cdata(&mut xml, &value.to_wire_string());
        xml.push_str("</");
        xml.push_str(key);
        xml.push('>');
    }
    xml.push_str(&format!("</{root}>"));
    xml
}

// A literal `]]>` would terminate the section early, so it is split across two sections.
fn push_cdata(xml: &mut String, text: &str) {
    xml.push_str("<![CDATA[");
    xml.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    xml.push_str("]]>");
}

pub fn decode(xml: &str) -> Result<ParameterMap> {
    if xml.trim().is_empty() {
        trace!("🧾️ Empty XML document decoded to an empty map");
        return Ok(ParameterMap::new());
    }
    let mut reader = Reader::from_str(xml);
    reader.check_end_names(true);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        let event = reader.read_event().map_err(|e| parse_error(e, reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(PayError::protocol("Document has more than one root element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(PayError::protocol(format!("Elements are nested more than {MAX_DEPTH} levels deep")));
                }
                stack.push(Element::open(&e)?);
            },
            Event::Empty(e) => {
                let element = Element::open(&e)?;
                close_element(element, &mut stack, &mut root)?;
            },
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| PayError::protocol("Unbalanced closing tag"))?;
                close_element(element, &mut stack, &mut root)?;
            },
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| parse_error(e, reader.buffer_position()))?;
                push_text(&mut stack, &text)?;
            },
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| PayError::protocol(format!("CDATA section is not valid UTF-8. {e}")))?;
                push_text(&mut stack, text)?;
            },
            Event::DocType(_) => {
                debug!("🧾️ Rejecting XML document with a DOCTYPE declaration");
                return Err(PayError::protocol("DOCTYPE declarations are not accepted"));
            },
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) => {},
            Event::Eof => break,
        }
    }
    if let Some(open) = stack.last() {
        return Err(PayError::protocol(format!("Unexpected end of document. <{}> is not closed", open.name)));
    }
    root.ok_or_else(|| PayError::protocol("Document has no root element"))
}

/// Best-effort structural check. Never fails; empty input is not a document.
pub fn is_valid(xml: &str) -> bool {
    !xml.trim().is_empty() && decode(xml).is_ok()
}

fn parse_error<E: std::fmt::Display>(e: E, position: usize) -> PayError {
    PayError::protocol(format!("Malformed XML near byte {position}. {e}"))
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        },
        None if text.trim().is_empty() => Ok(()),
        None => Err(PayError::protocol("Text content found outside the document element")),
    }
}

fn close_element(element: Element, stack: &mut [Element], root: &mut Option<ParameterMap>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.has_children = true;
            let name = element.name.clone();
            push_child(&mut parent.children, name, element.into_value());
        },
        None => {
            if root.is_some() {
                return Err(PayError::protocol("Document has more than one root element"));
            }
            *root = Some(element.into_root_map());
        },
    }
    Ok(())
}

fn push_child(children: &mut ParameterMap, name: String, value: Value) {
    match children.get_mut(&name) {
        None => {
            children.insert(name, value);
        },
        Some(Value::List(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::replace(existing, Value::Null);
            *existing = Value::List(vec![first, value]);
        },
    }
}

//-------------------------------------------     Element      -------------------------------------------------------
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: ParameterMap,
    has_children: bool,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| PayError::protocol(format!("Element name is not valid UTF-8. {e}")))?
            .to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| PayError::protocol(format!("Invalid attribute on <{name}>. {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| PayError::protocol(format!("Attribute name on <{name}> is not valid UTF-8. {e}")))?;
            let value = attr
                .unescape_value()
                .map_err(|e| PayError::protocol(format!("Invalid value for attribute {key} on <{name}>. {e}")))?;
            attributes.push((format!("@{key}"), value.into_owned()));
        }
        Ok(Self { name, attributes, children: ParameterMap::new(), has_children: false, text: String::new() })
    }

    fn into_value(self) -> Value {
        if self.has_children {
            return Value::Map(self.merged_children());
        }
        let text = self.text.trim().to_string();
        if self.attributes.is_empty() {
            Value::Str(text)
        } else {
            let mut map = self.attributes.into_iter().collect::<ParameterMap>();
            map.insert("text", text);
            Value::Map(map)
        }
    }

    fn into_root_map(self) -> ParameterMap {
        let text = self.text.trim().to_string();
        let has_children = self.has_children;
        let mut map = self.merged_children();
        if !has_children && !text.is_empty() {
            map.insert("text", text);
        }
        map
    }

    fn merged_children(self) -> ParameterMap {
        let mut map = self.attributes.into_iter().collect::<ParameterMap>();
        for (key, value) in self.children {
            map.insert(key, value);
        }
        map
    }
}
