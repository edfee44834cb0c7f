// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Flattening of piwik's `format=xml` responses into a single field map.

use std::collections::HashMap;

use quick_xml::{
    Reader,
    escape,
    events::{BytesStart, Event},
};

use crate::{Error, Result};

const ERROR_MARKER: &str = "error message=";

/// A flattened response: one logical record of `field -> text`.
///
/// Wrapper elements such as `<row>` are transparent, so the fields of a
/// single-row answer appear at the top level. A field that repeats keeps its
/// first value. Attributes are kept apart and looked up by element name.
///
/// No coercion happens here; missing fields are simply `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    value: Option<String>,
    fields: HashMap<String, String>,
    attributes: HashMap<String, String>,
}

impl Record {
    /// Text of the root element when the whole answer is a scalar,
    /// e.g. `<result>5</result>`.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Returns true if the field appeared, even as an empty element.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn attribute(&self, element: &str, name: &str) -> Option<&str> {
        self.attributes
            .get(&attribute_key(element, name))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.fields.is_empty() && self.attributes.is_empty()
    }

    fn insert_field(&mut self, name: String, text: String) {
        self.fields.entry(name).or_insert(text);
    }

    fn collect_attributes(&mut self, element: &str, start: &BytesStart) -> Result<()> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::xml_parse(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            let raw = String::from_utf8_lossy(&attr.value);
            let value = escape::unescape(&raw)
                .map_err(|e| Error::xml_parse(format!("bad attribute value: {e}")))?;
            self.attributes
                .entry(attribute_key(element, &key))
                .or_insert_with(|| value.into_owned());
        }
        Ok(())
    }
}

fn attribute_key(element: &str, name: &str) -> String {
    format!("{element}@{name}")
}

/// An element still open while reading.
struct OpenElement {
    name: String,
    text: String,
    has_children: bool,
}

/// Flattens a response document into a [`Record`].
pub fn flatten(xml: &str) -> Result<Record> {
    let mut reader = Reader::from_str(xml);
    let mut record = Record::default();
    let mut stack: Vec<OpenElement> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                record.collect_attributes(&name, &e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                }
                stack.push(OpenElement {
                    name,
                    text: String::new(),
                    has_children: false,
                });
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                record.collect_attributes(&name, &e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                    record.insert_field(name, String::new());
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.text
                        .push_str(&resolve_reference(&String::from_utf8_lossy(&e))?);
                }
            }
            Ok(Event::End(_)) => {
                let Some(open) = stack.pop() else {
                    continue;
                };
                if open.has_children {
                    continue;
                }
                let text = open.text.trim().to_string();
                if stack.is_empty() {
                    record.value = Some(text);
                } else {
                    record.insert_field(open.name, text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::xml_parse(format!(
                    "at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(record)
}

/// Extracts the message of an `<error message="...">` payload, if the body has one.
pub(crate) fn error_message(xml: &str) -> Result<Option<String>> {
    if !xml.contains(ERROR_MARKER) {
        return Ok(None);
    }

    let record = flatten(xml)?;
    Ok(record.attribute("error", "message").map(str::to_string))
}

fn element_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return parsed
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::xml_parse(format!("invalid character reference &{name};")));
    }

    escape::resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::xml_parse(format!("unknown entity &{name};")))
}
