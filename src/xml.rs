//! Minimal element tree for `.aqua` documents.

use crate::error::SceneError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Write};
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Attributes keep insertion order; setting an existing key replaces its value in place.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Numeric attribute; absent, unparseable or non-finite values read as 0.
    pub fn number(&self, key: &str) -> f64 {
        let Some(raw) = self.attribute(key) else {
            return 0.0;
        };
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(attribute = key, value = raw, "unreadable number, using 0");
                0.0
            }
        }
    }

    /// Appends a child and returns it for further attributes.
    pub fn add_child(&mut self, child: XmlElement) -> &mut XmlElement {
        let i = self.children.len();
        self.children.push(child);
        &mut self.children[i]
    }
}

/// Fixed six-digit decimal used for every coordinate and speed.
pub fn format_number(v: f64) -> String {
    format!("{v:.6}")
}

/// Serializes `root` behind an XML declaration, without indentation.
pub fn to_xml_string(root: &XmlElement) -> Result<String, SceneError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::new("\n")))?;
    write_element(&mut writer, root)?;
    writer.write_event(Event::Text(BytesText::new("\n")))?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_element<W: Write>(writer: &mut Writer<W>, el: &XmlElement) -> Result<(), SceneError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in &el.attributes {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

/// Parses a whole document and returns its root element.
pub fn parse(text: &str) -> Result<XmlElement, SceneError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(structure("more than one root element"));
                }
                stack.push(element_from(&e)?);
            }
            Event::Empty(e) => {
                let el = element_from(&e)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| structure("closing tag without an opening tag"))?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(_) | Event::CData(_) if stack.is_empty() => {
                return Err(structure("text outside the root element"));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(structure(&format!("element <{}> is never closed", open.name)));
    }
    root.ok_or_else(|| structure("document has no root element"))
}

fn structure(msg: &str) -> SceneError {
    SceneError::Structure(msg.to_string())
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), SceneError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(el);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        None => Err(structure("more than one root element")),
    }
}

fn element_from(start: &BytesStart) -> Result<XmlElement, SceneError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut el = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}
