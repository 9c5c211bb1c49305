//! Streaming event source over `quick-xml`.
//!
//! The mapper only sees start / end / character events in document order,
//! delivered through [`EventHandler`]. Namespace prefixes are stripped from
//! element and attribute names.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smol_str::SmolStr;

use crate::error::{MappingError, Result};

/// The attributes of one start element, keyed by local name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(SmolStr, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute; later duplicates of a name are ignored on lookup.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.entries.push((SmolStr::new(name), value.into()));
    }

    /// Value of the attribute with local name `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.push(name, value);
        }
        attrs
    }
}

/// Receiver of SAX-style parser events.
pub trait EventHandler {
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()>;
    fn end_element(&mut self, name: &str) -> Result<()>;
    fn characters(&mut self, text: &str) -> Result<()>;
}

/// Read `input` to the end, feeding every event to `handler`.
pub fn drive<R: BufRead, H: EventHandler>(input: R, handler: &mut H) -> Result<()> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| MappingError::Xml { position, source })?;

        match event {
            Event::Start(e) => {
                let (name, attrs) = start_parts(&e, position)?;
                handler.start_element(&name, &attrs)?;
            }
            Event::Empty(e) => {
                let (name, attrs) = start_parts(&e, position)?;
                handler.start_element(&name, &attrs)?;
                handler.end_element(&name)?;
            }
            Event::End(e) => {
                let name = decode_name(e.local_name().as_ref());
                handler.end_element(&name)?;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|source| MappingError::Xml { position, source })?;
                handler.characters(&text)?;
            }
            Event::CData(t) => {
                handler.characters(&String::from_utf8_lossy(&t))?;
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctypes
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn start_parts(e: &BytesStart<'_>, position: u64) -> Result<(SmolStr, Attributes)> {
    let name = decode_name(e.local_name().as_ref());
    let mut attrs = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|source| MappingError::Attribute { position, source })?;
        let key = decode_name(attr.key.local_name().as_ref());
        let value = attr
            .unescape_value()
            .map_err(|source| MappingError::Xml { position, source })?;
        attrs.push(&key, value.into_owned());
    }
    Ok((name, attrs))
}

fn decode_name(bytes: &[u8]) -> SmolStr {
    SmolStr::new(String::from_utf8_lossy(bytes))
}
