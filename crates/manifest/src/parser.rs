//! Repository manifest parser
//!
//! Reads an XML document into a [`ManifestDocument`] tree, keeping every
//! element, attribute and text run with its qualified name.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::node::{ManifestDocument, Node};

/// Parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),
    #[error("Invalid manifest structure: {0}")]
    InvalidStructure(String),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl From<ParseError> for sdk_client_core::SdkClientError {
    fn from(err: ParseError) -> Self {
        sdk_client_core::SdkClientError::XmlParse(err.to_string())
    }
}

/// Manifest parser
pub struct ManifestParser;

impl ManifestParser {
    /// Parse a manifest from a raw response body
    pub fn parse_bytes(body: &[u8]) -> Result<ManifestDocument, ParseError> {
        let xml = std::str::from_utf8(body)?;
        Self::parse_string(xml)
    }

    /// Parse a manifest from a string
    pub fn parse_string(xml: &str) -> Result<ManifestDocument, ParseError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        // Open elements, innermost last
        let mut stack: Vec<(String, Node)> = Vec::new();
        let mut document: Option<ManifestDocument> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    let element = Self::open_element(e)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let (name, node) = Self::open_element(e)?;
                    Self::close_element(&mut stack, &mut document, name, node)?;
                }
                Event::End(_) => {
                    let (name, node) = stack.pop().ok_or_else(|| {
                        ParseError::InvalidStructure("closing tag without opening tag".into())
                    })?;
                    Self::close_element(&mut stack, &mut document, name, node)?;
                }
                Event::Text(ref t) => {
                    if let Some((_, node)) = stack.last_mut() {
                        node.push_text(&t.unescape()?);
                    }
                }
                Event::CData(t) => {
                    if let Some((_, node)) = stack.last_mut() {
                        let raw = t.into_inner();
                        node.push_text(std::str::from_utf8(&raw)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((name, _)) = stack.last() {
            return Err(ParseError::InvalidStructure(format!("unclosed element <{}>", name)));
        }

        let document = document
            .ok_or_else(|| ParseError::InvalidStructure("document has no root element".into()))?;
        debug!("Parsed manifest with root <{}>", document.root_name);
        Ok(document)
    }

    /// Name and attributes of an element start tag
    fn open_element(e: &BytesStart) -> Result<(String, Node), ParseError> {
        let name = std::str::from_utf8(e.name().as_ref())?.to_string();
        let mut node = Node::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?;
            node.set_attribute(key, value);
        }
        Ok((name, node))
    }

    /// Attach a finished element to its parent, or make it the root
    fn close_element(
        stack: &mut [(String, Node)],
        document: &mut Option<ManifestDocument>,
        name: String,
        node: Node,
    ) -> Result<(), ParseError> {
        match stack.last_mut() {
            Some((_, parent)) => parent.push_child(name, node),
            None if document.is_none() => *document = Some(ManifestDocument::new(name, node)),
            None => {
                return Err(ParseError::InvalidStructure(format!(
                    "second root element <{}>",
                    name
                )))
            }
        }
        Ok(())
    }
}
