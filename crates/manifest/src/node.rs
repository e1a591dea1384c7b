//! Generic manifest tree
//!
//! Repository manifests are read into a loosely-typed element tree instead
//! of per-schema structs: the schema versions published over the years add
//! and drop fields freely, and the listing only ever needs a handful of
//! them. Lookups go through accessors that treat a missing element as an
//! empty value.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    attributes: IndexMap<String, String>,
    text: Option<String>,
    children: IndexMap<String, Vec<Node>>,
}

impl Node {
    /// Create an empty element
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text-only element
    pub fn scalar(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Append character data to this element's text
    pub fn push_text(&mut self, text: &str) {
        match self.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Append a child element under `name`, after any existing siblings
    pub fn push_child(&mut self, name: impl Into<String>, child: Node) {
        self.children.entry(name.into()).or_default().push(child);
    }

    /// An element with neither attributes nor child elements
    pub fn is_scalar(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Text content, or empty when the element has none
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Value of attribute `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes, in document order
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// First child element named `name`
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name).and_then(|nodes| nodes.first())
    }

    /// All child elements named `name`, in document order
    pub fn children(&self, name: &str) -> &[Node] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether at least one child element is named `name`
    pub fn has_child(&self, name: &str) -> bool {
        !self.children(name).is_empty()
    }

    /// Child tag names, in order of first appearance
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Text of the first child named `name`, empty when absent
    pub fn field(&self, name: &str) -> &str {
        self.child(name).map(Node::text).unwrap_or("")
    }

    /// Walk a path of first children
    pub fn find(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Text at the end of a path of first children, empty when any step is missing
    pub fn field_at(&self, path: &[&str]) -> &str {
        self.find(path).map(Node::text).unwrap_or("")
    }

    /// All elements named by the last step of `path`, below the first
    /// children named by the preceding steps
    pub fn find_all(&self, path: &[&str]) -> &[Node] {
        match path.split_last() {
            Some((last, parents)) => self
                .find(parents)
                .map(|parent| parent.children(last))
                .unwrap_or(&[]),
            None => &[],
        }
    }
}

/// Scalars serialize as plain strings. Other elements become a map with
/// attributes under `"$"`, text under `"_"` and one array per child tag.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_scalar() {
            return serializer.serialize_str(self.text());
        }

        let len = self.children.len()
            + usize::from(!self.attributes.is_empty())
            + usize::from(self.text.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.attributes.is_empty() {
            map.serialize_entry("$", &self.attributes)?;
        }
        if let Some(text) = &self.text {
            map.serialize_entry("_", text)?;
        }
        for (name, nodes) in &self.children {
            map.serialize_entry(name, nodes)?;
        }
        map.end()
    }
}

/// A parsed manifest: the root element and its tag name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    pub root_name: String,
    pub root: Node,
}

impl ManifestDocument {
    /// Wrap a root element
    pub fn new(root_name: impl Into<String>, root: Node) -> Self {
        Self {
            root_name: root_name.into(),
            root,
        }
    }

    /// Pretty-printed JSON form used for exports
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ManifestDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.root_name, &self.root)?;
        map.end()
    }
}
