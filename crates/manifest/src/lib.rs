//! Android SDK repository manifests
//!
//! Parsing of repository manifests into a generic element tree, and
//! rendering of the component records they list.

pub mod node;
pub mod parser;
pub mod revision;
pub mod components;
pub mod formatter;

pub use node::{ManifestDocument, Node};
pub use parser::{ManifestParser, ParseError};
pub use revision::{revision_string, Revision};
pub use components::{abi_label, ComponentType, ManifestKind};
pub use formatter::{format_size, ComponentRecord, FormatError, RecordFormatter};
