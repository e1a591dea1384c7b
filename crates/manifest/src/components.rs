//! SDK component types
//!
//! Record kinds found in repository manifests, the root elements that
//! contain them, and the names shown for each record.

use std::fmt;

use crate::node::{ManifestDocument, Node};

/// Installable component record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Platform,
    Sample,
    PlatformTool,
    BuildTool,
    Tool,
    Doc,
    Source,
    Addon,
    Extra,
    SystemImage,
}

impl ComponentType {
    /// Element name of a record of this type
    pub fn element_name(&self) -> &'static str {
        match self {
            ComponentType::Platform => "sdk:platform",
            ComponentType::Sample => "sdk:sample",
            ComponentType::PlatformTool => "sdk:platform-tool",
            ComponentType::BuildTool => "sdk:build-tool",
            ComponentType::Tool => "sdk:tool",
            ComponentType::Doc => "sdk:doc",
            ComponentType::Source => "sdk:source",
            ComponentType::Addon => "sdk:add-on",
            ComponentType::Extra => "sdk:extra",
            ComponentType::SystemImage => "sdk:system-image",
        }
    }

    /// Type label shown in the extended listing
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Platform => "Platform",
            ComponentType::Sample => "Sample",
            ComponentType::PlatformTool => "PlatformTool",
            ComponentType::BuildTool => "BuildTool",
            ComponentType::Tool => "Tool",
            ComponentType::Doc => "Doc",
            ComponentType::Source => "Source",
            ComponentType::Addon => "Addon",
            ComponentType::Extra => "Extra",
            ComponentType::SystemImage => "SystemImage",
        }
    }

    /// Name shown in the summary listing for `record`
    pub fn display_name(&self, record: &Node) -> String {
        let api_level = record.field("sdk:api-level");
        match self {
            ComponentType::Platform => {
                format!("SDK Platform Android {}", record.field("sdk:version"))
            }
            ComponentType::Sample => format!("Samples for SDK API {}", api_level),
            ComponentType::PlatformTool => "Android SDK Platform-tools".to_string(),
            ComponentType::BuildTool => "Android SDK Build-tools".to_string(),
            ComponentType::Tool => "Android SDK Tools".to_string(),
            ComponentType::Doc => format!("Documentation for Android SDK, API {}", api_level),
            ComponentType::Source => format!("Sources for Android SDK, API {}", api_level),
            ComponentType::Addon => format!(
                "{}, Android API {}",
                record.field("sdk:name-display"),
                api_level
            ),
            ComponentType::Extra => record.field("sdk:name-display").to_string(),
            ComponentType::SystemImage => format!(
                "{}, Android API {}",
                abi_label(record.field("sdk:abi")),
                api_level
            ),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manifest flavours, keyed by root element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Repository,
    Addon,
    SystemImage,
    AddonsList,
}

impl ManifestKind {
    /// Kind named by a root element, if it is one we know
    pub fn from_root_name(name: &str) -> Option<Self> {
        match name {
            "sdk:sdk-repository" => Some(ManifestKind::Repository),
            "sdk:sdk-addon" => Some(ManifestKind::Addon),
            "sdk:sdk-sys-img" => Some(ManifestKind::SystemImage),
            "sdk:sdk-addons-list" => Some(ManifestKind::AddonsList),
            _ => None,
        }
    }

    /// Kind of a parsed document
    pub fn of(document: &ManifestDocument) -> Option<Self> {
        Self::from_root_name(&document.root_name)
    }

    /// Record types listed from this kind of manifest, in listing order
    pub fn component_types(&self) -> &'static [ComponentType] {
        match self {
            ManifestKind::Repository => &[
                ComponentType::Platform,
                ComponentType::Sample,
                ComponentType::PlatformTool,
                ComponentType::BuildTool,
                ComponentType::Tool,
                ComponentType::Doc,
                ComponentType::Source,
            ],
            ManifestKind::Addon => &[ComponentType::Addon, ComponentType::Extra],
            ManifestKind::SystemImage => &[ComponentType::SystemImage],
            ManifestKind::AddonsList => &[],
        }
    }
}

/// Human-readable name of a system image ABI; unknown codes are returned as-is
pub fn abi_label(abi: &str) -> &str {
    match abi {
        "armeabi-v7a" => "ARM EABI v7a System Image",
        "arm64-v8a" => "ARM 64 v8a System Image",
        "x86" => "Intel x86 Atom System Image",
        "x86_64" => "Intel x86 Atom_64 System Image",
        "mips" => "MIPS System Image",
        other => other,
    }
}
