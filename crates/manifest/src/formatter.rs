//! Record Formatter
//!
//! Turns one component record into listing output: a single summary line,
//! or a detailed block with every downloadable archive when the extended
//! listing is enabled.

use sdk_client_core::DisplayOptions;
use tracing::error;
use url::Url;

use crate::components::{abi_label, ComponentType};
use crate::node::Node;
use crate::revision::{parse_int, revision_string};

/// Indentation of continuation lines in the extended listing
const DETAIL_INDENT: &str = "          ";

const SEPARATOR: &str = "------------";

/// Rendering errors for a single record
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid archive size {0:?}")]
    InvalidSize(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Display fields derived from a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub component_type: ComponentType,
    pub description: String,
    pub extra: Option<String>,
    pub install_path: Option<String>,
    pub requires: Option<String>,
    pub version: String,
    pub api_level: String,
    pub revision: String,
    pub vendor: String,
    pub obsolete: bool,
}

impl ComponentRecord {
    /// Derive the display fields of `record`
    pub fn from_node(record: &Node, component_type: ComponentType, display_name: &str) -> Self {
        let obsolete = record.has_child("sdk:obsolete");
        let version = record.field("sdk:version").to_string();
        let api_level = record.field("sdk:api-level").to_string();
        let revision = revision_string(record.child("sdk:revision"));
        let name_display = record.field("sdk:name-display");

        let declared = record
            .child("sdk:description")
            .map(|d| d.text().trim().to_string());
        let fallback = match component_type {
            ComponentType::Sample => {
                format!("Samples for SDK API {}, revision {}", api_level, revision)
            }
            ComponentType::PlatformTool => {
                format!("Android SDK Platform-tools, revision {}", revision)
            }
            ComponentType::BuildTool => format!("Android SDK Build-tools, revision {}", revision),
            ComponentType::Tool => format!("Android SDK Tools, revision {}", revision),
            ComponentType::Doc => format!(
                "Documentation for Android SDK, API {}, revision {}",
                api_level, revision
            ),
            ComponentType::Source => format!(
                "Sources for Android SDK, API {}, revision {}",
                api_level, revision
            ),
            ComponentType::Platform
            | ComponentType::SystemImage
            | ComponentType::Addon
            | ComponentType::Extra => format!("{}, revision {}", display_name, revision),
        };

        let mut extra = None;
        let mut install_path = None;
        let mut requires = None;
        let description = match component_type {
            ComponentType::Addon => {
                extra = declared;
                requires = Some(format!("Requires SDK Platform Android API {}", api_level));
                format!(
                    "{}, Android API {}, revision {}",
                    name_display, api_level, revision
                )
            }
            ComponentType::Extra => {
                extra = declared;
                install_path = Some(format!(
                    "Install path: extras/android/{}",
                    record.field("sdk:path")
                ));
                format!("{}, revision {}", name_display, revision)
            }
            ComponentType::SystemImage => {
                extra = Some(abi_label(record.field("sdk:abi")).to_string());
                requires = Some(format!("Requires SDK Platform Android API {}", api_level));
                declared.unwrap_or(fallback)
            }
            _ => declared.unwrap_or(fallback),
        };

        Self {
            component_type,
            description,
            extra,
            install_path,
            requires,
            version,
            api_level,
            revision,
            vendor: record.field("sdk:vendor-display").to_string(),
            obsolete,
        }
    }

    pub fn obsolete_suffix(&self) -> &'static str {
        if self.obsolete {
            " (Obsolete)"
        } else {
            ""
        }
    }
}

/// Record formatter bound to one run's display options
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFormatter {
    options: DisplayOptions,
}

impl RecordFormatter {
    pub fn new(options: DisplayOptions) -> Self {
        Self { options }
    }

    /// Render `record`, or `None` when it is filtered out or cannot be
    /// rendered. Rendering failures are logged and never propagated.
    pub fn format(
        &self,
        record: &Node,
        base_url: &str,
        component_type: ComponentType,
        display_name: &str,
    ) -> Option<String> {
        match self.try_format(record, base_url, component_type, display_name) {
            Ok(output) => output,
            Err(e) => {
                error!(
                    "Failed to render {} record \"{}\" from {}: {}",
                    component_type, display_name, base_url, e
                );
                None
            }
        }
    }

    fn try_format(
        &self,
        record: &Node,
        base_url: &str,
        component_type: ComponentType,
        display_name: &str,
    ) -> Result<Option<String>, FormatError> {
        let details = ComponentRecord::from_node(record, component_type, display_name);
        if details.obsolete && !self.options.show_obsolete {
            return Ok(None);
        }

        if !self.options.extended {
            return Ok(Some(format!(
                " - {}, revision {}{}",
                display_name,
                details.revision,
                details.obsolete_suffix()
            )));
        }

        let mut lines = vec![
            SEPARATOR.to_string(),
            format!("    Type: {}", details.component_type),
            format!("    Desc: {}{}", details.description, details.obsolete_suffix()),
        ];
        if !details.version.is_empty() {
            lines.push(format!("{}Version {}", DETAIL_INDENT, details.version));
        }
        if !details.api_level.is_empty() {
            lines.push(format!("{}API {}", DETAIL_INDENT, details.api_level));
        }
        if !details.revision.is_empty() {
            lines.push(format!("{}Revision {}", DETAIL_INDENT, details.revision));
        }
        if !details.vendor.is_empty() {
            lines.push(format!("{}by {}", DETAIL_INDENT, details.vendor));
        }
        for line in [&details.extra, &details.install_path, &details.requires]
            .into_iter()
            .flatten()
        {
            if !line.is_empty() {
                lines.push(format!("{}{}", DETAIL_INDENT, line));
            }
        }

        let archives = record
            .child("sdk:archives")
            .ok_or(FormatError::MissingField("sdk:archives"))?;
        let base = Url::parse(base_url)?;
        for archive in archives.children("sdk:archive") {
            lines.extend(format_archive(archive, &base)?);
        }

        Ok(Some(lines.join("\n")))
    }
}

/// Three lines describing one downloadable archive
fn format_archive(archive: &Node, base: &Url) -> Result<[String; 3], FormatError> {
    let host_os = archive
        .child("sdk:host-os")
        .map(Node::text)
        .unwrap_or("download");
    let location = archive
        .child("sdk:url")
        .ok_or(FormatError::MissingField("sdk:url"))?;
    let download_url = base.join(location.text().trim())?;

    let size_text = archive
        .child("sdk:size")
        .ok_or(FormatError::MissingField("sdk:size"))?
        .text();
    let size = parse_int(size_text)
        .and_then(|s| u64::try_from(s).ok())
        .ok_or_else(|| FormatError::InvalidSize(size_text.to_string()))?;

    let checksum = archive
        .child("sdk:checksum")
        .ok_or(FormatError::MissingField("sdk:checksum"))?;

    Ok([
        format!("{:>8}: {}", host_os, download_url),
        format!("{}size: {}", DETAIL_INDENT, format_size(size)),
        format!(
            "{}{}: {}",
            DETAIL_INDENT,
            checksum.attribute("type").unwrap_or(""),
            checksum.text()
        ),
    ])
}

/// Format a byte count as a human-readable size, with thousands grouped
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];
    const KILO: f64 = 1024.0;

    let size = bytes as f64;
    let unit = (0..UNITS.len())
        .find(|&i| size < KILO.powi(i as i32 + 1))
        .unwrap_or(UNITS.len() - 1);
    // Whole bytes, two decimals for every larger unit
    let decimals = if unit == 0 { 0 } else { 2 };
    let scaled = format!("{:.*}", decimals, size / KILO.powi(unit as i32));

    format!("{} {}", group_thousands(&scaled), UNITS[unit])
}

fn group_thousands(number: &str) -> String {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (number, None),
    };

    let mut grouped = String::with_capacity(number.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
