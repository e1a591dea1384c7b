//! Component revisions
//!
//! Older manifests carry a bare number (`<sdk:revision>3</sdk:revision>`);
//! newer ones split it into `sdk:major`, `sdk:minor`, `sdk:micro` and
//! `sdk:preview` children.

use std::fmt;

use crate::node::Node;

/// A parsed revision element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// Single number; `None` when the text is not numeric
    Legacy(Option<i64>),
    Structured {
        major: i64,
        minor: i64,
        micro: i64,
        preview: i64,
    },
}

impl Revision {
    /// Read a revision element. Missing or non-numeric parts count as zero.
    pub fn from_node(node: &Node) -> Self {
        if node.is_scalar() {
            return Revision::Legacy(parse_int(node.text()));
        }

        let part = |name: &str| parse_int(node.field(name)).unwrap_or(0);
        Revision::Structured {
            major: part("sdk:major"),
            minor: part("sdk:minor"),
            micro: part("sdk:micro"),
            preview: part("sdk:preview"),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Revision::Legacy(Some(value)) => write!(f, "{}", value),
            Revision::Legacy(None) => Ok(()),
            Revision::Structured {
                major,
                minor,
                micro,
                preview,
            } => {
                // No major means no displayable revision at all
                if major == 0 {
                    return Ok(());
                }
                write!(f, "{}", major)?;
                if minor != 0 || micro != 0 {
                    write!(f, ".{}", minor)?;
                }
                if micro != 0 {
                    write!(f, ".{}", micro)?;
                }
                if preview != 0 {
                    write!(f, " rc{}", preview)?;
                }
                Ok(())
            }
        }
    }
}

/// Display string for an optional `sdk:revision` element
pub fn revision_string(node: Option<&Node>) -> String {
    node.map(|n| Revision::from_node(n).to_string())
        .unwrap_or_default()
}

/// Leading integer of `text`: optional whitespace and sign, then decimal
/// digits. Anything after the digits is ignored.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}
