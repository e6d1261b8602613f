//! Configuration paths
//!
//! Provides [`ConfigPath`] for addressing nodes inside a configuration tree.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ConfigError;

/// Path from a node to one of its descendants
///
/// Segments are node names; the textual form joins them with `/`.
///
/// # Examples
/// - `["global", "cache", "backend"]` → `global/cache/backend`
/// - `["default", "web", "secure"]` → `default/web/secure`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Empty path (the node itself)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for ConfigPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for ConfigPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = trimmed
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    Err(ConfigError::InvalidPath {
                        path: s.to_string(),
                        reason: "empty segment".to_string(),
                    })
                } else if !is_valid_name(seg) {
                    Err(ConfigError::InvalidPath {
                        path: s.to_string(),
                        reason: format!("invalid segment '{seg}'"),
                    })
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl Default for ConfigPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Whether `name` can be used as a node name
///
/// Accepts the subset of XML names used by configuration files: letters,
/// digits, `_`, `-` and `.`, not starting with a digit, `-` or `.`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
