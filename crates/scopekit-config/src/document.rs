//! Configuration documents
//!
//! A [`ConfigDocument`] pairs a root [`ConfigNode`] with the [`ConfigOptions`]
//! option bag used to resolve directories.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::node::ConfigNode;
use crate::path::ConfigPath;
use crate::xml;

/// Name of the root element of every document
pub const ROOT_NODE_NAME: &str = "config";

/// Option bag of a configuration document
///
/// Directories default to locations under `base_dir`; each can be
/// overridden individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOptions {
    /// Installation root
    pub base_dir: PathBuf,
    /// Application directory
    pub app_dir: PathBuf,
    /// Directory holding `config.xml`, `local.xml` and override files
    pub etc_dir: PathBuf,
    /// Runtime data directory
    pub var_dir: PathBuf,
    /// Cache storage directory
    pub cache_dir: PathBuf,
    /// Session storage directory
    pub session_dir: PathBuf,
    /// Free-form options
    #[serde(default)]
    pub data: IndexMap<String, String>,
}

impl ConfigOptions {
    /// Create options with the standard layout under `base_dir`
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let app_dir = base_dir.join("app");
        let etc_dir = app_dir.join("etc");
        let var_dir = base_dir.join("var");
        Self {
            cache_dir: var_dir.join("cache"),
            session_dir: var_dir.join("session"),
            base_dir,
            app_dir,
            etc_dir,
            var_dir,
            data: IndexMap::new(),
        }
    }

    /// With configuration directory
    #[inline]
    #[must_use]
    pub fn with_etc_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.etc_dir = dir.into();
        self
    }

    /// With runtime directory
    ///
    /// Cache and session directories move along with it.
    #[inline]
    #[must_use]
    pub fn with_var_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.var_dir = dir.into();
        self.cache_dir = self.var_dir.join("cache");
        self.session_dir = self.var_dir.join("session");
        self
    }

    /// Free-form option by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Set free-form option
    #[inline]
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Configuration document: root node plus option bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    root: ConfigNode,
    options: ConfigOptions,
}

impl ConfigDocument {
    /// Create document with an empty `<config/>` root
    #[inline]
    #[must_use]
    pub fn new(options: ConfigOptions) -> Self {
        Self {
            root: ConfigNode::new(ROOT_NODE_NAME),
            options,
        }
    }

    /// Create document from an existing root
    #[inline]
    #[must_use]
    pub fn from_root(root: ConfigNode, options: ConfigOptions) -> Self {
        Self { root, options }
    }

    /// Parse a document from markup
    ///
    /// # Errors
    /// Returns error if the markup is malformed
    pub fn parse(xml: &str, options: ConfigOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_root(xml::parse_str(xml)?, options))
    }

    /// Read a document from a file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is malformed
    pub fn from_file(path: &Path, options: ConfigOptions) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, options)
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Mutable root node
    #[inline]
    pub fn root_mut(&mut self) -> &mut ConfigNode {
        &mut self.root
    }

    /// Option bag
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Mutable option bag
    #[inline]
    pub fn options_mut(&mut self) -> &mut ConfigOptions {
        &mut self.options
    }

    /// Node at `path`, relative to the root
    #[inline]
    #[must_use]
    pub fn node(&self, path: &ConfigPath) -> Option<&ConfigNode> {
        self.root.descend(path)
    }

    /// Text at `path`, empty when the node is absent
    #[inline]
    #[must_use]
    pub fn text(&self, path: &ConfigPath) -> &str {
        self.node(path).map_or("", ConfigNode::text)
    }

    /// Set value at `path`, creating intermediate nodes
    #[inline]
    pub fn set_node(&mut self, path: &ConfigPath, value: impl Into<String>) {
        self.root.set_node(path, value);
    }

    /// Merge another document in; its leaf values win
    #[inline]
    pub fn extend(&mut self, other: &ConfigDocument) -> &mut Self {
        self.extend_node(other.root(), true)
    }

    /// Merge a root node in with explicit leaf precedence
    #[inline]
    pub fn extend_node(&mut self, source: &ConfigNode, overwrite: bool) -> &mut Self {
        self.root.extend(source, overwrite);
        self
    }

    /// Merge a file in when it exists
    ///
    /// Returns whether the file was present.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    pub fn merge_file_if_exists(&mut self, path: &Path) -> Result<bool, ConfigError> {
        if !path.is_file() {
            return Ok(false);
        }
        let other = Self::from_file(path, self.options.clone())?;
        self.extend(&other);
        Ok(true)
    }

    /// Serialize root as XML
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn to_xml_string(&self) -> Result<String, ConfigError> {
        xml::to_string(&self.root)
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new(ConfigOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn path(s: &str) -> ConfigPath {
        s.parse().unwrap()
    }

    #[test]
    fn options_standard_layout() {
        let options = ConfigOptions::new("/srv/shop");
        assert_eq!(options.etc_dir, PathBuf::from("/srv/shop/app/etc"));
        assert_eq!(options.var_dir, PathBuf::from("/srv/shop/var"));
        assert_eq!(options.cache_dir, PathBuf::from("/srv/shop/var/cache"));

        let moved = options.with_var_dir("/tmp/var");
        assert_eq!(moved.session_dir, PathBuf::from("/tmp/var/session"));
    }

    #[test]
    fn options_free_form_data() {
        let mut options = ConfigOptions::default();
        options.set("cache_dir_mode", "0777");
        assert_eq!(options.get("cache_dir_mode"), Some("0777"));
        assert_eq!(options.get("missing"), None);
    }

    #[test]
    fn document_text_and_set_node() {
        let mut doc = ConfigDocument::default();
        assert_eq!(doc.text(&path("global/cache/backend")), "");

        doc.set_node(&path("global/cache/backend"), "file");
        assert_eq!(doc.text(&path("global/cache/backend")), "file");
    }

    #[test]
    fn document_extend_override_wins() {
        let mut live = ConfigDocument::parse(
            "<config><global><cache><backend>database</backend></cache></global></config>",
            ConfigOptions::default(),
        )
        .unwrap();
        let test = ConfigDocument::parse(
            "<config><global><cache><backend>file</backend><prefix>t_</prefix></cache></global></config>",
            ConfigOptions::default(),
        )
        .unwrap();
        live.extend(&test);

        assert_eq!(live.text(&path("global/cache/backend")), "file");
        assert_eq!(live.text(&path("global/cache/prefix")), "t_");
    }

    #[test]
    fn merge_file_if_exists_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.xml");
        let mut doc = ConfigDocument::default();

        assert!(!doc.merge_file_if_exists(&file).unwrap());

        let mut handle = fs::File::create(&file).unwrap();
        writeln!(handle, "<config><default><locale>de_DE</locale></default></config>").unwrap();
        assert!(doc.merge_file_if_exists(&file).unwrap());
        assert_eq!(doc.text(&path("default/locale")), "de_DE");
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigDocument::from_file(&dir.path().join("nope.xml"), ConfigOptions::default())
            .unwrap_err();
        assert!(err.is_io());
    }
}
