//! Configuration tree nodes
//!
//! Provides [`ConfigNode`], a named element with an optional scalar value,
//! ordered attributes and ordered, name-keyed children.

use indexmap::IndexMap;

use crate::path::ConfigPath;

/// Node of a configuration tree
///
/// Children are unique by name within one parent and keep insertion order.
/// Equality is structural: name, value, attributes and children by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    value: Option<String>,
    attributes: IndexMap<String, String>,
    children: IndexMap<String, ConfigNode>,
}

impl ConfigNode {
    /// Create empty node
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            attributes: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    /// Create leaf node carrying a value
    #[inline]
    #[must_use]
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name).with_value(value)
    }

    /// Set value (builder)
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set attribute (builder)
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add child (builder)
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: ConfigNode) -> Self {
        self.add_child(child);
        self
    }

    /// Node name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar value, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Scalar value, empty when absent
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// Replace scalar value
    #[inline]
    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Attribute by key
    #[inline]
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Iterate attributes in document order
    #[inline]
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set attribute
    #[inline]
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Whether the node has child nodes
    #[inline]
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct children
    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Iterate direct children in order
    #[inline]
    pub fn children(&self) -> impl Iterator<Item = &ConfigNode> {
        self.children.values()
    }

    /// Names of direct children in order
    #[inline]
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Direct child by name
    #[inline]
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.get(name)
    }

    /// Add a child
    ///
    /// An existing child with the same name is replaced in place.
    pub fn add_child(&mut self, child: ConfigNode) -> &mut ConfigNode {
        let entry = self.children.entry(child.name.clone());
        match entry {
            indexmap::map::Entry::Occupied(mut occupied) => {
                occupied.insert(child);
                occupied.into_mut()
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(child),
        }
    }

    /// Get child by name, creating an empty one when missing
    pub fn ensure_child(&mut self, name: &str) -> &mut ConfigNode {
        self.children
            .entry(name.to_string())
            .or_insert_with(|| ConfigNode::new(name))
    }

    /// Remove child by name, keeping the order of the remaining children
    #[inline]
    pub fn remove_child(&mut self, name: &str) -> Option<ConfigNode> {
        self.children.shift_remove(name)
    }

    /// Find descendant by path
    #[must_use]
    pub fn descend(&self, path: &ConfigPath) -> Option<&ConfigNode> {
        path.iter()
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    /// Set the value at `path`, creating intermediate nodes
    ///
    /// The addressed node becomes a leaf: existing children are dropped.
    pub fn set_node(&mut self, path: &ConfigPath, value: impl Into<String>) -> &mut ConfigNode {
        let mut node = self;
        for segment in path.iter() {
            node = node.ensure_child(segment);
        }
        node.children.clear();
        node.value = Some(value.into());
        node
    }

    /// Deep-merge the children of `source` into this node
    ///
    /// # Rules
    /// - A leaf in `source` is copied when this node lacks the name. When
    ///   the existing node has children it is kept; otherwise it is replaced
    ///   only if `overwrite` is set.
    /// - A non-leaf in `source` is merged recursively by name, creating the
    ///   target (with the source attributes) when missing.
    pub fn extend(&mut self, source: &ConfigNode, overwrite: bool) -> &mut Self {
        for child in source.children.values() {
            self.extend_child(child, overwrite);
        }
        self
    }

    /// Merge a single `source` node into the child of the same name
    pub fn extend_child(&mut self, source: &ConfigNode, overwrite: bool) -> &mut Self {
        if !source.has_children() {
            if let Some(existing) = self.children.get_mut(&source.name) {
                if existing.has_children() || !overwrite {
                    return self;
                }
                *existing = source.clone();
            } else {
                self.children.insert(source.name.clone(), source.clone());
            }
            return self;
        }

        let target = self
            .children
            .entry(source.name.clone())
            .or_insert_with(|| ConfigNode {
                name: source.name.clone(),
                value: None,
                attributes: source.attributes.clone(),
                children: IndexMap::new(),
            });
        for grandchild in source.children.values() {
            target.extend_child(grandchild, overwrite);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(s: &str) -> ConfigPath {
        s.parse().unwrap()
    }

    #[test]
    fn node_builders() {
        let node = ConfigNode::new("connection")
            .with_attribute("type", "pdo")
            .with_child(ConfigNode::leaf("host", "localhost"))
            .with_child(ConfigNode::leaf("dbname", "live"));

        assert_eq!(node.name(), "connection");
        assert_eq!(node.attribute("type"), Some("pdo"));
        assert_eq!(node.child_count(), 2);
        assert_eq!(node.child("dbname").map(ConfigNode::text), Some("live"));
        assert_eq!(node.child_names().collect::<Vec<_>>(), vec!["host", "dbname"]);
    }

    #[test]
    fn add_child_replaces_in_place() {
        let mut node = ConfigNode::new("root")
            .with_child(ConfigNode::leaf("a", "1"))
            .with_child(ConfigNode::leaf("b", "2"));
        node.add_child(ConfigNode::leaf("a", "3"));

        assert_eq!(node.child_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(node.child("a").unwrap().text(), "3");
    }

    #[test]
    fn remove_child_keeps_order() {
        let mut node = ConfigNode::new("root")
            .with_child(ConfigNode::new("a"))
            .with_child(ConfigNode::new("b"))
            .with_child(ConfigNode::new("c"));
        let removed = node.remove_child("b");

        assert!(removed.is_some());
        assert!(node.remove_child("missing").is_none());
        assert_eq!(node.child_names().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn descend_and_set_node() {
        let mut root = ConfigNode::new("config");
        root.set_node(&path("global/cache/backend"), "file");

        assert_eq!(
            root.descend(&path("global/cache/backend")).map(ConfigNode::text),
            Some("file")
        );
        assert!(root.descend(&path("global/session")).is_none());
        assert_eq!(root.descend(&ConfigPath::root()), Some(&root));
    }

    #[test]
    fn set_node_turns_branch_into_leaf() {
        let mut root = ConfigNode::new("config");
        root.set_node(&path("global/cache/backend/options"), "x");
        root.set_node(&path("global/cache/backend"), "file");

        let backend = root.descend(&path("global/cache/backend")).unwrap();
        assert!(!backend.has_children());
        assert_eq!(backend.text(), "file");
    }

    #[test]
    fn extend_adds_missing_subtrees() {
        let mut target = ConfigNode::new("config");
        let source = ConfigNode::new("config").with_child(
            ConfigNode::new("default")
                .with_attribute("scope", "global")
                .with_child(ConfigNode::leaf("locale", "en_US")),
        );
        target.extend(&source, true);

        assert_eq!(target, source);
    }

    #[test]
    fn extend_overwrites_leaves_only_when_requested() {
        let base = ConfigNode::new("config").with_child(ConfigNode::leaf("backend", "database"));
        let source = ConfigNode::new("config").with_child(ConfigNode::leaf("backend", "file"));

        let mut kept = base.clone();
        kept.extend(&source, false);
        assert_eq!(kept.child("backend").unwrap().text(), "database");

        let mut replaced = base;
        replaced.extend(&source, true);
        assert_eq!(replaced.child("backend").unwrap().text(), "file");
    }

    #[test]
    fn extend_leaf_never_replaces_branch() {
        let mut target = ConfigNode::new("config")
            .with_child(ConfigNode::new("cache").with_child(ConfigNode::leaf("backend", "db")));
        let source = ConfigNode::new("config").with_child(ConfigNode::leaf("cache", "off"));
        target.extend(&source, true);

        let cache = target.child("cache").unwrap();
        assert!(cache.has_children());
        assert_eq!(cache.child("backend").unwrap().text(), "db");
    }

    #[test]
    fn extend_merges_recursively_by_name() {
        let mut target = ConfigNode::new("config").with_child(
            ConfigNode::new("default")
                .with_child(ConfigNode::leaf("a", "1"))
                .with_child(ConfigNode::leaf("b", "2")),
        );
        let source = ConfigNode::new("config").with_child(
            ConfigNode::new("default")
                .with_child(ConfigNode::leaf("b", "20"))
                .with_child(ConfigNode::leaf("c", "30")),
        );
        target.extend(&source, true);

        let default = target.child("default").unwrap();
        assert_eq!(default.child("a").unwrap().text(), "1");
        assert_eq!(default.child("b").unwrap().text(), "20");
        assert_eq!(default.child("c").unwrap().text(), "30");
        assert_eq!(default.child_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn extend_copies_leaf_attributes_on_overwrite() {
        let mut target = ConfigNode::new("config")
            .with_child(ConfigNode::leaf("model", "old").with_attribute("module", "a"));
        let source = ConfigNode::new("config")
            .with_child(ConfigNode::leaf("model", "new").with_attribute("module", "b"));
        target.extend(&source, true);

        let model = target.child("model").unwrap();
        assert_eq!(model.text(), "new");
        assert_eq!(model.attribute("module"), Some("b"));
    }
}
