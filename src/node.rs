//! Parse-time node graph.
//!
//! A [`Document`] owns its nodes in an arena. Collections refer to children by
//! [`NodeId`]; an alias contributes the id of the anchored node, so shared and even
//! cyclic structures are represented without copying.

use crate::location::Location;

/// Index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl nohash_hasher::IsEnabled for NodeId {}

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a scalar was written in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl From<saphyr_parser::ScalarStyle> for ScalarStyle {
    fn from(style: saphyr_parser::ScalarStyle) -> Self {
        match style {
            saphyr_parser::ScalarStyle::Plain => ScalarStyle::Plain,
            saphyr_parser::ScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
            saphyr_parser::ScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
            saphyr_parser::ScalarStyle::Literal => ScalarStyle::Literal,
            saphyr_parser::ScalarStyle::Folded => ScalarStyle::Folded,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Scalar content exactly as scanned (escapes processed, no type conversion).
    Scalar { value: String, style: ScalarStyle },
    Sequence(Vec<NodeId>),
    /// Entries in source order.
    Mapping(Vec<(NodeId, NodeId)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Normalized tag, explicit or resolved from the core schema.
    pub tag: String,
    /// `true` if the tag was written in the source.
    pub explicit_tag: bool,
    /// Parser anchor id, if the node carried `&anchor`.
    pub anchor: Option<usize>,
    pub location: Location,
}

/// One composed YAML document.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Document {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    /// If `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of distinct nodes (aliases do not add nodes).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}
