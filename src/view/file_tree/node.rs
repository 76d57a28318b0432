use crate::services::listing::{EntryKind, ListingEntry};
use std::fmt;

/// Unique identifier for a tree node
///
/// Ids are never reused within a tree, so a fetch ticket that names a
/// discarded node can never be mistaken for its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Represents a node in the file tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Unique identifier
    pub id: NodeId,
    /// Listing entry this node was created from
    pub entry: ListingEntry,
    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,
    /// Child node IDs, in listing order (directories, only while expanded)
    pub children: Vec<NodeId>,
    /// Current state of the node
    pub state: NodeState,
}

impl TreeNode {
    pub fn new(id: NodeId, entry: ListingEntry, parent: Option<NodeId>) -> Self {
        let state = if entry.is_dir() {
            NodeState::Collapsed
        } else {
            NodeState::Leaf
        };

        Self {
            id,
            entry,
            parent,
            children: Vec::new(),
            state,
        }
    }

    pub fn path(&self) -> &str {
        &self.entry.path
    }

    pub fn kind(&self) -> EntryKind {
        self.entry.kind
    }

    pub fn is_dir(&self) -> bool {
        self.entry.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.entry.is_file()
    }

    pub fn is_expanded(&self) -> bool {
        self.state == NodeState::Expanded
    }

    pub fn is_collapsed(&self) -> bool {
        self.state == NodeState::Collapsed
    }

    /// Check if a listing request is in flight for this node
    pub fn is_expanding(&self) -> bool {
        matches!(self.state, NodeState::Expanding { .. })
    }

    /// Whether children have been fetched since the last collapse
    pub fn is_loaded(&self) -> bool {
        self.is_expanded()
    }

    /// Check if this node is a leaf (file, not a directory)
    pub fn is_leaf(&self) -> bool {
        self.state == NodeState::Leaf
    }

    /// Expanded or on its way there
    pub fn is_open(&self) -> bool {
        self.is_expanded() || self.is_expanding()
    }
}

/// State of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Directory not expanded; holds no children
    Collapsed,
    /// Listing request in flight; only the matching generation may complete it
    Expanding { generation: u64 },
    /// Directory expanded, children materialized
    Expanded,
    /// File (cannot be expanded)
    Leaf,
}
