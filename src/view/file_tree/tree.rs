use super::node::{NodeId, NodeState, TreeNode};
use crate::primitives::path_utils::{is_strict_ancestor, root_key};
use crate::services::listing::{Listing, ListingEntry, ListingError};
use std::collections::HashMap;

/// Proof that a node entered `Expanding`; required to complete the fetch
///
/// The generation pins the ticket to one specific expansion attempt: once
/// the node is collapsed (or re-expanded), older tickets no longer match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub node: NodeId,
    pub path: String,
    pub generation: u64,
}

/// Result of applying a fetch outcome to the tree
#[derive(Debug)]
pub enum ExpandOutcome {
    /// Children materialized; the node is now `Expanded`
    Applied { children: Vec<NodeId> },
    /// Listing failed; the node is back to `Collapsed`
    Failed(ListingError),
    /// The node is gone or no longer waiting for this ticket; nothing changed
    Stale,
}

/// File tree with lazy loading support
///
/// The tree starts with just the root node. Directories only get children
/// when a listing is applied to them, and lose them again on collapse, so
/// every re-expansion starts from a fresh listing.
#[derive(Debug)]
pub struct FileTree {
    /// Root directory path (always ends with `/`)
    root_path: String,
    /// All nodes indexed by ID
    nodes: HashMap<NodeId, TreeNode>,
    /// Path to node ID mapping for event delegation lookups
    path_to_node: HashMap<String, NodeId>,
    root_id: NodeId,
    next_id: usize,
    next_generation: u64,
}

impl FileTree {
    /// Create a new tree rooted at `root` (`/data` and `/data/` are equivalent)
    pub fn new(root: &str) -> Self {
        let root_path = root_key(root);
        let root_id = NodeId(0);
        let root_node = TreeNode::new(root_id, ListingEntry::directory(&root_path), None);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);
        let mut path_to_node = HashMap::new();
        path_to_node.insert(root_path.clone(), root_id);

        Self {
            root_path,
            nodes,
            path_to_node,
            root_id,
            next_id: 1,
            next_generation: 1,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }

    /// Look up a node by its exact path
    pub fn id_for_path(&self, path: &str) -> Option<NodeId> {
        self.path_to_node.get(path).copied()
    }

    pub fn get_node_by_path(&self, path: &str) -> Option<&TreeNode> {
        self.id_for_path(path).and_then(|id| self.get_node(id))
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Get number of nodes currently materialized (root included)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Start expanding a collapsed directory
    ///
    /// Returns the ticket the caller must present with the listing result.
    /// Returns `None` when there is nothing to fetch: the node is a file, is
    /// already expanded, or already has a fetch in flight (single-flight).
    pub fn begin_expand(&mut self, id: NodeId) -> Option<FetchTicket> {
        let node = self.get_node(id)?;
        match node.state {
            NodeState::Collapsed => {}
            NodeState::Expanding { generation } => {
                tracing::debug!(
                    "{} already expanding (generation {}), ignoring",
                    node.path(),
                    generation
                );
                return None;
            }
            NodeState::Expanded | NodeState::Leaf => return None,
        }

        // Cleanup of anything left from a previous expansion happens here,
        // right before the new listing is requested.
        let stale: Vec<NodeId> = node.children.clone();
        for child_id in stale {
            self.remove_node_recursive(child_id);
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let node = self.get_node_mut(id)?;
        node.children.clear();
        node.state = NodeState::Expanding { generation };
        tracing::debug!("{} expanding (generation {})", node.path(), generation);

        Some(FetchTicket {
            node: id,
            path: node.path().to_string(),
            generation,
        })
    }

    /// Apply the outcome of a listing request
    ///
    /// Only a node still in `Expanding` with the ticket's generation accepts
    /// the result; anything else is a late response and is discarded.
    pub fn complete_expand(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Listing, ListingError>,
    ) -> ExpandOutcome {
        let waiting = matches!(
            self.get_node(ticket.node).map(|n| n.state),
            Some(NodeState::Expanding { generation }) if generation == ticket.generation
        );
        if !waiting {
            tracing::debug!(
                "discarding late listing for {} (generation {})",
                ticket.path,
                ticket.generation
            );
            return ExpandOutcome::Stale;
        }

        match result {
            Ok(listing) => {
                let mut child_ids = Vec::with_capacity(listing.len());
                for entry in listing {
                    if self.path_to_node.contains_key(&entry.path) {
                        tracing::warn!(
                            "listing for {} repeats known path {}, skipping",
                            ticket.path,
                            entry.path
                        );
                        continue;
                    }
                    child_ids.push(self.add_node(entry, Some(ticket.node)));
                }

                if let Some(node) = self.get_node_mut(ticket.node) {
                    node.children = child_ids.clone();
                    node.state = NodeState::Expanded;
                }
                ExpandOutcome::Applied {
                    children: child_ids,
                }
            }
            Err(e) => {
                if let Some(node) = self.get_node_mut(ticket.node) {
                    node.state = NodeState::Collapsed;
                }
                ExpandOutcome::Failed(e)
            }
        }
    }

    /// Collapse a directory node
    ///
    /// Removes all descendants; they will be re-fetched on the next
    /// expansion. Collapsing an `Expanding` node orphans its pending fetch.
    /// Returns true if the node was open.
    pub fn collapse_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.get_node(id) else {
            return false;
        };
        if !node.is_open() {
            return false;
        }

        let children_to_remove: Vec<NodeId> = node.children.clone();
        for child_id in children_to_remove {
            self.remove_node_recursive(child_id);
        }

        if let Some(node) = self.get_node_mut(id) {
            node.children.clear();
            node.state = NodeState::Collapsed;
            tracing::debug!("{} collapsed", node.path());
        }
        true
    }

    /// Open directories (expanded or expanding), outermost first, root excluded
    pub fn open_directories(&self) -> Vec<NodeId> {
        let mut open: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.id != self.root_id && n.is_open())
            .map(|n| n.id)
            .collect();
        open.sort_by_key(|&id| (self.get_depth(id), id));
        open
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        match (self.get_node(ancestor), self.get_node(id)) {
            (Some(a), Some(n)) => is_strict_ancestor(a.path(), n.path()),
            _ => false,
        }
    }

    /// Get all visible rows in document order
    ///
    /// The root is the container, not a row, so it is not included.
    pub fn get_visible_nodes(&self) -> Vec<NodeId> {
        let mut visible = Vec::new();
        if let Some(root) = self.get_node(self.root_id) {
            for &child_id in &root.children {
                self.collect_visible_recursive(child_id, &mut visible);
            }
        }
        visible
    }

    fn collect_visible_recursive(&self, id: NodeId, visible: &mut Vec<NodeId>) {
        visible.push(id);

        if let Some(node) = self.get_node(id) {
            if node.is_expanded() {
                for &child_id in &node.children {
                    self.collect_visible_recursive(child_id, visible);
                }
            }
        }
    }

    /// Row index of a node among the visible rows
    pub fn visible_row(&self, id: NodeId) -> Option<usize> {
        self.get_visible_nodes().iter().position(|&v| v == id)
    }

    /// Get the parent chain for a node (from root to node)
    pub fn get_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = Some(id);

        while let Some(node_id) = current {
            ancestors.push(node_id);
            current = self.get_node(node_id).and_then(|n| n.parent);
        }

        ancestors.reverse();
        ancestors
    }

    /// Get the depth of a node (root is 0)
    pub fn get_depth(&self, id: NodeId) -> usize {
        self.get_ancestors(id).len().saturating_sub(1)
    }

    /// Drop every node except a collapsed root
    ///
    /// Ids and generations keep counting, so tickets issued before the reset
    /// stay stale.
    pub fn clear(&mut self) {
        let root_children: Vec<NodeId> = self
            .get_node(self.root_id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child_id in root_children {
            self.remove_node_recursive(child_id);
        }
        if let Some(root) = self.get_node_mut(self.root_id) {
            root.children.clear();
            root.state = NodeState::Collapsed;
        }
    }

    fn add_node(&mut self, entry: ListingEntry, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.path_to_node.insert(entry.path.clone(), id);
        self.nodes.insert(id, TreeNode::new(id, entry, parent));

        id
    }

    fn remove_node_recursive(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child_id in node.children {
                self.remove_node_recursive(child_id);
            }
            self.path_to_node.remove(&node.entry.path);
        }
    }
}
