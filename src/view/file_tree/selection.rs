//! Selection tracking for the picker
//!
//! Selection entries reference nodes by path and are owned here, not by the
//! nodes: collapsing a directory never drops a chosen descendant, only an
//! explicit replace, toggle-off or clear does.

/// How an activation changed the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The node is now part of the selection
    Selected,
    /// The node was toggled off
    Deselected,
    /// Selection is disabled for the node's kind; nothing changed
    Unchanged,
}

impl SelectionChange {
    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionChange::Selected)
    }
}

/// Ordered set of chosen paths
#[derive(Debug, Clone)]
pub struct SelectionManager {
    selected: Vec<String>,
    multi_select: bool,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SelectionManager {
    /// Create an empty selection
    ///
    /// With `multi_select` off, modifier keys are ignored and the selection
    /// never holds more than one entry.
    pub fn new(multi_select: bool) -> Self {
        Self {
            selected: Vec::new(),
            multi_select,
        }
    }

    /// Apply an activation of `path`
    ///
    /// - no modifier: the selection becomes exactly `[path]`
    /// - modifier on a selected path: the path is removed
    /// - modifier on an unselected path: the path is appended
    pub fn handle_activate(&mut self, path: &str, modifier_held: bool) -> SelectionChange {
        if !modifier_held || !self.multi_select {
            self.selected.clear();
            self.selected.push(path.to_string());
            return SelectionChange::Selected;
        }

        if let Some(pos) = self.position(path) {
            self.selected.remove(pos);
            SelectionChange::Deselected
        } else {
            self.selected.push(path.to_string());
            SelectionChange::Selected
        }
    }

    /// Make `path` the whole selection without consulting modifiers
    ///
    /// Used when the host asks for a preselected file. Behaves like a plain
    /// activation but never reports a change.
    pub fn force_select(&mut self, path: &str) {
        self.selected.clear();
        self.selected.push(path.to_string());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.selected.iter().position(|p| p == path)
    }

    /// Chosen paths in the order they were chosen
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn first(&self) -> Option<&str> {
        self.selected.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
