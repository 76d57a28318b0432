//! The picker widget: one tree, one selection, one navigator
//!
//! All state changes happen on the task that owns the widget. Listing
//! requests run as spawned tokio tasks and report back over a channel; the
//! owner applies them with [`FileTreeWidget::apply_ready`],
//! [`FileTreeWidget::next_completion`] or [`FileTreeWidget::settle`].

use super::events::{
    ActivateEvent, Animation, ChosenEntry, Modifiers, NoopHandler, TreeEvent, TreeHandler,
    UiEvent, UiTarget,
};
use super::navigator::{AutoNavigator, NavAction};
use super::node::NodeId;
use super::render;
use super::selection::{SelectionChange, SelectionManager};
use super::tree::{ExpandOutcome, FetchTicket, FileTree};
use crate::config::TreeConfig;
use crate::primitives::path_utils::{base_name, fix_slashes, is_dir_path};
use crate::services::listing::{
    DirectoryFetcher, EntryKind, Listing, ListingEntry, ListingError, ListingParams,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A finished listing request, on its way back to the widget
#[derive(Debug)]
struct FetchCompletion {
    ticket: FetchTicket,
    result: Result<Listing, ListingError>,
}

/// Sends exactly one completion per ticket, even if the fetch task dies
struct CompletionSender {
    ticket: Option<FetchTicket>,
    tx: mpsc::UnboundedSender<FetchCompletion>,
}

impl CompletionSender {
    fn send(mut self, result: Result<Listing, ListingError>) {
        if let Some(ticket) = self.ticket.take() {
            let _ = self.tx.send(FetchCompletion { ticket, result });
        }
    }
}

impl Drop for CompletionSender {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let _ = self.tx.send(FetchCompletion {
                ticket,
                result: Err(ListingError::Cancelled),
            });
        }
    }
}

pub struct FileTreeWidget {
    config: TreeConfig,
    params: ListingParams,
    tree: FileTree,
    selection: SelectionManager,
    navigator: AutoNavigator,
    fetcher: Arc<dyn DirectoryFetcher>,
    tx: mpsc::UnboundedSender<FetchCompletion>,
    rx: mpsc::UnboundedReceiver<FetchCompletion>,
    /// Spawned fetches whose completion has not been received yet
    outstanding: usize,
    handler: Box<dyn TreeHandler>,
    events: Vec<TreeEvent>,
    root_rendered: bool,
}

impl std::fmt::Debug for FileTreeWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTreeWidget")
            .field("root", &self.tree.root_path())
            .field("nodes", &self.tree.node_count())
            .field("selected", &self.selection.selected())
            .field("outstanding", &self.outstanding)
            .finish()
    }
}

impl FileTreeWidget {
    pub fn new(config: TreeConfig, fetcher: Arc<dyn DirectoryFetcher>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            params: config.listing_params(),
            tree: FileTree::new(&config.root),
            selection: SelectionManager::new(config.multi_select),
            navigator: AutoNavigator::new(&config.folder, &config.file),
            fetcher,
            tx,
            rx,
            outstanding: 0,
            handler: Box::new(NoopHandler),
            events: Vec::new(),
            root_rendered: false,
            config,
        }
    }

    pub fn with_handler(mut self, handler: impl TreeHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn navigator(&self) -> &AutoNavigator {
        &self.navigator
    }

    /// Number of listing requests still in flight (stale ones included)
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Request the root listing
    ///
    /// Must be called from within a Tokio runtime. Calling it again while the
    /// root is loading or loaded does nothing.
    pub fn init(&mut self) {
        let root = self.tree.root_id();
        if let Some(ticket) = self.tree.begin_expand(root) {
            tracing::debug!("Loading root listing for {}", ticket.path);
            self.spawn_fetch(ticket);
        }
    }

    /// Drop every node and the selection, then load the root again
    ///
    /// Auto-navigation starts over, and listings requested before the reset
    /// are discarded when they arrive.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.selection.clear();
        self.events.clear();
        self.navigator = AutoNavigator::new(&self.config.folder, &self.config.file);
        self.root_rendered = false;
        self.init();
    }

    /// Switch the ambient `group` filter and reload the tree
    pub fn reload_with_group(&mut self, group: &str) {
        tracing::debug!("Reloading tree for group {:?}", group);
        self.config.group = group.to_string();
        self.params = self.config.listing_params();
        self.reset();
    }

    /// Delegated entry point for raw UI events
    ///
    /// Must be called from within a Tokio runtime: an activation may start a
    /// listing request.
    pub fn dispatch(&mut self, event: UiEvent) {
        let is_folder_event = event.name == self.config.folder_event;
        match event.target {
            UiTarget::DeleteIcon(path) => {
                if is_folder_event {
                    self.activate_delete(&path);
                }
            }
            UiTarget::Row(path) => {
                if self.tree.id_for_path(&path).is_none() {
                    tracing::debug!("Ignoring {} on unknown row {}", event.name, path);
                    return;
                }
                if is_folder_event {
                    self.activate(&path, event.modifiers);
                }
                if event.name == "dblclick" {
                    self.double_click(&path);
                }
            }
        }
    }

    /// Activate the row at `path`: expand/collapse directories, then apply
    /// the selection rules and notify the host
    ///
    /// Must be called from within a Tokio runtime: expanding a directory
    /// spawns its listing request. A user activation ends auto-navigation.
    pub fn activate(&mut self, path: &str, modifiers: Modifiers) {
        self.navigator.cancel();
        self.activate_row(path, modifiers);
    }

    fn activate_row(&mut self, path: &str, modifiers: Modifiers) {
        let Some(id) = self.tree.id_for_path(path) else {
            tracing::debug!("Activation of unknown path {}", path);
            return;
        };
        if id == self.tree.root_id() {
            return;
        }
        let Some(node) = self.tree.get_node(id) else {
            return;
        };
        let kind = node.kind();
        let (collapsed, expanded) = (node.is_collapsed(), node.is_expanded());

        if collapsed {
            self.expand(id);
        } else if expanded {
            self.collapse(id);
        }

        let change = if self.config.selects(kind) {
            self.selection.handle_activate(path, modifiers.toggles())
        } else {
            SelectionChange::Unchanged
        };

        self.handler.on_activate(&ActivateEvent {
            path: path.to_string(),
            kind,
            change,
        });
    }

    /// Notify the host of a double-click on `path`
    pub fn double_click(&mut self, path: &str) {
        if self.tree.id_for_path(path).is_some() {
            self.handler.on_double_click(path);
        }
    }

    /// Notify the host of a delete-icon click on `path`
    pub fn activate_delete(&mut self, path: &str) {
        if !self.config.delete_icons {
            tracing::debug!("Delete icons disabled, ignoring delete on {}", path);
            return;
        }
        if self.tree.id_for_path(path).is_some() {
            self.handler.on_delete(path);
        }
    }

    fn expand(&mut self, id: NodeId) {
        if !self.config.multi_folder {
            self.collapse_others(id);
        }
        if let Some(ticket) = self.tree.begin_expand(id) {
            self.spawn_fetch(ticket);
        }
    }

    fn collapse(&mut self, id: NodeId) {
        let Some(path) = self.tree.get_node(id).map(|n| n.path().to_string()) else {
            return;
        };
        if self.tree.collapse_node(id) {
            self.events.push(TreeEvent::SlideUp {
                path,
                animation: self.config.collapse_animation(),
            });
        }
    }

    /// Close every open directory that is not `keep` or one of its ancestors
    fn collapse_others(&mut self, keep: NodeId) {
        for other in self.tree.open_directories() {
            if other == keep || self.tree.is_ancestor(other, keep) {
                continue;
            }
            // Already gone if an ancestor was collapsed earlier in this loop
            self.collapse(other);
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        let params = self.params.clone();
        let path = ticket.path.clone();
        let sender = CompletionSender {
            ticket: Some(ticket),
            tx: self.tx.clone(),
        };
        self.outstanding += 1;

        tokio::spawn(async move {
            let result = fetcher.list_children(&path, &params).await;
            sender.send(result);
        });
    }

    /// Apply every completion that has already arrived; returns how many
    pub fn apply_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Wait for the next completion and apply it
    ///
    /// Returns false when no request is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(completion) => {
                self.apply_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is in flight, follow-up requests
    /// (auto-navigation) included
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn apply_completion(&mut self, completion: FetchCompletion) {
        self.outstanding = self.outstanding.saturating_sub(1);
        let FetchCompletion { ticket, result } = completion;
        let is_root = ticket.node == self.tree.root_id();

        match self.tree.complete_expand(&ticket, result) {
            ExpandOutcome::Applied { children } => {
                tracing::debug!("Rendered {} entries under {}", children.len(), ticket.path);
                let entries: Vec<ListingEntry> = children
                    .iter()
                    .filter_map(|&id| self.tree.get_node(id).map(|n| n.entry.clone()))
                    .collect();

                let animation = if is_root {
                    Animation::instant()
                } else {
                    self.config.expand_animation()
                };
                self.events.push(TreeEvent::SlideDown {
                    path: ticket.path.clone(),
                    animation,
                });
                self.handler.on_content_loaded(&ticket.path);

                self.run_navigator(&ticket.path, &entries);

                if is_root && !self.root_rendered {
                    self.root_rendered = true;
                    if let Some(file) = self.navigator.take_preselect() {
                        tracing::debug!("Preselecting {}", file);
                        self.selection.force_select(&file);
                    }
                }
            }
            ExpandOutcome::Failed(e) => {
                tracing::warn!("Failed to list {}: {}", ticket.path, e);
                let actions = self.navigator.abandon(&ticket.path);
                self.apply_nav_actions(actions);
            }
            ExpandOutcome::Stale => {}
        }
    }

    fn run_navigator(&mut self, listed: &str, entries: &[ListingEntry]) {
        if self.navigator.is_done() {
            return;
        }
        let actions = self.navigator.scan(listed, entries);
        self.apply_nav_actions(actions);
        if let Some(next) = self.navigator.awaiting() {
            tracing::debug!(
                "Auto-navigation waiting for {} (folder {:?}, file {:?})",
                next,
                self.navigator.target_folder(),
                self.navigator.target_file()
            );
        }
    }

    fn apply_nav_actions(&mut self, actions: Vec<NavAction>) {
        for action in actions {
            match action {
                NavAction::Open(path) => {
                    let collapsed = self.tree.get_node_by_path(&path).map(|n| (n.id, n.is_collapsed()));
                    if let Some((id, true)) = collapsed {
                        tracing::debug!("Auto-navigation opening {}", path);
                        self.expand(id);
                    }
                }
                NavAction::Activate(path) => {
                    tracing::debug!("Auto-navigation reached {}", path);
                    self.activate_row(&path, Modifiers::NONE);
                }
                NavAction::Scroll(path) => self.request_scroll(&path),
                NavAction::Close(path) => {
                    if let Some(id) = self.tree.id_for_path(&path) {
                        tracing::debug!("Auto-navigation closing {}", path);
                        self.collapse(id);
                    }
                }
            }
        }
    }

    fn request_scroll(&mut self, path: &str) {
        let row = self
            .tree
            .id_for_path(path)
            .and_then(|id| self.tree.visible_row(id));
        match row {
            Some(row) => self.events.push(TreeEvent::ScrollTo {
                path: path.to_string(),
                row,
                duration: self.config.scroll_duration(),
            }),
            None => tracing::debug!("Scroll target {} is not visible", path),
        }
    }

    /// Drain pending presentation events
    pub fn take_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// First chosen entry, slash-fixed, for the host
    pub fn chosen(&self) -> Option<ChosenEntry> {
        self.selection.first().map(chosen_entry)
    }

    /// Every chosen entry in selection order
    pub fn chosen_all(&self) -> Vec<ChosenEntry> {
        self.selection.selected().iter().map(|p| chosen_entry(p)).collect()
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selection.contains(path)
    }

    pub fn render_html(&self) -> String {
        render::render_html(self)
    }

    pub fn render_text(&self) -> String {
        render::render_text(self)
    }
}

fn chosen_entry(raw: &str) -> ChosenEntry {
    let kind = if is_dir_path(raw) {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    ChosenEntry {
        path: fix_slashes(raw),
        kind,
        name: base_name(raw).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::listing::MemoryFetcher;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorder {
        activations: Arc<Mutex<Vec<ActivateEvent>>>,
        loaded: Arc<Mutex<Vec<String>>>,
    }

    impl TreeHandler for Recorder {
        fn on_activate(&mut self, event: &ActivateEvent) {
            self.activations.lock().unwrap().push(event.clone());
        }

        fn on_content_loaded(&mut self, path: &str) {
            self.loaded.lock().unwrap().push(path.to_string());
        }
    }

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with_dir(
                "/",
                vec![
                    ListingEntry::directory("/docs/"),
                    ListingEntry::file("/notes.txt"),
                ],
            )
            .with_dir("/docs/", vec![ListingEntry::file("/docs/a.md")])
    }

    #[tokio::test]
    async fn test_init_loads_root_instantly() {
        let mut widget = FileTreeWidget::new(TreeConfig::default(), Arc::new(fetcher()));
        widget.init();
        assert_eq!(widget.outstanding(), 1);
        widget.settle().await;

        assert_eq!(widget.tree().get_visible_nodes().len(), 2);
        assert_eq!(
            widget.take_events(),
            vec![TreeEvent::SlideDown {
                path: "/".to_string(),
                animation: Animation::instant(),
            }]
        );
    }

    #[tokio::test]
    async fn test_directory_expands_with_configured_animation() {
        let recorder = Recorder::default();
        let mut widget = FileTreeWidget::new(TreeConfig::default(), Arc::new(fetcher()))
            .with_handler(recorder.clone());
        widget.init();
        widget.settle().await;
        widget.take_events();

        widget.activate("/docs/", Modifiers::NONE);
        widget.settle().await;

        let events = widget.take_events();
        assert!(matches!(
            &events[..],
            [TreeEvent::SlideDown { path, animation }]
                if path == "/docs/" && animation.duration == Some(std::time::Duration::from_millis(500))
        ));
        assert_eq!(*recorder.loaded.lock().unwrap(), vec!["/", "/docs/"]);

        let activations = recorder.activations.lock().unwrap();
        assert_eq!(activations.len(), 1);
        assert_eq!(activations[0].change, SelectionChange::Unchanged);
        assert_eq!(activations[0].kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn test_chosen_is_slash_fixed() {
        let config = TreeConfig {
            select_folder: true,
            ..Default::default()
        };
        let mut widget = FileTreeWidget::new(config, Arc::new(fetcher()));
        widget.init();
        widget.settle().await;

        widget.activate("/docs/", Modifiers::NONE);
        let chosen = widget.chosen().unwrap();
        assert_eq!(chosen.path, "/docs");
        assert_eq!(chosen.kind, EntryKind::Directory);
        assert_eq!(chosen.name, "docs");
    }

    #[tokio::test]
    async fn test_dropped_fetch_reports_cancelled() {
        let memory = fetcher();
        let gate = memory.hold("/docs/");
        let mut widget = FileTreeWidget::new(TreeConfig::default(), Arc::new(memory));
        widget.init();
        widget.settle().await;

        widget.activate("/docs/", Modifiers::NONE);
        assert!(widget.tree().get_node_by_path("/docs/").unwrap().is_expanding());

        // A sender dropped without a result still resolves the ticket
        let ticket = FetchTicket {
            node: widget.tree().id_for_path("/docs/").unwrap(),
            path: "/docs/".to_string(),
            generation: 0,
        };
        drop(CompletionSender {
            ticket: Some(ticket),
            tx: widget.tx.clone(),
        });
        widget.outstanding += 1;
        assert_eq!(widget.apply_ready(), 1);
        assert!(
            widget.tree().get_node_by_path("/docs/").unwrap().is_expanding(),
            "generation 0 never matches a live expansion"
        );

        gate.release();
        widget.settle().await;
        assert!(widget.tree().get_node_by_path("/docs/").unwrap().is_expanded());
    }
}
