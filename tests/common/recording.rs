// Host handler that records every callback

use std::sync::{Arc, Mutex};
use treepick::view::file_tree::{ActivateEvent, SelectionChange, TreeHandler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Activate(ActivateEvent),
    DoubleClick(String),
    Delete(String),
    ContentLoaded(String),
}

/// Cloneable handle; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    log: Arc<Mutex<Vec<Callback>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callbacks(&self) -> Vec<Callback> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn activations(&self) -> Vec<ActivateEvent> {
        self.callbacks()
            .into_iter()
            .filter_map(|c| match c {
                Callback::Activate(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn activation_changes(&self, path: &str) -> Vec<SelectionChange> {
        self.activations()
            .into_iter()
            .filter(|e| e.path == path)
            .map(|e| e.change)
            .collect()
    }

    pub fn loaded(&self) -> Vec<String> {
        self.callbacks()
            .into_iter()
            .filter_map(|c| match c {
                Callback::ContentLoaded(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn push(&self, callback: Callback) {
        self.log.lock().unwrap().push(callback);
    }
}

impl TreeHandler for RecordingHandler {
    fn on_activate(&mut self, event: &ActivateEvent) {
        self.push(Callback::Activate(event.clone()));
    }

    fn on_double_click(&mut self, path: &str) {
        self.push(Callback::DoubleClick(path.to_string()));
    }

    fn on_delete(&mut self, path: &str) {
        self.push(Callback::Delete(path.to_string()));
    }

    fn on_content_loaded(&mut self, path: &str) {
        self.push(Callback::ContentLoaded(path.to_string()));
    }
}
