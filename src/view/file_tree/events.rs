//! Events flowing in and out of the picker widget
//!
//! Inbound: raw UI events the host forwards to `FileTreeWidget::dispatch`.
//! Outbound: presentation events (`TreeEvent`) drained by the host, and the
//! `TreeHandler` callbacks.

use super::scroll::ScrollAnimation;
use super::selection::SelectionChange;
use crate::services::listing::EntryKind;
use std::time::Duration;

/// Modifier keys held during a UI event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
    };

    /// Either selection-toggle modifier is held
    pub fn toggles(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What part of a row the event hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiTarget {
    /// The row anchor for `path`
    Row(String),
    /// The delete icon next to `path`
    DeleteIcon(String),
}

/// A raw UI event delegated to the widget root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    /// Event name as the host reports it (`click`, `dblclick`, ...)
    pub name: String,
    pub target: UiTarget,
    pub modifiers: Modifiers,
}

impl UiEvent {
    pub fn click(path: &str) -> Self {
        Self {
            name: "click".to_string(),
            target: UiTarget::Row(path.to_string()),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn ctrl_click(path: &str) -> Self {
        Self {
            modifiers: Modifiers::CTRL,
            ..Self::click(path)
        }
    }

    pub fn double_click(path: &str) -> Self {
        Self {
            name: "dblclick".to_string(),
            target: UiTarget::Row(path.to_string()),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn delete(path: &str) -> Self {
        Self {
            name: "click".to_string(),
            target: UiTarget::DeleteIcon(path.to_string()),
            modifiers: Modifiers::NONE,
        }
    }
}

/// Show/hide animation parameters; `duration: None` means instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Animation {
    pub duration: Option<Duration>,
    pub easing: Option<String>,
}

impl Animation {
    pub fn instant() -> Self {
        Self::default()
    }
}

/// Presentation work for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// Children of `path` were rendered; reveal them
    SlideDown { path: String, animation: Animation },
    /// `path` collapsed; hide its (already discarded) children
    SlideUp { path: String, animation: Animation },
    /// Bring `path`, currently visible at `row`, into view
    ScrollTo {
        path: String,
        row: usize,
        duration: Duration,
    },
}

impl TreeEvent {
    /// Animation for a `ScrollTo`, given the container's current offset and
    /// a uniform row height
    pub fn scroll_animation(&self, current_offset: f64, row_height: f64) -> Option<ScrollAnimation> {
        match self {
            TreeEvent::ScrollTo { row, duration, .. } => Some(ScrollAnimation::to_row(
                current_offset,
                *row,
                row_height,
                *duration,
            )),
            _ => None,
        }
    }
}

/// Payload of the single-click callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateEvent {
    pub path: String,
    pub kind: EntryKind,
    pub change: SelectionChange,
}

/// Entry returned by the host pull query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenEntry {
    /// Slash-fixed path: leading slash, no trailing slash
    pub path: String,
    pub kind: EntryKind,
    /// Last path segment
    pub name: String,
}

/// Host callbacks; every method defaults to a no-op
pub trait TreeHandler: Send {
    /// A row was activated (fires once per activation)
    fn on_activate(&mut self, _event: &ActivateEvent) {}

    /// A row was double-clicked
    fn on_double_click(&mut self, _path: &str) {}

    /// The delete icon of a row was clicked
    fn on_delete(&mut self, _path: &str) {}

    /// A directory listing was rendered under `path`
    fn on_content_loaded(&mut self, _path: &str) {}
}

/// Handler that ignores everything
#[derive(Debug, Default)]
pub struct NoopHandler;

impl TreeHandler for NoopHandler {}
