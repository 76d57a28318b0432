// Picker tree with lazy loading
//
// Directories are only listed when expanded and forget their children on
// collapse. The widget wires the node model, the selection and the
// auto-navigator to a listing backend and to the host's callbacks.

pub mod events;
pub mod navigator;
pub mod node;
pub mod render;
pub mod scroll;
pub mod selection;
pub mod tree;
pub mod widget;

pub use events::{
    ActivateEvent, Animation, ChosenEntry, Modifiers, NoopHandler, TreeEvent, TreeHandler,
    UiEvent, UiTarget,
};
pub use navigator::{AutoNavigator, NavAction};
pub use node::{NodeId, NodeState, TreeNode};
pub use scroll::{ScrollAnimation, DEFAULT_SCROLL_DURATION};
pub use selection::{SelectionChange, SelectionManager};
pub use tree::{ExpandOutcome, FetchTicket, FileTree};
pub use widget::FileTreeWidget;
