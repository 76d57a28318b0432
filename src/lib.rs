// Picker library - exposes the tree widget, listing backends and config

pub mod config;
pub mod config_io;
pub mod primitives;
pub mod services;
pub mod view;

pub use config::{ConfigError, TreeConfig};
pub use services::listing::{
    DirectoryFetcher, EntryKind, Listing, ListingEntry, ListingError, ListingParams,
};
pub use view::file_tree::FileTreeWidget;
