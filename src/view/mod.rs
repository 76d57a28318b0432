//! View layer
//!
//! The picker widget and its projections.

pub mod file_tree;
