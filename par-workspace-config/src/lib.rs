//! Configuration for the par-workspace pane layout engine.
//!
//! This crate provides the settings that tune the pane engine:
//!
//! - Debounce window for the "active item stopped changing" notification
//! - Whether emptied panes are destroyed automatically
//! - Default split behavior
//! - The workspace location tag a container is created for
//!
//! Settings are stored as YAML and loaded with [`LayoutConfig::load_from`].

pub mod defaults;
pub mod error;
pub mod layout;

pub use error::ConfigError;
pub use layout::LayoutConfig;
