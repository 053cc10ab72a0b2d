//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! [`LayoutConfig`](crate::LayoutConfig) fields.

/// Location tag of the workspace center.
pub const CENTER_LOCATION: &str = "center";

pub fn stop_changing_delay_ms() -> u64 {
    100
}

pub fn destroy_empty_panes() -> bool {
    true
}

pub fn copy_active_item_on_split() -> bool {
    false
}

pub fn location() -> String {
    CENTER_LOCATION.to_string()
}
