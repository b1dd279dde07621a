use std::fmt;

use crate::types::tab::{GroupId, TabId, WindowId};

// === TabError ===

/// Errors raised while querying or mutating the tab source.
#[derive(Debug, Clone, PartialEq)]
pub enum TabError {
    /// The tab vanished between computation and action.
    NotFound(TabId),
    /// The window vanished between computation and action.
    WindowNotFound(WindowId),
    /// The tab group no longer exists.
    GroupNotFound(GroupId),
    /// The tab cannot take the requested transition (e.g. discarding the active tab).
    Ineligible(TabId, String),
    /// The current tab or window could not be determined.
    ResolutionFailure(String),
    /// The tab source failed to answer a query.
    Source(String),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
            TabError::WindowNotFound(id) => write!(f, "Window not found: {}", id),
            TabError::GroupNotFound(id) => write!(f, "Tab group not found: {}", id),
            TabError::Ineligible(id, reason) => {
                write!(f, "Tab {} is ineligible: {}", id, reason)
            }
            TabError::ResolutionFailure(msg) => {
                write!(f, "Cannot resolve current tab: {}", msg)
            }
            TabError::Source(msg) => write!(f, "Tab source error: {}", msg),
        }
    }
}

impl std::error::Error for TabError {}

impl TabError {
    /// Whether the error only means the world moved on under us.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TabError::NotFound(_) | TabError::WindowNotFound(_) | TabError::GroupNotFound(_)
        )
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
