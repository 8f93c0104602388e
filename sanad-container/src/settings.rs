//! Container settings.
//!
//! Settings are fixed when a root container is built and inherited by
//! every child. They derive `Deserialize` so a host application can keep
//! them in its own configuration file:
//!
//! ```
//! use sanad_container::settings::ContainerSettings;
//!
//! let settings: ContainerSettings = serde_json::from_str(r#"{ "detect_cycles": false }"#).unwrap();
//! assert!(!settings.detect_cycles);
//! assert!(settings.share_construction_info);
//! ```

use serde::Deserialize;

/// Behavior switches for a container tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Children reuse the construction-info cache of the container that
    /// created them. When `false` each child starts with an empty cache.
    pub share_construction_info: bool,

    /// Fail with a circular dependency error when a function is invoked
    /// again while it is still being built on the same thread.
    pub detect_cycles: bool,

    /// Maximum number of "did you mean" entries on a resolution failure.
    pub max_suggestions: usize,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            share_construction_info: true,
            detect_cycles: true,
            max_suggestions: 3,
        }
    }
}
