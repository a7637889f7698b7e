//! Navigator configuration.

/// Extension whose state model carries the working-set presentation flags.
pub const WORKING_SETS_EXTENSION_ID: &str = "org.eclipse.ui.navigator.resources.workingSets";

/// Property that is `true` when working sets are shown as top-level elements.
pub const SHOW_TOP_LEVEL_WORKING_SETS: &str = "showTopLevelWorkingSets";

/// Configuration for a [`GroupingModeTracker`](crate::GroupingModeTracker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Extension whose state model is looked up on `init`.
    pub extension_id: String,
    /// Boolean property that selects grouped mode.
    pub flag_property: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            extension_id: WORKING_SETS_EXTENSION_ID.to_string(),
            flag_property: SHOW_TOP_LEVEL_WORKING_SETS.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Create a configuration for the given extension and flag property.
    pub fn new(extension_id: impl Into<String>, flag_property: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            flag_property: flag_property.into(),
        }
    }

    /// Set the extension id.
    pub fn extension_id(mut self, extension_id: impl Into<String>) -> Self {
        self.extension_id = extension_id.into();
        self
    }

    /// Set the flag property.
    pub fn flag_property(mut self, flag_property: impl Into<String>) -> Self {
        self.flag_property = flag_property.into();
        self
    }
}
