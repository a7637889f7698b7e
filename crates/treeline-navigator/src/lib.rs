//! Project navigator support for Treeline.
//!
//! This crate provides the pieces of the project navigator that decide how
//! the workspace is presented:
//!
//! - **Grouping**: track whether projects are shown flat or grouped under
//!   working sets, and resolve the working set an element hangs under
//! - **State models**: per-extension properties with change notification
//! - **Working sets**: named groups of elements and the sources that list them
//! - **Elements**: workspace resources and the tree nodes that wrap them
//! - **Keywords**: keyword providers for code scanners
//!
//! # Example
//!
//! ```
//! use treeline_navigator::prelude::*;
//!
//! let service = NavigatorContentService::new();
//! let model = service.register(ExtensionStateModel::new(WORKING_SETS_EXTENSION_ID));
//!
//! let tracker = GroupingModeTracker::new();
//! tracker.init(&service);
//!
//! let sets = WorkingSetManager::new();
//! let lib = Element::from(Resource::project("lib"));
//! sets.add(NamedWorkingSet::new("core", [lib.clone()]));
//!
//! // Flat: nothing has a working-set parent.
//! assert!(tracker.resolve_parent(Some(&lib), &sets).is_none());
//!
//! model.set_boolean_property(SHOW_TOP_LEVEL_WORKING_SETS, true);
//! let parent = tracker.resolve_parent(Some(&lib), &sets).unwrap();
//! assert_eq!(parent.name(), "core");
//! ```

pub mod config;
pub mod grouping;
pub mod keywords;
pub mod resource;
pub mod state_model;
pub mod working_set;

mod error;

pub use config::{SHOW_TOP_LEVEL_WORKING_SETS, TrackerConfig, WORKING_SETS_EXTENSION_ID};
pub use error::{FlagReadError, NavigatorError, Result, SubscriptionError};
pub use grouping::{GroupingMode, GroupingModeTracker};
pub use keywords::{CodeScannerKeywords, KeywordSet};
pub use resource::{Adaptable, Element, Resource, ResourceKind, WrappedResource};
pub use state_model::{
    ExtensionStateModel, NavigatorContentService, NotificationSource, PropertyChangeEvent,
    PropertyListener, PropertyValue, StateModelLocator,
};
pub use working_set::{NamedWorkingSet, WorkingSet, WorkingSetManager, WorkingSetSource};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::config::{SHOW_TOP_LEVEL_WORKING_SETS, TrackerConfig, WORKING_SETS_EXTENSION_ID};
    pub use crate::grouping::{GroupingMode, GroupingModeTracker};
    pub use crate::keywords::{CodeScannerKeywords, KeywordSet};
    pub use crate::resource::{Adaptable, Element, Resource};
    pub use crate::state_model::{
        ExtensionStateModel, NavigatorContentService, NotificationSource, StateModelLocator,
    };
    pub use crate::working_set::{NamedWorkingSet, WorkingSet, WorkingSetManager, WorkingSetSource};
}
