//! Extension state models: named properties with change notification.
//!
//! Each navigator content extension keeps its presentation switches (for
//! example "show working sets as top-level elements") in an
//! [`ExtensionStateModel`]. Components that depend on those switches listen
//! for property changes through the [`NotificationSource`] contract and
//! re-read the values they care about.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use treeline_navigator::state_model::{
//!     ExtensionStateModel, NotificationSource, PropertyChangeEvent,
//! };
//!
//! let model = ExtensionStateModel::new("my.extension");
//! let id = model
//!     .subscribe(Arc::new(|event: &PropertyChangeEvent| {
//!         println!("{} changed", event.property)
//!     }))
//!     .unwrap();
//!
//! model.set_boolean_property("compact", true);
//! assert_eq!(model.read_boolean_flag("compact"), Ok(true));
//! model.unsubscribe(id).unwrap();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use treeline_core::{ConnectionId, Signal};

use crate::error::{FlagReadError, SubscriptionError};

/// A listener for property changes.
pub type PropertyListener = Arc<dyn Fn(&PropertyChangeEvent) + Send + Sync>;

/// The value of a state-model property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Describes a single property change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChangeEvent {
    /// Name of the property that changed.
    pub property: String,
    /// Value before the change; `None` if the property was unset.
    pub old_value: Option<PropertyValue>,
    /// Value after the change.
    pub new_value: PropertyValue,
}

/// A source of property-change notifications with readable boolean flags.
pub trait NotificationSource: Send + Sync {
    /// Register a listener for every future property change.
    fn subscribe(&self, listener: PropertyListener) -> Result<ConnectionId, SubscriptionError>;

    /// Remove a listener previously registered with [`subscribe`](Self::subscribe).
    fn unsubscribe(&self, id: ConnectionId) -> Result<(), SubscriptionError>;

    /// Read the current value of a boolean property.
    fn read_boolean_flag(&self, name: &str) -> Result<bool, FlagReadError>;
}

/// Finds the state model belonging to a content extension.
pub trait StateModelLocator {
    fn find_state_model(&self, extension_id: &str) -> Option<Arc<dyn NotificationSource>>;
}

/// Named properties of one content extension.
pub struct ExtensionStateModel {
    id: String,
    properties: RwLock<HashMap<String, PropertyValue>>,
    property_changed: Signal<PropertyChangeEvent>,
    closed: AtomicBool,
}

impl ExtensionStateModel {
    /// Create an empty state model for the given extension.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: RwLock::new(HashMap::new()),
            property_changed: Signal::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// The extension this model belongs to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signal emitted after a property value changes.
    pub fn on_property_changed(&self) -> &Signal<PropertyChangeEvent> {
        &self.property_changed
    }

    /// Set a property, notifying listeners if the value changed.
    ///
    /// Returns `true` if the value changed.
    pub fn set_property(&self, name: impl Into<String>, value: PropertyValue) -> bool {
        let name = name.into();
        let old_value = {
            let mut properties = self.properties.write();
            if properties.get(&name) == Some(&value) {
                return false;
            }
            properties.insert(name.clone(), value.clone())
        };

        tracing::debug!(
            target: "treeline_navigator::state_model",
            model = %self.id,
            property = %name,
            value = %value,
            "property changed"
        );

        // Listeners run after the lock is released so they can read back.
        if !self.is_closed() {
            self.property_changed.emit(PropertyChangeEvent {
                property: name,
                old_value,
                new_value: value,
            });
        }
        true
    }

    pub fn set_boolean_property(&self, name: impl Into<String>, value: bool) -> bool {
        self.set_property(name, PropertyValue::Bool(value))
    }

    pub fn set_int_property(&self, name: impl Into<String>, value: i64) -> bool {
        self.set_property(name, PropertyValue::Int(value))
    }

    pub fn set_string_property(&self, name: impl Into<String>, value: impl Into<String>) -> bool {
        self.set_property(name, PropertyValue::Text(value.into()))
    }

    /// Current value of a property, if set.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.properties.read().get(name).cloned()
    }

    /// A boolean property; `false` when unset or not a boolean.
    pub fn boolean_property(&self, name: &str) -> bool {
        matches!(self.property(name), Some(PropertyValue::Bool(true)))
    }

    /// An integer property, if set to an integer.
    pub fn int_property(&self, name: &str) -> Option<i64> {
        match self.property(name)? {
            PropertyValue::Int(value) => Some(value),
            _ => None,
        }
    }

    /// A string property, if set to a string.
    pub fn string_property(&self, name: &str) -> Option<String> {
        match self.property(name)? {
            PropertyValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Close the model: drop all listeners and refuse new ones.
    ///
    /// Properties stay readable through the inherent getters, but the
    /// [`NotificationSource`] operations fail with `SourceClosed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.property_changed.disconnect_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.property_changed.connection_count()
    }
}

impl fmt::Debug for ExtensionStateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionStateModel")
            .field("id", &self.id)
            .field("properties", &*self.properties.read())
            .field("listeners", &self.listener_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl NotificationSource for ExtensionStateModel {
    fn subscribe(&self, listener: PropertyListener) -> Result<ConnectionId, SubscriptionError> {
        if self.is_closed() {
            return Err(SubscriptionError::SourceClosed);
        }
        Ok(self.property_changed.connect(move |event| listener(event)))
    }

    fn unsubscribe(&self, id: ConnectionId) -> Result<(), SubscriptionError> {
        if self.is_closed() {
            return Err(SubscriptionError::SourceClosed);
        }
        self.property_changed.try_disconnect(id).map_err(Into::into)
    }

    fn read_boolean_flag(&self, name: &str) -> Result<bool, FlagReadError> {
        if self.is_closed() {
            return Err(FlagReadError::SourceClosed);
        }
        match self.property(name) {
            None => Ok(false),
            Some(PropertyValue::Bool(value)) => Ok(value),
            Some(_) => Err(FlagReadError::not_boolean(name)),
        }
    }
}

/// Registry of the state models of all content extensions.
#[derive(Default)]
pub struct NavigatorContentService {
    models: RwLock<HashMap<String, Arc<ExtensionStateModel>>>,
}

impl NavigatorContentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state model under its extension id, replacing any previous
    /// one.
    pub fn register(&self, model: ExtensionStateModel) -> Arc<ExtensionStateModel> {
        let model = Arc::new(model);
        self.models
            .write()
            .insert(model.id().to_string(), model.clone());
        model
    }

    /// Remove the state model of an extension.
    pub fn unregister(&self, extension_id: &str) -> Option<Arc<ExtensionStateModel>> {
        self.models.write().remove(extension_id)
    }

    /// The state model of an extension, if registered.
    pub fn state_model(&self, extension_id: &str) -> Option<Arc<ExtensionStateModel>> {
        self.models.read().get(extension_id).cloned()
    }
}

impl StateModelLocator for NavigatorContentService {
    fn find_state_model(&self, extension_id: &str) -> Option<Arc<dyn NotificationSource>> {
        self.state_model(extension_id)
            .map(|model| model as Arc<dyn NotificationSource>)
    }
}

static_assertions::assert_impl_all!(ExtensionStateModel: Send, Sync);
static_assertions::assert_impl_all!(NavigatorContentService: Send, Sync);
