//! Top-level grouping: projects flat, or grouped under working sets.
//!
//! The navigator can show either the projects themselves or the user's
//! working sets as its top-level elements. Which one is active is a flag in
//! the working-sets extension's state model. [`GroupingModeTracker`] mirrors
//! that flag as a [`GroupingMode`] and, while grouped, tells the tree which
//! working set an element hangs under.
//!
//! # Example
//!
//! ```
//! use treeline_navigator::{
//!     Element, ExtensionStateModel, GroupingMode, GroupingModeTracker, NamedWorkingSet,
//!     NavigatorContentService, Resource, WorkingSet, SHOW_TOP_LEVEL_WORKING_SETS,
//!     WORKING_SETS_EXTENSION_ID,
//! };
//!
//! let service = NavigatorContentService::new();
//! let model = service.register(ExtensionStateModel::new(WORKING_SETS_EXTENSION_ID));
//!
//! let tracker = GroupingModeTracker::new();
//! tracker.init(&service);
//! assert_eq!(tracker.mode(), GroupingMode::Flat);
//!
//! model.set_boolean_property(SHOW_TOP_LEVEL_WORKING_SETS, true);
//! assert_eq!(tracker.mode(), GroupingMode::Grouped);
//!
//! let app = Element::from(Resource::project("app"));
//! let sets = || vec![NamedWorkingSet::new("services", [app.clone()])];
//! let parent = tracker.resolve_parent(Some(&app), &sets).unwrap();
//! assert_eq!(parent.name(), "services");
//! ```

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use treeline_core::logging::{log_error, targets};
use treeline_core::{ConnectionId, Property, Signal};

use crate::config::TrackerConfig;
use crate::error::{FlagReadError, NavigatorError, SubscriptionError};
use crate::resource::Adaptable;
use crate::state_model::{NotificationSource, PropertyChangeEvent, StateModelLocator};
use crate::working_set::{WorkingSet, WorkingSetSource};

/// What the navigator shows as its top-level elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupingMode {
    /// Working sets are the top-level elements.
    Grouped,
    /// Projects are the top-level elements.
    #[default]
    Flat,
}

impl GroupingMode {
    /// The mode selected by the "show working sets as top-level" flag.
    pub fn from_flag(show_working_sets: bool) -> Self {
        if show_working_sets {
            Self::Grouped
        } else {
            Self::Flat
        }
    }
}

/// A live listener registration on a notification source.
struct Subscription {
    source: Arc<dyn NotificationSource>,
    id: ConnectionId,
    generation: u64,
}

struct TrackerInner {
    config: TrackerConfig,
    mode: Property<GroupingMode>,
    mode_changed: Signal<GroupingMode>,
    subscription: Mutex<Option<Subscription>>,
    /// Serializes `mode_changed` emissions; holds the last mode emitted.
    emitted: ReentrantMutex<Cell<GroupingMode>>,
    generations: AtomicU64,
}

impl TrackerInner {
    fn try_subscribe(
        self: &Arc<Self>,
        source: Option<Arc<dyn NotificationSource>>,
    ) -> Result<Subscription, SubscriptionError> {
        let source = source.ok_or_else(|| SubscriptionError::StateModelNotFound {
            extension_id: self.config.extension_id.clone(),
        })?;

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let tracker: Weak<Self> = Arc::downgrade(self);
        let flag_property = self.config.flag_property.clone();

        let id = source.subscribe(Arc::new(move |event: &PropertyChangeEvent| {
            if event.property != flag_property {
                return;
            }
            if let Some(tracker) = tracker.upgrade() {
                tracker.on_flag_changed(generation);
            }
        }))?;

        Ok(Subscription {
            source,
            id,
            generation,
        })
    }

    fn try_unsubscribe(subscription: &Subscription) -> Result<(), SubscriptionError> {
        subscription.source.unsubscribe(subscription.id)
    }

    fn try_read_flag(&self, source: &dyn NotificationSource) -> Result<bool, FlagReadError> {
        source.read_boolean_flag(&self.config.flag_property)
    }

    /// Drop the current subscription, if any. Failures are logged.
    fn detach(&self, slot: &mut Option<Subscription>) {
        let Some(subscription) = slot.take() else {
            return;
        };
        match Self::try_unsubscribe(&subscription) {
            Ok(()) => tracing::debug!(
                target: "treeline_navigator::grouping",
                generation = subscription.generation,
                "detached from state model"
            ),
            Err(err) => log_error(targets::GROUPING, &NavigatorError::from(err)),
        }
    }

    /// Re-read the flag and update the mode.
    ///
    /// Returns the new mode if it changed. A failed read leaves the mode as
    /// it was.
    fn reevaluate(&self, source: &dyn NotificationSource) -> Option<GroupingMode> {
        match self.try_read_flag(source) {
            Ok(show_working_sets) => {
                let mode = GroupingMode::from_flag(show_working_sets);
                self.mode.set(mode).then(|| {
                    tracing::debug!(target: "treeline_navigator::grouping", ?mode, "grouping mode changed");
                    mode
                })
            }
            Err(err) => {
                log_error(targets::GROUPING, &NavigatorError::from(err));
                None
            }
        }
    }

    fn on_flag_changed(&self, generation: u64) {
        let changed = {
            let subscription = self.subscription.lock();
            match subscription.as_ref() {
                Some(current) if current.generation == generation => {
                    self.reevaluate(current.source.as_ref())
                }
                _ => {
                    tracing::trace!(
                        target: "treeline_navigator::grouping",
                        generation,
                        "ignoring notification from a detached subscription"
                    );
                    None
                }
            }
        };
        self.notify(changed);
    }

    /// Emit `mode_changed` if the mode differs from the last one emitted.
    ///
    /// Runs outside the subscription lock so slots may call back in. The
    /// mode is re-read under the emission lock: when two updates race, the
    /// last emission always carries the mode the tracker ended up in.
    fn notify(&self, changed: Option<GroupingMode>) {
        if changed.is_none() {
            return;
        }
        let emitted = self.emitted.lock();
        let mode = self.mode.get();
        if emitted.get() != mode {
            emitted.set(mode);
            self.mode_changed.emit(mode);
        }
    }
}

/// Tracks whether working sets or projects are the navigator's top level.
///
/// The tracker starts in [`GroupingMode::Flat`] with no subscription.
/// [`init`](Self::init) attaches it to the working-sets state model and reads
/// the flag once; afterwards every change of the flag property re-reads it.
/// [`dispose`](Self::dispose) detaches and keeps the last mode.
///
/// No method panics or returns an error: failures to subscribe, unsubscribe
/// or read the flag are logged and the previous state is kept.
///
/// All methods may be called from any thread. Mutations of the mode and the
/// subscription are serialized per tracker.
pub struct GroupingModeTracker {
    inner: Arc<TrackerInner>,
}

impl Default for GroupingModeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupingModeTracker {
    /// Create a tracker for the standard working-sets extension.
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    /// Create a tracker with custom configuration.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                config,
                mode: Property::new(GroupingMode::default()),
                mode_changed: Signal::new(),
                subscription: Mutex::new(None),
                emitted: ReentrantMutex::new(Cell::new(GroupingMode::default())),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    /// The current grouping mode.
    pub fn mode(&self) -> GroupingMode {
        self.inner.mode.get()
    }

    /// Whether the tracker currently holds a subscription.
    pub fn is_subscribed(&self) -> bool {
        self.inner.subscription.lock().is_some()
    }

    /// Signal emitted with the new mode whenever it changes.
    ///
    /// Emissions are serialized, so when notifications race the last mode
    /// emitted is the one [`mode`](Self::mode) reports.
    pub fn on_mode_changed(&self) -> &Signal<GroupingMode> {
        &self.inner.mode_changed
    }

    /// Attach to the state model of the configured extension.
    ///
    /// Any previous subscription is dropped first. If `locator` has no state
    /// model for the extension, the failure is logged and the tracker stays
    /// unsubscribed with its previous mode.
    pub fn init(&self, locator: &dyn StateModelLocator) {
        let source = locator.find_state_model(&self.inner.config.extension_id);
        self.attach_source(source);
    }

    /// Attach directly to a notification source.
    ///
    /// Same semantics as [`init`](Self::init). The source must not invoke
    /// listeners from inside `subscribe`.
    pub fn attach(&self, source: Arc<dyn NotificationSource>) {
        self.attach_source(Some(source));
    }

    fn attach_source(&self, source: Option<Arc<dyn NotificationSource>>) {
        let changed = {
            let mut subscription = self.inner.subscription.lock();
            self.inner.detach(&mut subscription);

            match self.inner.try_subscribe(source) {
                Ok(new_subscription) => {
                    tracing::debug!(
                        target: "treeline_navigator::grouping",
                        extension = %self.inner.config.extension_id,
                        generation = new_subscription.generation,
                        "attached to state model"
                    );
                    let changed = self.inner.reevaluate(new_subscription.source.as_ref());
                    *subscription = Some(new_subscription);
                    changed
                }
                Err(err) => {
                    log_error(targets::GROUPING, &NavigatorError::from(err));
                    None
                }
            }
        };
        self.inner.notify(changed);
    }

    /// Stop listening for flag changes.
    ///
    /// Safe to call any number of times. The current mode is kept.
    pub fn dispose(&self) {
        let mut subscription = self.inner.subscription.lock();
        self.inner.detach(&mut subscription);
    }

    /// The working set an element is shown under.
    ///
    /// Returns `None` unless the mode is [`GroupingMode::Grouped`], when
    /// `item` is `None`, or when no working set contains it. Working sets are
    /// fetched from `source` on every call and scanned in the order given; an
    /// element matches a member if it equals it or if the object it wraps
    /// equals it. The first matching working set wins.
    pub fn resolve_parent<T, W, S>(&self, item: Option<&T>, source: &S) -> Option<W>
    where
        T: Adaptable,
        W: WorkingSet<T>,
        S: WorkingSetSource<W> + ?Sized,
    {
        if self.mode() != GroupingMode::Grouped {
            return None;
        }
        let item = item?;
        let actual = item.actual_object();

        // Linear scan: working sets are few and edited elsewhere, so there is
        // no index to keep in sync.
        source.working_sets().into_iter().find(|set| {
            set.elements()
                .iter()
                .any(|member| member == item || actual == Some(member))
        })
    }
}

impl Drop for GroupingModeTracker {
    fn drop(&mut self) {
        self.dispose();
    }
}

static_assertions::assert_impl_all!(GroupingModeTracker: Send, Sync);
