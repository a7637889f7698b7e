//! Working sets: named, externally owned groups of navigator elements.
//!
//! The navigator never edits working sets. It enumerates them through a
//! [`WorkingSetSource`] each time it needs them and inspects their
//! membership.

use std::sync::Arc;

use parking_lot::RwLock;

/// A named collection of element handles.
pub trait WorkingSet<T> {
    /// The working set's display name.
    fn name(&self) -> &str;

    /// The members of this working set. May be empty.
    fn elements(&self) -> &[T];
}

impl<T, W> WorkingSet<T> for Arc<W>
where
    W: WorkingSet<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn elements(&self) -> &[T] {
        (**self).elements()
    }
}

/// Enumerates the working sets currently defined.
///
/// Called once per parent-resolution query; implementations should return a
/// consistent snapshot for that call.
pub trait WorkingSetSource<W> {
    fn working_sets(&self) -> Vec<W>;
}

impl<W, F> WorkingSetSource<W> for F
where
    F: Fn() -> Vec<W>,
{
    fn working_sets(&self) -> Vec<W> {
        self()
    }
}

/// A plain working set value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedWorkingSet<T> {
    name: String,
    elements: Vec<T>,
}

impl<T> NamedWorkingSet<T> {
    /// Create a working set with the given members.
    pub fn new(name: impl Into<String>, elements: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: name.into(),
            elements: elements.into_iter().collect(),
        }
    }

    /// Create an empty working set.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

impl<T> WorkingSet<T> for NamedWorkingSet<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn elements(&self) -> &[T] {
        &self.elements
    }
}

/// A thread-safe registry of working sets, in insertion order.
///
/// Snapshots handed out by [`WorkingSetSource::working_sets`] are shared
/// `Arc`s; replacing a working set never mutates a snapshot already taken.
pub struct WorkingSetManager<T> {
    sets: RwLock<Vec<Arc<NamedWorkingSet<T>>>>,
}

impl<T> Default for WorkingSetManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkingSetManager<T> {
    pub fn new() -> Self {
        Self {
            sets: RwLock::new(Vec::new()),
        }
    }

    /// Add a working set, replacing any existing set with the same name in
    /// place.
    pub fn add(&self, set: NamedWorkingSet<T>) -> Arc<NamedWorkingSet<T>> {
        let set = Arc::new(set);
        let mut sets = self.sets.write();
        match sets.iter_mut().find(|existing| existing.name() == set.name()) {
            Some(existing) => *existing = set.clone(),
            None => sets.push(set.clone()),
        }
        set
    }

    /// Remove the working set with the given name.
    pub fn remove(&self, name: &str) -> Option<Arc<NamedWorkingSet<T>>> {
        let mut sets = self.sets.write();
        let pos = sets.iter().position(|set| set.name() == name)?;
        Some(sets.remove(pos))
    }

    /// Look up a working set by name.
    pub fn get(&self, name: &str) -> Option<Arc<NamedWorkingSet<T>>> {
        self.sets.read().iter().find(|set| set.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

impl<T> WorkingSetSource<Arc<NamedWorkingSet<T>>> for WorkingSetManager<T> {
    fn working_sets(&self) -> Vec<Arc<NamedWorkingSet<T>>> {
        self.sets.read().clone()
    }
}
