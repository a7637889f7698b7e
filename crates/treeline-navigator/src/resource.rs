//! Navigator elements: workspace resources and the tree nodes wrapping them.
//!
//! The tree shows its own node types for some resources (a source folder, a
//! module file). Those nodes wrap the real workspace resource, and anything
//! that compares against workspace membership needs to look through the
//! wrapper. [`Adaptable`] is that capability.

use std::fmt;
use std::path::{Path, PathBuf};

/// Ability of an element to expose the object it wraps.
pub trait Adaptable: PartialEq {
    /// The wrapped object, if this element is a wrapper.
    ///
    /// Only one level is unwrapped; the returned object is compared as-is.
    fn actual_object(&self) -> Option<&Self> {
        None
    }
}

/// The kind of a workspace resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A top-level project.
    Project,
    /// A folder inside a project.
    Folder,
    /// A file inside a project.
    File,
}

/// A workspace resource, identified by kind and workspace-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    kind: ResourceKind,
    path: PathBuf,
}

impl Resource {
    /// Create a resource handle.
    pub fn new(kind: ResourceKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// A project handle.
    pub fn project(path: impl Into<PathBuf>) -> Self {
        Self::new(ResourceKind::Project, path)
    }

    /// A folder handle.
    pub fn folder(path: impl Into<PathBuf>) -> Self {
        Self::new(ResourceKind::Folder, path)
    }

    /// A file handle.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(ResourceKind::File, path)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A tree node that stands in for another element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrappedResource {
    label: String,
    actual: Box<Element>,
}

impl WrappedResource {
    /// Wrap `actual` under a display label.
    pub fn new(label: impl Into<String>, actual: impl Into<Element>) -> Self {
        Self {
            label: label.into(),
            actual: Box::new(actual.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The element this node stands in for.
    pub fn actual(&self) -> &Element {
        &self.actual
    }
}

/// An element of the navigator tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// A plain workspace resource.
    Resource(Resource),
    /// A tree node wrapping another element.
    Wrapped(WrappedResource),
}

impl Element {
    /// Wrap this element under a display label.
    pub fn wrapped(self, label: impl Into<String>) -> Self {
        Self::Wrapped(WrappedResource::new(label, self))
    }

    /// Whether this element wraps another one.
    pub fn is_wrapper(&self) -> bool {
        matches!(self, Self::Wrapped(_))
    }
}

impl From<Resource> for Element {
    fn from(resource: Resource) -> Self {
        Self::Resource(resource)
    }
}

impl From<WrappedResource> for Element {
    fn from(wrapped: WrappedResource) -> Self {
        Self::Wrapped(wrapped)
    }
}

impl Adaptable for Element {
    fn actual_object(&self) -> Option<&Self> {
        match self {
            Self::Resource(_) => None,
            Self::Wrapped(wrapped) => Some(wrapped.actual()),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(resource) => write!(f, "{}", resource.path().display()),
            Self::Wrapped(wrapped) => write!(f, "{} ({})", wrapped.label(), wrapped.actual()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_resource_is_not_a_wrapper() {
        let element = Element::from(Resource::project("app"));
        assert!(!element.is_wrapper());
        assert_eq!(element.actual_object(), None);
    }

    #[test]
    fn test_wrapper_exposes_one_level() {
        let file = Element::from(Resource::file("app/src/main.py"));
        let module = file.clone().wrapped("main");
        let nested = module.clone().wrapped("outer");

        assert!(module.is_wrapper());
        assert_eq!(module.actual_object(), Some(&file));
        assert_eq!(nested.actual_object(), Some(&module));
        assert_ne!(module, file);
    }

    #[test]
    fn test_display() {
        let folder = Element::from(Resource::folder("app/src")).wrapped("src");
        assert_eq!(folder.to_string(), "src (app/src)");
    }
}
