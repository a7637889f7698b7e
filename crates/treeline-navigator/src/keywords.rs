//! Keyword providers for code scanners.
//!
//! Syntax scanners ask a provider for the keywords to highlight and listen
//! for changes so they can rebuild their rules.

use parking_lot::RwLock;
use treeline_core::Signal;

/// A source of highlight keywords that can change at runtime.
pub trait CodeScannerKeywords: Send + Sync {
    /// The current keywords.
    fn keywords(&self) -> Vec<String>;

    /// Signal emitted after the keywords change.
    fn on_change(&self) -> &Signal<()>;
}

/// A mutable keyword list.
pub struct KeywordSet {
    keywords: RwLock<Vec<String>>,
    changed: Signal<()>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: RwLock::new(keywords.into_iter().map(Into::into).collect()),
            changed: Signal::new(),
        }
    }

    /// Replace the keyword list.
    ///
    /// Emits [`on_change`](CodeScannerKeywords::on_change) and returns `true`
    /// if the list differs from the current one.
    pub fn set_keywords<I, S>(&self, keywords: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        {
            let mut current = self.keywords.write();
            if *current == keywords {
                return false;
            }
            *current = keywords;
        }
        self.changed.emit(());
        true
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.read().iter().any(|k| k == keyword)
    }
}

impl CodeScannerKeywords for KeywordSet {
    fn keywords(&self) -> Vec<String> {
        self.keywords.read().clone()
    }

    fn on_change(&self) -> &Signal<()> {
        &self.changed
    }
}

static_assertions::assert_impl_all!(KeywordSet: Send, Sync);
