//! Process-wide registry of observed model context windows.
//!
//! A model's context window is sometimes only discoverable from a live
//! backend response. Once learned, it is recorded here so any other part of
//! the process (budgeting, truncation) can reuse it without re-deriving it.
//!
//! [`ContextWindowRegistry`] is a cheap, cloneable handle. Construct one at
//! process start and hand clones to whatever needs it; all clones share the
//! same storage for the lifetime of the process.
//!
//! Both operations are total. Invalid input is dropped silently:
//!
//! - `record` ignores an empty model id, and any window that is not finite
//!   or is `<= 0`. Accepted windows are floored to an integer.
//! - `lookup` returns `None` for an empty id or an unseen model.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::normalize_model_id;

/// Shared, last-write-wins map from normalized model id to context window
/// size in tokens.
///
/// # Example
///
/// ```
/// use ctxwin::ContextWindowRegistry;
///
/// let registry = ContextWindowRegistry::new();
/// registry.record("GPT-4 ", 8000.0);
/// assert_eq!(registry.lookup("gpt-4"), Some(8000));
/// assert_eq!(registry.lookup("never-seen"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ContextWindowRegistry(Arc<Mutex<HashMap<String, usize>>>);

impl ContextWindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed context window for a model.
    ///
    /// No-op when `model_id` is empty (after trimming) or when
    /// `context_window` is non-finite or not strictly positive. Otherwise
    /// stores `floor(context_window)`, replacing any prior value for the same
    /// normalized key.
    pub fn record(&self, model_id: &str, context_window: f64) {
        if !context_window.is_finite() || context_window <= 0.0 {
            trace!("context window ignored: model={model_id:?}, value={context_window}");
            return;
        }
        let key = normalize_model_id(model_id);
        if key.is_empty() {
            trace!("context window ignored: empty model id");
            return;
        }
        // Float-to-int `as` saturates, so absurdly large values clamp to usize::MAX.
        let tokens = context_window.floor() as usize;
        let previous = self.entries().insert(key.clone(), tokens);
        debug!(
            "context window recorded: model={key}, tokens={tokens}, previous={:?}",
            previous
        );
    }

    /// Integer form of [`record`](Self::record). Zero is a no-op.
    pub fn record_tokens(&self, model_id: &str, tokens: u64) {
        self.record(model_id, tokens as f64);
    }

    /// Last recorded context window for a model, if any.
    pub fn lookup(&self, model_id: &str) -> Option<usize> {
        if model_id.is_empty() {
            return None;
        }
        let key = normalize_model_id(model_id);
        self.entries().get(&key).copied()
    }

    /// Number of distinct normalized model ids recorded.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// All entries, sorted by normalized model id.
    pub fn snapshot(&self) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self
            .entries()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    // A writer that panicked mid-insert cannot leave the map half-updated,
    // so a poisoned lock is safe to keep using.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}
