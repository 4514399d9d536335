//! Collection view state
//!
//! Every grid (storefront, product admin, user admin) owns one
//! [`CollectionView`]. It tracks where the view is in its load cycle,
//! keeps the last good snapshot, and drops results that arrive after the
//! view was torn down or after a newer request superseded them.
//!
//! ```text
//! Idle ──refresh──▶ Loading ──▶ Loaded ──mutate──▶ Mutating ──▶ Loading ──▶ Loaded
//!                      │                               │
//!                      └──────────▶ Errored ◀──────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::result::{Error, Result};

/// Where a view is in its load cycle
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(Vec<T>),
    /// A create/update/delete is in flight
    Mutating,
    /// Last request failed; carries the message shown to the user
    Errored(String),
}

impl<T> ViewState<T> {
    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Errored(message) => Some(message),
            _ => None,
        }
    }
}

/// Teardown token shared between a view and whoever owns its lifetime
#[derive(Debug, Clone, Default)]
pub struct ViewHandle {
    torn_down: Arc<AtomicBool>,
}

impl ViewHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the view gone; in-flight results are discarded when they land
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

struct Inner<T> {
    state: ViewState<T>,
    snapshot: Option<Vec<T>>,
}

/// Load/mutate/refetch driver for one list view
pub struct CollectionView<T> {
    name: &'static str,
    inner: Mutex<Inner<T>>,
    generation: AtomicU64,
    handle: ViewHandle,
}

impl<T> std::fmt::Debug for CollectionView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionView")
            .field("name", &self.name)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("torn_down", &self.handle.is_torn_down())
            .finish()
    }
}

impl<T: Clone> CollectionView<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                state: ViewState::Idle,
                snapshot: None,
            }),
            generation: AtomicU64::new(0),
            handle: ViewHandle::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Token that tears this view down
    pub fn handle(&self) -> ViewHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> ViewState<T> {
        self.lock().state.clone()
    }

    /// Last successfully loaded rows, kept across failed mutations
    pub fn last_snapshot(&self) -> Option<Vec<T>> {
        self.lock().snapshot.clone()
    }

    /// Rows of the last snapshot, or nothing before the first load
    pub fn rows(&self) -> Vec<T> {
        self.last_snapshot().unwrap_or_default()
    }

    /// Load the collection
    pub fn refresh<F>(&self, fetch: F) -> Result<Vec<T>>
    where
        F: FnOnce() -> Result<Vec<T>>,
    {
        let generation = self.begin(ViewState::Loading)?;
        let result = fetch();
        self.ensure_current(generation)?;

        let mut inner = self.lock();
        match result {
            Ok(rows) => {
                tracing::debug!(view = self.name, rows = rows.len(), "view loaded");
                inner.snapshot = Some(rows.clone());
                inner.state = ViewState::Loaded(rows.clone());
                Ok(rows)
            }
            Err(e) => {
                inner.state = ViewState::Errored(user_message(&e));
                Err(e)
            }
        }
    }

    /// Run a mutation, then refetch the whole collection
    ///
    /// The refetch is only issued once the mutation has resolved. A failed
    /// mutation leaves the view errored and skips the refetch.
    pub fn mutate<R, M, F>(&self, op: M, fetch: F) -> Result<Vec<T>>
    where
        M: FnOnce() -> Result<R>,
        F: FnOnce() -> Result<Vec<T>>,
    {
        let generation = self.begin(ViewState::Mutating)?;
        let outcome = op();
        self.ensure_current(generation)?;

        if let Err(e) = outcome {
            self.lock().state = ViewState::Errored(user_message(&e));
            return Err(e);
        }
        self.refresh(fetch)
    }

    fn begin(&self, state: ViewState<T>) -> Result<u64> {
        if self.handle.is_torn_down() {
            return Err(Error::Cancelled);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().state = state;
        Ok(generation)
    }

    /// Discard results for a torn-down view or a superseded request
    fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.handle.is_torn_down() {
            tracing::debug!(view = self.name, "result discarded after teardown");
            return Err(Error::Cancelled);
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(view = self.name, generation, "stale result discarded");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Message shown in an errored view: the backend payload when there is one
fn user_message(e: &Error) -> String {
    e.backend_message()
        .map(str::to_string)
        .unwrap_or_else(|| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_goes_through_loading() {
        let view: CollectionView<u32> = CollectionView::new("numbers");
        assert_eq!(view.state(), ViewState::Idle);

        let rows = view
            .refresh(|| {
                assert_eq!(view.state(), ViewState::Loading);
                Ok(vec![1, 2])
            })
            .unwrap();

        assert_eq!(rows, vec![1, 2]);
        assert_eq!(view.state(), ViewState::Loaded(vec![1, 2]));
        assert_eq!(view.last_snapshot(), Some(vec![1, 2]));
    }

    #[test]
    fn test_mutation_resolves_before_refetch() {
        let view: CollectionView<u32> = CollectionView::new("numbers");
        view.refresh(|| Ok(vec![1])).unwrap();

        let order = Mutex::new(Vec::new());
        view.mutate(
            || {
                assert_eq!(view.state(), ViewState::Mutating);
                order.lock().unwrap().push("mutate");
                Ok(())
            },
            || {
                order.lock().unwrap().push("refetch");
                Ok(vec![1, 2])
            },
        )
        .unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["mutate", "refetch"]);
        assert_eq!(view.rows(), vec![1, 2]);
    }

    #[test]
    fn test_failed_mutation_keeps_snapshot_and_skips_refetch() {
        let view: CollectionView<u32> = CollectionView::new("numbers");
        view.refresh(|| Ok(vec![7])).unwrap();

        let err = view
            .mutate(
                || Err::<(), _>(Error::api(400, "Price must be positive")),
                || panic!("refetch after failed mutation"),
            )
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(view.state().error(), Some("Price must be positive"));
        assert_eq!(view.last_snapshot(), Some(vec![7]));
    }

    #[test]
    fn test_failed_refresh_is_errored() {
        let view: CollectionView<u32> = CollectionView::new("numbers");
        let err = view.refresh(|| Err(Error::NotAuthenticated)).unwrap_err();
        assert!(err.is_not_authenticated());
        assert!(view.state().error().unwrap().contains("Not authenticated"));
        assert!(view.last_snapshot().is_none());
    }

    #[test]
    fn test_result_after_teardown_is_discarded() {
        let view: CollectionView<u32> = CollectionView::new("numbers");
        let handle = view.handle();

        let err = view
            .refresh(|| {
                handle.teardown();
                Ok(vec![1, 2, 3])
            })
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(view.state(), ViewState::Loading);
        assert!(view.last_snapshot().is_none());

        // Nothing new starts on a dead view
        assert!(matches!(view.refresh(|| Ok(vec![])), Err(Error::Cancelled)));
    }

    #[test]
    fn test_superseded_refresh_is_discarded() {
        let view: CollectionView<u32> = CollectionView::new("numbers");

        let outer = view.refresh(|| {
            view.refresh(|| Ok(vec![2])).unwrap();
            Ok(vec![1])
        });

        assert!(matches!(outer, Err(Error::Cancelled)));
        assert_eq!(view.state(), ViewState::Loaded(vec![2]));
    }
}
