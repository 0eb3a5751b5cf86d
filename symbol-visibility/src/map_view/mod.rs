//! Host map view interface.
//!
//! The visibility controller needs two things from the map view: the current
//! scale, and a way to be told when it changes. [`MapView`] captures exactly
//! that. Observation is handle-based: [`MapView::observe_scale`] returns a
//! [`ScaleObservation`] guard, and the callback stays installed only while
//! the guard is alive and not invalidated.
//!
//! Views are expected to hold callbacks weakly (see [`ScaleSignal`]) so that
//! dropping the guard is enough to stop notifications.

mod signal;

pub use signal::ScaleSignal;

use std::fmt;
use std::sync::Arc;

/// Callback invoked with the new scale whenever the map scale changes.
///
/// Runs on whatever thread the view delivers notifications on, so it must
/// not block.
pub type ScaleCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// A map view whose scale can be read and observed.
pub trait MapView: Send + Sync {
    /// Current map scale. May be NaN while the view has no scale yet.
    fn map_scale(&self) -> f64;

    /// Install `callback` for scale changes.
    ///
    /// The returned guard keeps the callback alive; dropping or invalidating
    /// it must stop further invocations.
    fn observe_scale(&self, callback: ScaleCallback) -> ScaleObservation;
}

/// Guard for an installed scale-change callback.
///
/// Holds the only strong reference to the callback. Invalidation (explicit
/// or on drop) releases it and runs the view's optional detach hook.
pub struct ScaleObservation {
    callback: Option<ScaleCallback>,
    on_invalidate: Option<Box<dyn FnOnce() + Send>>,
}

impl ScaleObservation {
    /// Wrap an installed callback.
    pub fn new(callback: ScaleCallback) -> Self {
        Self {
            callback: Some(callback),
            on_invalidate: None,
        }
    }

    /// Attach a hook the view runs when the observation is invalidated,
    /// e.g. to unregister from a native notification center.
    pub fn on_invalidate(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_invalidate = Some(Box::new(hook));
        self
    }

    /// Whether the callback is still installed.
    pub fn is_valid(&self) -> bool {
        self.callback.is_some()
    }

    /// Remove the callback. Idempotent.
    pub fn invalidate(&mut self) {
        self.callback = None;
        if let Some(hook) = self.on_invalidate.take() {
            hook();
        }
    }
}

impl Drop for ScaleObservation {
    fn drop(&mut self) {
        self.invalidate();
    }
}

impl fmt::Debug for ScaleObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleObservation")
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_invalidate_releases_callback() {
        let callback: ScaleCallback = Arc::new(|_: f64| {});
        let weak = Arc::downgrade(&callback);

        let mut observation = ScaleObservation::new(callback);
        assert!(observation.is_valid());
        assert!(weak.upgrade().is_some());

        observation.invalidate();
        assert!(!observation.is_valid());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_hook_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);

        let mut observation =
            ScaleObservation::new(Arc::new(|_: f64| {})).on_invalidate(move || {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            });

        observation.invalidate();
        observation.invalidate();
        drop(observation);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_runs_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);

        let observation =
            ScaleObservation::new(Arc::new(|_: f64| {})).on_invalidate(move || {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            });
        drop(observation);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
