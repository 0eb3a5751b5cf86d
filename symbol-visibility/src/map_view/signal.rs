//! In-process map view with an observable scale.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use super::{MapView, ScaleCallback, ScaleObservation};

type WeakCallback = Weak<dyn Fn(f64) + Send + Sync>;

/// A [`MapView`] backed by a stored scale and a weak observer list.
///
/// Hosts that already track the map scale elsewhere push it in with
/// [`set_scale`](Self::set_scale); observers are notified on the calling
/// thread. Observers whose [`ScaleObservation`] was dropped are pruned
/// on the next notification or the next `observe_scale`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use symbol_visibility::map_view::{MapView, ScaleSignal};
///
/// let view = ScaleSignal::new(10_000.0);
/// let seen = Arc::new(AtomicU64::new(0));
/// let sink = Arc::clone(&seen);
///
/// let observation = view.observe_scale(Arc::new(move |scale: f64| {
///     sink.store(scale.to_bits(), Ordering::SeqCst);
/// }));
///
/// view.set_scale(5_000.0);
/// assert_eq!(f64::from_bits(seen.load(Ordering::SeqCst)), 5_000.0);
///
/// drop(observation);
/// assert_eq!(view.observer_count(), 0);
/// ```
#[derive(Debug)]
pub struct ScaleSignal {
    state: Mutex<SignalState>,
}

#[derive(Debug)]
struct SignalState {
    scale: f64,
    observers: Vec<WeakCallback>,
}

impl ScaleSignal {
    /// Create a view at the given scale.
    pub fn new(scale: f64) -> Self {
        Self {
            state: Mutex::new(SignalState {
                scale,
                observers: Vec::new(),
            }),
        }
    }

    /// Create a view that has no scale yet (NaN).
    pub fn unscaled() -> Self {
        Self::new(f64::NAN)
    }

    /// Update the scale and notify live observers.
    ///
    /// Setting the current value again is not a change and notifies nobody.
    /// Returns the number of observers notified.
    pub fn set_scale(&self, scale: f64) -> usize {
        let live: Vec<ScaleCallback> = {
            let mut state = self.state.lock();
            if state.scale == scale {
                return 0;
            }
            state.scale = scale;
            state.observers.retain(|weak| weak.strong_count() > 0);
            state.observers.iter().filter_map(Weak::upgrade).collect()
        };

        trace!(scale, observers = live.len(), "Map scale changed");

        // Callbacks run outside the lock so they may read the scale back.
        for callback in &live {
            callback(scale);
        }
        live.len()
    }

    /// Number of observers whose guard is still alive.
    pub fn observer_count(&self) -> usize {
        self.state
            .lock()
            .observers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl Default for ScaleSignal {
    fn default() -> Self {
        Self::unscaled()
    }
}

impl MapView for ScaleSignal {
    fn map_scale(&self) -> f64 {
        self.state.lock().scale
    }

    fn observe_scale(&self, callback: ScaleCallback) -> ScaleObservation {
        let mut state = self.state.lock();
        state.observers.retain(|weak| weak.strong_count() > 0);
        state.observers.push(Arc::downgrade(&callback));
        ScaleObservation::new(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(counter: &Arc<AtomicUsize>) -> ScaleCallback {
        let counter = Arc::clone(counter);
        Arc::new(move |_: f64| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_initial_scale() {
        let view = ScaleSignal::new(25_000.0);
        assert_eq!(view.map_scale(), 25_000.0);
    }

    #[test]
    fn test_unscaled_is_nan() {
        assert!(ScaleSignal::unscaled().map_scale().is_nan());
        assert!(ScaleSignal::default().map_scale().is_nan());
    }

    #[test]
    fn test_set_scale_notifies_observers() {
        let view = ScaleSignal::new(1.0);
        let counter = Arc::new(AtomicUsize::new(0));
        let _a = view.observe_scale(counting_callback(&counter));
        let _b = view.observe_scale(counting_callback(&counter));

        assert_eq!(view.set_scale(2.0), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(view.map_scale(), 2.0);
    }

    #[test]
    fn test_same_scale_is_not_a_change() {
        let view = ScaleSignal::new(1.0);
        let counter = Arc::new(AtomicUsize::new(0));
        let _observation = view.observe_scale(counting_callback(&counter));

        assert_eq!(view.set_scale(1.0), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalidated_observer_not_notified() {
        let view = ScaleSignal::new(1.0);
        let counter = Arc::new(AtomicUsize::new(0));
        let mut observation = view.observe_scale(counting_callback(&counter));

        observation.invalidate();
        view.set_scale(2.0);

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(view.observer_count(), 0);
    }

    #[test]
    fn test_observe_churn_does_not_accumulate_dead_observers() {
        let view = ScaleSignal::new(1.0);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..1_000 {
            let observation = view.observe_scale(counting_callback(&counter));
            drop(observation);
        }
        let _live = view.observe_scale(counting_callback(&counter));

        assert_eq!(view.state.lock().observers.len(), 1);
        assert_eq!(view.observer_count(), 1);
    }

    #[test]
    fn test_callback_can_read_scale_back() {
        let view = Arc::new(ScaleSignal::new(1.0));
        let seen = Arc::new(AtomicUsize::new(0));

        let reader = Arc::clone(&view);
        let sink = Arc::clone(&seen);
        let _observation = view.observe_scale(Arc::new(move |_: f64| {
            sink.store(reader.map_scale() as usize, Ordering::SeqCst);
        }));

        view.set_scale(7.0);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }
}
