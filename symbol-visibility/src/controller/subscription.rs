//! The scale-change subscription slot.
//!
//! Shared between the controller handle and the worker: the worker installs
//! and removes observations as the registry fills and empties, while
//! `clear()` detaches synchronously from the caller's thread. Each
//! installation gets a new id so notifications from a detached observation
//! can be recognised and dropped.
//!
//! A `clear()` also suspends the slot until the worker has processed the
//! matching clear command. Registrations queued ahead of the clear therefore
//! cannot re-subscribe after `clear()` has returned.

use parking_lot::Mutex;

use crate::map_view::ScaleObservation;

/// Identifier of one installed scale observation.
pub(crate) type SubscriptionId = u64;

#[derive(Debug)]
struct ActiveSubscription {
    id: SubscriptionId,
    observation: ScaleObservation,
}

#[derive(Debug, Default)]
struct SlotState {
    active: Option<ActiveSubscription>,
    /// Clears requested by the handle but not yet run by the worker.
    pending_clears: usize,
}

/// Holds at most one active scale observation.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionSlot {
    state: Mutex<SlotState>,
}

impl SubscriptionSlot {
    pub fn is_active(&self) -> bool {
        self.state.lock().active.is_some()
    }

    /// Whether `id` is the currently installed observation.
    pub fn is_current(&self, id: SubscriptionId) -> bool {
        self.state
            .lock()
            .active
            .as_ref()
            .is_some_and(|sub| sub.id == id)
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().pending_clears > 0
    }

    /// Install an observation, invalidating any previous one.
    ///
    /// Refused while a clear is pending; the observation is then dropped.
    pub fn install(&self, id: SubscriptionId, observation: ScaleObservation) -> bool {
        let mut state = self.state.lock();
        if state.pending_clears > 0 {
            drop(state);
            drop(observation);
            return false;
        }
        let previous = state.active.replace(ActiveSubscription { id, observation });
        drop(state);
        drop(previous);
        true
    }

    /// Invalidate and remove the active observation.
    ///
    /// Returns the id that was detached, if any.
    pub fn detach(&self) -> Option<SubscriptionId> {
        let taken = self.state.lock().active.take();
        taken.map(Self::invalidate)
    }

    /// Detach and hold the slot closed until [`resume`](Self::resume).
    pub fn suspend(&self) -> Option<SubscriptionId> {
        let taken = {
            let mut state = self.state.lock();
            state.pending_clears += 1;
            state.active.take()
        };
        taken.map(Self::invalidate)
    }

    /// Release one suspension taken by [`suspend`](Self::suspend).
    pub fn resume(&self) {
        let mut state = self.state.lock();
        state.pending_clears = state.pending_clears.saturating_sub(1);
    }

    // Runs outside the lock: the view's detach hook may call back in.
    fn invalidate(mut sub: ActiveSubscription) -> SubscriptionId {
        sub.observation.invalidate();
        sub.id
    }
}
