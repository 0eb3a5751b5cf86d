//! The visibility worker: sole owner of the registry.

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::command::Command;
use super::config::VisibilityControllerConfig;
use super::registry::{Registry, RegistryEntry};
use super::subscription::{SubscriptionId, SubscriptionSlot};
use super::ControllerStatus;
use crate::filter::VisibilityFilter;
use crate::graphic::{GraphicController, GraphicId};
use crate::map_view::{MapView, ScaleCallback};

/// Long-running task that applies controller commands in submission order.
///
/// Created together with its handle by
/// [`VisibilityFilterController::new`](super::VisibilityFilterController::new)
/// and driven with [`run`](Self::run).
pub struct VisibilityWorker {
    config: VisibilityControllerConfig,

    /// Host map view, held weakly.
    map_view: Weak<dyn MapView>,

    /// Last observed map scale. Only written by this worker.
    map_scale: f64,

    registry: Registry,

    /// Shared with the handle so `clear()` can detach synchronously.
    subscription: Arc<SubscriptionSlot>,
    next_subscription: SubscriptionId,

    /// Weak so installed callbacks never keep the queue open.
    command_tx: mpsc::WeakUnboundedSender<Command>,
    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl VisibilityWorker {
    pub(crate) fn new(
        config: VisibilityControllerConfig,
        map_view: Weak<dyn MapView>,
        map_scale: f64,
        subscription: Arc<SubscriptionSlot>,
        command_tx: mpsc::WeakUnboundedSender<Command>,
        command_rx: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            config,
            map_view,
            map_scale,
            registry: Registry::default(),
            subscription,
            next_subscription: 0,
            command_tx,
            command_rx,
        }
    }

    /// Runs the worker until shutdown is signalled or every controller
    /// handle has been dropped and the queue drained.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            scale = self.map_scale,
            rule = ?self.config.rule,
            "Visibility worker starting"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Visibility worker shutting down");
                    break;
                }

                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        debug!("All controller handles dropped");
                        break;
                    }
                }
            }
        }

        self.subscription.detach();
        info!(registered = self.registry.len(), "Visibility worker stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Register {
                id,
                graphic,
                filter,
                initial_visibility,
            } => self.register(id, graphic, filter, initial_visibility),
            Command::Unregister { id } => self.unregister(id),
            Command::Clear => self.clear(),
            Command::ScaleChanged {
                subscription,
                scale,
            } => {
                if self.subscription.is_current(subscription) {
                    self.recompute(scale);
                } else {
                    trace!(
                        subscription,
                        scale,
                        "Dropping notification from detached subscription"
                    );
                }
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn register(
        &mut self,
        id: GraphicId,
        graphic: Weak<dyn GraphicController>,
        filter: VisibilityFilter,
        initial_visibility: bool,
    ) {
        // While unsubscribed the cached scale may be stale.
        if !self.subscription.is_active() {
            self.refresh_scale();
        }

        if let Some(entry) = self.registry.get_mut(id) {
            entry.initial_visibility = initial_visibility;
            entry.graphic = graphic.clone();
            if entry.filter == filter {
                let applied = entry.apply(self.config.rule, self.map_scale);
                debug!(graphic = %id, %filter, ?applied, "Refreshed registration");
                return;
            }
        }

        let entry = RegistryEntry::new(graphic, filter, initial_visibility);
        let applied = entry.apply(self.config.rule, self.map_scale);
        self.registry.insert(id, entry);
        debug!(
            graphic = %id,
            %filter,
            ?applied,
            registered = self.registry.len(),
            "Registered graphic"
        );

        self.update_subscription();
    }

    fn unregister(&mut self, id: GraphicId) {
        let Some(entry) = self.registry.remove(id) else {
            trace!(graphic = %id, "Unregister for unknown graphic");
            return;
        };

        if !entry.restore() {
            debug!(graphic = %id, "Graphic released before unregister");
        }
        debug!(
            graphic = %id,
            registered = self.registry.len(),
            "Unregistered graphic"
        );

        self.update_subscription();
    }

    fn clear(&mut self) {
        self.subscription.resume();

        let mut restored = 0usize;
        for (_, entry) in self.registry.drain() {
            if entry.restore() {
                restored += 1;
            }
        }
        debug!(restored, "Cleared registry");

        self.update_subscription();
    }

    fn recompute(&mut self, scale: f64) {
        self.map_scale = scale;

        if !scale.is_finite() {
            trace!(scale, "Map scale unavailable, keeping visibility");
            return;
        }

        let released = self.registry.apply_all(self.config.rule, scale);
        trace!(
            scale,
            registered = self.registry.len(),
            "Recomputed visibility"
        );

        if self.config.prune_released && !released.is_empty() {
            for id in &released {
                self.registry.remove(*id);
            }
            debug!(
                pruned = released.len(),
                registered = self.registry.len(),
                "Pruned released graphics"
            );
            self.update_subscription();
        }
    }

    fn refresh_scale(&mut self) {
        if let Some(view) = self.map_view.upgrade() {
            self.map_scale = view.map_scale();
        }
    }

    /// Subscribed iff the registry is non-empty.
    fn update_subscription(&mut self) {
        let active = self.subscription.is_active();

        if !self.registry.is_empty() && !active {
            self.subscribe();
        } else if self.registry.is_empty() && active {
            if let Some(id) = self.subscription.detach() {
                debug!(subscription = id, "Unsubscribed from map scale changes");
            }
        }
    }

    fn subscribe(&mut self) {
        if self.subscription.is_suspended() {
            trace!("Clear pending, not subscribing");
            return;
        }
        let Some(view) = self.map_view.upgrade() else {
            warn!("Map view released, scale changes will not be observed");
            return;
        };

        self.next_subscription += 1;
        let subscription = self.next_subscription;
        let command_tx = self.command_tx.clone();

        let callback: ScaleCallback = Arc::new(move |scale: f64| {
            if let Some(tx) = command_tx.upgrade() {
                let _ = tx.send(Command::ScaleChanged {
                    subscription,
                    scale,
                });
            }
        });

        let observation = view.observe_scale(callback);
        if self.subscription.install(subscription, observation) {
            debug!(subscription, "Subscribed to map scale changes");
        }
    }

    fn status(&self) -> ControllerStatus {
        ControllerStatus {
            registered: self.registry.len(),
            subscribed: self.subscription.is_active(),
            map_scale: self.map_scale,
            rule: self.config.rule,
        }
    }
}
