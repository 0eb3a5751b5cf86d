//! Zoom-dependent visibility controller.
//!
//! The [`VisibilityFilterController`] toggles graphic visibility as the host
//! map's scale changes:
//! - Graphics are registered with a [`VisibilityFilter`] and the visibility
//!   they should carry inside its band
//! - Visibility is applied immediately on registration and again on every
//!   scale change
//! - Unregistering (or clearing) restores each graphic's initial visibility
//! - The map view is observed only while at least one graphic is registered
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                   VisibilityFilterController                     │
//! │                                                                  │
//! │  register / unregister / clear ──┐                               │
//! │                                  ▼                               │
//! │  MapView ── scale callback ──► command queue (FIFO, unbounded)   │
//! │     ▲                            │                               │
//! │     │                            ▼                               │
//! │     │                  ┌──────────────────┐                      │
//! │     └── observe ◄──────│ VisibilityWorker │──► set_visible(..)   │
//! │         invalidate     │  registry, scale │                      │
//! │                        └──────────────────┘                      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All registry state lives on the worker. Handle methods only enqueue
//! commands; [`flush`](VisibilityFilterController::flush) waits for them.
//!
//! # Example
//!
//! ```ignore
//! use symbol_visibility::controller::{VisibilityControllerConfig, VisibilityFilterController};
//!
//! let view = Arc::new(ScaleSignal::new(20_000.0));
//! let (controller, worker) = VisibilityFilterController::new(&view, VisibilityControllerConfig::default());
//! tokio::spawn(worker.run(CancellationToken::new()));
//!
//! let airports = Arc::new(SymbolGraphic::new(true));
//! controller.register(&airports, VisibilityFilter::new(50_000.0, 1_000.0)?, true)?;
//! controller.flush().await?;
//! ```

mod command;
mod config;
mod error;
mod registry;
mod subscription;
mod worker;

pub use config::VisibilityControllerConfig;
pub use error::ControllerError;
pub use worker::VisibilityWorker;

use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::filter::{VisibilityFilter, VisibilityRule};
use crate::graphic::GraphicController;
use crate::map_view::MapView;
use command::Command;
use subscription::SubscriptionSlot;

/// Point-in-time view of the worker's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerStatus {
    /// Number of registered graphics.
    pub registered: usize,

    /// Whether the map scale is currently being observed.
    pub subscribed: bool,

    /// Last observed map scale (NaN if unknown).
    pub map_scale: f64,

    /// Active comparison rule.
    pub rule: VisibilityRule,
}

/// Handle to the visibility filter controller.
///
/// Not `Clone`: dropping the handle clears the controller, restoring every
/// registered graphic. Share it behind an `Arc` if several owners need it.
#[derive(Debug)]
pub struct VisibilityFilterController {
    command_tx: mpsc::UnboundedSender<Command>,
    subscription: Arc<SubscriptionSlot>,
}

impl VisibilityFilterController {
    /// Creates a controller for `map_view`.
    ///
    /// Returns the handle and the worker that must be driven with
    /// [`VisibilityWorker::run`]. The map view is held weakly; its current
    /// scale is captured as the initial scale.
    pub fn new<V>(
        map_view: &Arc<V>,
        config: VisibilityControllerConfig,
    ) -> (Self, VisibilityWorker)
    where
        V: MapView + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let subscription = Arc::new(SubscriptionSlot::default());
        let view = Arc::downgrade(map_view);
        let view: Weak<dyn MapView> = view;

        let worker = VisibilityWorker::new(
            config,
            view,
            map_view.map_scale(),
            Arc::clone(&subscription),
            command_tx.downgrade(),
            command_rx,
        );

        let controller = Self {
            command_tx,
            subscription,
        };

        (controller, worker)
    }

    /// Creates a controller and spawns its worker on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<V>(
        map_view: &Arc<V>,
        config: VisibilityControllerConfig,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>)
    where
        V: MapView + 'static,
    {
        let (controller, worker) = Self::new(map_view, config);
        let handle = tokio::spawn(worker.run(shutdown));
        (controller, handle)
    }

    /// Registers `graphic`, or refreshes an existing registration.
    ///
    /// The graphic's visibility is set for the current scale as soon as the
    /// worker reaches this command. Registering the same graphic again with an
    /// equal filter only updates its initial visibility and re-applies it.
    pub fn register<G>(
        &self,
        graphic: &Arc<G>,
        filter: VisibilityFilter,
        initial_visibility: bool,
    ) -> Result<(), ControllerError>
    where
        G: GraphicController + 'static,
    {
        let weak = Arc::downgrade(graphic);
        let weak: Weak<dyn GraphicController> = weak;
        self.send(Command::Register {
            id: graphic.id(),
            graphic: weak,
            filter,
            initial_visibility,
        })
    }

    /// Registers `graphic` with a filter given as untyped host data
    /// (`{"minZoom": .., "maxZoom": ..}`).
    pub fn register_value<G>(
        &self,
        graphic: &Arc<G>,
        filter: &Value,
        initial_visibility: bool,
    ) -> Result<(), ControllerError>
    where
        G: GraphicController + 'static,
    {
        let filter = VisibilityFilter::from_value(filter)?;
        self.register(graphic, filter, initial_visibility)
    }

    /// Unregisters `graphic` and restores its initial visibility.
    ///
    /// Unknown graphics are ignored.
    pub fn unregister<G>(&self, graphic: &G) -> Result<(), ControllerError>
    where
        G: GraphicController + ?Sized,
    {
        self.send(Command::Unregister { id: graphic.id() })
    }

    /// Stops observing the map scale immediately, then restores every
    /// registered graphic and empties the registry once queued work is done.
    ///
    /// Safe to call repeatedly.
    pub fn clear(&self) {
        if let Some(id) = self.subscription.suspend() {
            debug!(subscription = id, "Detached scale subscription on clear");
        }
        if self.command_tx.send(Command::Clear).is_err() {
            debug!("Visibility worker already stopped, nothing to clear");
        }
    }

    /// Waits until every command submitted before this call has been applied.
    pub async fn flush(&self) -> Result<(), ControllerError> {
        self.status().await.map(|_| ())
    }

    /// Returns the worker state after all previously submitted commands.
    pub async fn status(&self) -> Result<ControllerStatus, ControllerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Status(reply_tx))?;
        reply_rx.await.map_err(|_| ControllerError::WorkerStopped)
    }

    fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.command_tx
            .send(command)
            .map_err(|_| ControllerError::WorkerStopped)
    }
}

impl Drop for VisibilityFilterController {
    fn drop(&mut self) {
        self.clear();
    }
}
