//! Commands processed by the visibility worker.

use std::sync::Weak;

use tokio::sync::oneshot;

use super::subscription::SubscriptionId;
use super::ControllerStatus;
use crate::filter::VisibilityFilter;
use crate::graphic::{GraphicController, GraphicId};

/// Work submitted to the worker queue, executed in FIFO order.
#[derive(Debug)]
pub(crate) enum Command {
    /// Register or refresh a graphic.
    Register {
        id: GraphicId,
        graphic: Weak<dyn GraphicController>,
        filter: VisibilityFilter,
        initial_visibility: bool,
    },

    /// Remove a graphic and restore its initial visibility.
    Unregister { id: GraphicId },

    /// Restore every graphic and empty the registry.
    Clear,

    /// The map scale changed while `subscription` was installed.
    ScaleChanged {
        subscription: SubscriptionId,
        scale: f64,
    },

    /// Report state once everything queued before this has run.
    Status(oneshot::Sender<ControllerStatus>),
}
