//! Symbol Visibility - zoom-dependent visibility for map graphic overlays
//!
//! Each registered graphic carries a min/max zoom-scale band, and its
//! visibility is toggled automatically as the host map's scale changes.
//!
//! - [`filter`]: visibility filters and scale comparison rules
//! - [`graphic`]: graphic identities and the controller trait
//! - [`map_view`]: the host map view interface and an in-process implementation
//! - [`controller`]: the registry worker and its handle
//! - [`logging`]: optional tracing subscriber setup

pub mod controller;
pub mod filter;
pub mod graphic;
pub mod logging;
pub mod map_view;

pub use controller::{
    ControllerError, ControllerStatus, VisibilityControllerConfig, VisibilityFilterController,
    VisibilityWorker,
};
pub use filter::{FilterError, VisibilityFilter, VisibilityRule};
pub use graphic::{GraphicController, GraphicId, SymbolGraphic};
pub use map_view::{MapView, ScaleCallback, ScaleObservation, ScaleSignal};
