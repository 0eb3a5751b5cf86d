//! Graphic controllers whose visibility is driven by zoom filters.
//!
//! The visibility controller never owns graphics. It keeps a `Weak`
//! reference and a [`GraphicId`] per registration, so a graphic released by
//! its owner simply stops being updated.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Source of unique graphic identities for this process.
static NEXT_GRAPHIC_ID: AtomicU64 = AtomicU64::new(1);

/// Tag bit separating host-assigned ids from allocated ones.
const HOST_ID_BIT: u64 = 1 << 63;

/// Stable identity of a graphic controller, used as the registry key.
///
/// Allocated ids ([`next`](Self::next)) and host-assigned ids
/// ([`from_raw`](Self::from_raw)) live in disjoint ranges, so mixing both in
/// one controller never merges two registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphicId(u64);

impl GraphicId {
    /// Allocate a fresh identity, unique for the lifetime of the process.
    pub fn next() -> Self {
        Self(NEXT_GRAPHIC_ID.fetch_add(1, Ordering::Relaxed) & !HOST_ID_BIT)
    }

    /// Wrap an identity assigned by the host.
    ///
    /// Hosts that mint their own ids are responsible for keeping them unique
    /// among themselves. Only the low 63 bits of `raw` are significant.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw | HOST_ID_BIT)
    }

    /// Whether this id was assigned by the host.
    pub fn is_host_assigned(self) -> bool {
        self.0 & HOST_ID_BIT != 0
    }

    /// The numeric value, without the host tag.
    pub fn as_u64(self) -> u64 {
        self.0 & !HOST_ID_BIT
    }
}

impl fmt::Display for GraphicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_host_assigned() {
            write!(f, "host-graphic#{}", self.as_u64())
        } else {
            write!(f, "graphic#{}", self.0)
        }
    }
}

/// An object owning a map overlay with a toggleable visibility flag.
///
/// Implementations must be `Send + Sync`: visibility is written from the
/// controller's worker task.
pub trait GraphicController: Send + Sync {
    /// Identity used to key this graphic in the registry.
    fn id(&self) -> GraphicId;

    /// Current visibility flag.
    fn is_visible(&self) -> bool;

    /// Show or hide the graphic.
    fn set_visible(&self, visible: bool);
}

/// A minimal graphic controller backed by an atomic visibility flag.
///
/// Useful for hosts that only need the flag mirrored into their own
/// rendering layer, and for tests.
#[derive(Debug)]
pub struct SymbolGraphic {
    id: GraphicId,
    visible: AtomicBool,
}

impl SymbolGraphic {
    /// Create a graphic with a fresh identity.
    pub fn new(visible: bool) -> Self {
        Self::with_id(GraphicId::next(), visible)
    }

    /// Create a graphic with a host-assigned identity.
    pub fn with_id(id: GraphicId, visible: bool) -> Self {
        Self {
            id,
            visible: AtomicBool::new(visible),
        }
    }
}

impl GraphicController for SymbolGraphic {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }
}
