//! Registered graphics and their filters.
//!
//! Owned exclusively by the worker. Each entry carries the graphic's filter
//! and the visibility it should have when the filter admits the current
//! scale, so an entry can never exist without its initial visibility.

use std::collections::HashMap;
use std::sync::Weak;

use tracing::trace;

use crate::filter::{VisibilityFilter, VisibilityRule};
use crate::graphic::{GraphicController, GraphicId};

/// Outcome of applying a scale to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// Visibility was written.
    Set(bool),
    /// Scale carried no information; visibility left as is.
    Unchanged,
    /// The graphic has been released by its owner.
    Released,
}

/// One registered graphic.
#[derive(Debug, Clone)]
pub(crate) struct RegistryEntry {
    pub graphic: Weak<dyn GraphicController>,
    pub filter: VisibilityFilter,
    pub initial_visibility: bool,
}

impl RegistryEntry {
    pub fn new(
        graphic: Weak<dyn GraphicController>,
        filter: VisibilityFilter,
        initial_visibility: bool,
    ) -> Self {
        Self {
            graphic,
            filter,
            initial_visibility,
        }
    }

    /// Apply the visibility rule for `scale`.
    pub fn apply(&self, rule: VisibilityRule, scale: f64) -> Applied {
        let Some(visible) = rule.resolve(&self.filter, scale, self.initial_visibility) else {
            return Applied::Unchanged;
        };
        let Some(graphic) = self.graphic.upgrade() else {
            return Applied::Released;
        };
        graphic.set_visible(visible);
        Applied::Set(visible)
    }

    /// Put the graphic back to its initial visibility.
    ///
    /// Returns `false` if the graphic has been released.
    pub fn restore(&self) -> bool {
        match self.graphic.upgrade() {
            Some(graphic) => {
                graphic.set_visible(self.initial_visibility);
                true
            }
            None => false,
        }
    }
}

/// Graphic id → entry map.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: HashMap<GraphicId, RegistryEntry>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_mut(&mut self, id: GraphicId) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(&id)
    }

    pub fn insert(&mut self, id: GraphicId, entry: RegistryEntry) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: GraphicId) -> Option<RegistryEntry> {
        self.entries.remove(&id)
    }

    /// Apply `scale` to every entry, returning the ids whose graphic is gone.
    pub fn apply_all(&self, rule: VisibilityRule, scale: f64) -> Vec<GraphicId> {
        let mut released = Vec::new();
        for (id, entry) in &self.entries {
            match entry.apply(rule, scale) {
                Applied::Released => released.push(*id),
                Applied::Set(visible) => trace!(graphic = %id, visible, "Visibility applied"),
                Applied::Unchanged => {}
            }
        }
        released
    }

    /// Empty the registry, handing back every entry.
    pub fn drain(&mut self) -> impl Iterator<Item = (GraphicId, RegistryEntry)> + '_ {
        self.entries.drain()
    }
}
