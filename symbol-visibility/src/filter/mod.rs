//! Zoom-scale visibility filters.
//!
//! A [`VisibilityFilter`] is the min/max zoom-scale band attached to a
//! graphic. Filters arrive from the host bridge as untyped key-value data:
//!
//! ```json
//! { "minZoom": 50000.0, "maxZoom": 1000.0 }
//! ```
//!
//! Both fields are required, numeric, and finite. Whether a scale falls
//! inside the band is decided by a [`VisibilityRule`].
//!
//! # Example
//!
//! ```
//! use symbol_visibility::filter::{VisibilityFilter, VisibilityRule};
//!
//! let data = serde_json::json!({ "minZoom": 50000.0, "maxZoom": 1000.0 });
//! let filter = VisibilityFilter::from_value(&data).unwrap();
//!
//! assert!(VisibilityRule::ScaleDenominator.admits(&filter, 10_000.0));
//! ```

mod error;
mod rule;

pub use error::FilterError;
pub use rule::VisibilityRule;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration key for the lower scale bound.
pub const MIN_ZOOM_KEY: &str = "minZoom";

/// Configuration key for the upper scale bound.
pub const MAX_ZOOM_KEY: &str = "maxZoom";

/// A min/max zoom-scale band gating a graphic's visibility.
///
/// Compared by value. Both bounds are guaranteed finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilter", into = "RawFilter")]
pub struct VisibilityFilter {
    min_zoom: f64,
    max_zoom: f64,
}

impl VisibilityFilter {
    /// Create a filter from explicit bounds.
    ///
    /// The bounds are stored as given; no ordering is imposed, since the
    /// meaning of "min" depends on the [`VisibilityRule`] in use.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Result<Self, FilterError> {
        Ok(Self {
            min_zoom: require_finite(MIN_ZOOM_KEY, min_zoom)?,
            max_zoom: require_finite(MAX_ZOOM_KEY, max_zoom)?,
        })
    }

    /// Build a filter from an untyped configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if `value` is not an object, or if `minZoom`
    /// or `maxZoom` is missing, non-numeric, or not finite.
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let object = value
            .as_object()
            .ok_or_else(|| FilterError::NotAnObject(kind_of(value).to_string()))?;

        let min_zoom = read_number(object, MIN_ZOOM_KEY)?;
        let max_zoom = read_number(object, MAX_ZOOM_KEY)?;
        Self::new(min_zoom, max_zoom)
    }

    /// Lower scale bound (`minZoom`).
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Upper scale bound (`maxZoom`).
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }
}

impl fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zoom[{}, {}]", self.min_zoom, self.max_zoom)
    }
}

impl TryFrom<&Value> for VisibilityFilter {
    type Error = FilterError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Wire shape used by serde.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    min_zoom: f64,
    max_zoom: f64,
}

impl TryFrom<RawFilter> for VisibilityFilter {
    type Error = FilterError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        Self::new(raw.min_zoom, raw.max_zoom)
    }
}

impl From<VisibilityFilter> for RawFilter {
    fn from(filter: VisibilityFilter) -> Self {
        Self {
            min_zoom: filter.min_zoom,
            max_zoom: filter.max_zoom,
        }
    }
}

fn read_number(object: &Map<String, Value>, field: &'static str) -> Result<f64, FilterError> {
    let value = object.get(field).ok_or(FilterError::MissingField(field))?;
    value.as_f64().ok_or_else(|| FilterError::NotNumeric {
        field,
        found: value.to_string(),
    })
}

fn require_finite(field: &'static str, value: f64) -> Result<f64, FilterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FilterError::NotFinite { field, value })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
