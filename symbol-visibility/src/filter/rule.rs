//! Scale comparison rules.
//!
//! A rule decides whether a map scale falls on the "visible" side of a
//! [`VisibilityFilter`]. Two rules exist:
//!
//! - [`VisibilityRule::ScaleDenominator`] (default): visible when
//!   `scale < min_zoom && scale > max_zoom`. Map scales are denominators
//!   (1:50 000 is further out than 1:1 000), so `min_zoom` is the larger
//!   value and the range reads "zoomed in past `min_zoom` but not past
//!   `max_zoom`". With `min_zoom <= max_zoom` this is never satisfied.
//! - [`VisibilityRule::InclusiveRange`]: visible when
//!   `min_zoom <= scale <= max_zoom`, for hosts whose filters are written
//!   with ascending bounds. This deviates from the denominator behaviour and
//!   must be opted into.

use serde::{Deserialize, Serialize};

use super::VisibilityFilter;

/// How a map scale is compared against a filter's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityRule {
    /// Exclusive `max_zoom < scale < min_zoom` (scale-denominator bounds).
    #[default]
    ScaleDenominator,

    /// Inclusive `min_zoom <= scale <= max_zoom` (ascending bounds).
    InclusiveRange,
}

impl VisibilityRule {
    /// Returns whether `scale` is inside the visible band of `filter`.
    ///
    /// Callers are expected to have rejected non-finite scales already;
    /// NaN compares false against everything and yields `false` here.
    pub fn admits(self, filter: &VisibilityFilter, scale: f64) -> bool {
        match self {
            VisibilityRule::ScaleDenominator => {
                scale < filter.min_zoom() && scale > filter.max_zoom()
            }
            VisibilityRule::InclusiveRange => {
                scale >= filter.min_zoom() && scale <= filter.max_zoom()
            }
        }
    }

    /// Computes the visibility a graphic should carry, or `None` when the
    /// scale carries no information and the current visibility must be kept.
    pub fn resolve(self, filter: &VisibilityFilter, scale: f64, initial: bool) -> Option<bool> {
        if !scale.is_finite() {
            return None;
        }
        if self.admits(filter, scale) {
            Some(initial)
        } else {
            Some(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filter(min: f64, max: f64) -> VisibilityFilter {
        VisibilityFilter::new(min, max).unwrap()
    }

    #[test]
    fn test_default_rule_is_scale_denominator() {
        assert_eq!(VisibilityRule::default(), VisibilityRule::ScaleDenominator);
    }

    #[test]
    fn test_denominator_inside_band() {
        let f = filter(50_000.0, 1_000.0);
        assert!(VisibilityRule::ScaleDenominator.admits(&f, 10_000.0));
    }

    #[test]
    fn test_denominator_bounds_are_exclusive() {
        let f = filter(50_000.0, 1_000.0);
        assert!(!VisibilityRule::ScaleDenominator.admits(&f, 50_000.0));
        assert!(!VisibilityRule::ScaleDenominator.admits(&f, 1_000.0));
    }

    #[test]
    fn test_denominator_ascending_bounds_never_admit() {
        let f = filter(1_000.0, 50_000.0);
        assert!(!VisibilityRule::ScaleDenominator.admits(&f, 10_000.0));
        assert!(!VisibilityRule::ScaleDenominator.admits(&f, 500.0));
        assert!(!VisibilityRule::ScaleDenominator.admits(&f, 90_000.0));
    }

    #[test]
    fn test_inclusive_range_bounds_are_inclusive() {
        let f = filter(1_000.0, 50_000.0);
        assert!(VisibilityRule::InclusiveRange.admits(&f, 1_000.0));
        assert!(VisibilityRule::InclusiveRange.admits(&f, 50_000.0));
        assert!(!VisibilityRule::InclusiveRange.admits(&f, 50_001.0));
    }

    #[test]
    fn test_resolve_nan_keeps_current() {
        let f = filter(50_000.0, 1_000.0);
        assert_eq!(VisibilityRule::ScaleDenominator.resolve(&f, f64::NAN, true), None);
        assert_eq!(
            VisibilityRule::InclusiveRange.resolve(&f, f64::INFINITY, true),
            None
        );
    }

    #[test]
    fn test_resolve_outside_hides_even_when_initial_true() {
        let f = filter(50_000.0, 1_000.0);
        assert_eq!(
            VisibilityRule::ScaleDenominator.resolve(&f, 100_000.0, true),
            Some(false)
        );
    }

    #[test]
    fn test_resolve_inside_uses_initial() {
        let f = filter(50_000.0, 1_000.0);
        assert_eq!(
            VisibilityRule::ScaleDenominator.resolve(&f, 10_000.0, false),
            Some(false)
        );
        assert_eq!(
            VisibilityRule::ScaleDenominator.resolve(&f, 10_000.0, true),
            Some(true)
        );
    }

    #[test]
    fn test_rule_deserializes_snake_case() {
        let rule: VisibilityRule = serde_json::from_str("\"inclusive_range\"").unwrap();
        assert_eq!(rule, VisibilityRule::InclusiveRange);
    }

    proptest! {
        #[test]
        fn prop_denominator_never_admits_ascending_bounds(
            a in -1.0e7f64..1.0e7,
            b in -1.0e7f64..1.0e7,
            scale in -1.0e8f64..1.0e8,
        ) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let f = filter(min, max);
            prop_assert!(!VisibilityRule::ScaleDenominator.admits(&f, scale));
        }

        #[test]
        fn prop_inclusive_matches_range_contains(
            a in -1.0e7f64..1.0e7,
            b in -1.0e7f64..1.0e7,
            scale in -1.0e8f64..1.0e8,
        ) {
            let f = filter(a, b);
            prop_assert_eq!(
                VisibilityRule::InclusiveRange.admits(&f, scale),
                (a..=b).contains(&scale)
            );
        }

        #[test]
        fn prop_denominator_is_inclusive_rule_mirrored_exclusive(
            lo in 0.0f64..1.0e6,
            width in 1.0f64..1.0e6,
            scale in 0.0f64..3.0e6,
        ) {
            let hi = lo + width;
            let f = filter(hi, lo);
            prop_assert_eq!(
                VisibilityRule::ScaleDenominator.admits(&f, scale),
                scale > lo && scale < hi
            );
        }
    }
}
