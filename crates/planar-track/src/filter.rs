//! Distance-based pruning of putative correspondences.
//!
//! The acceptance threshold adapts to the best match of the frame:
//! `T = max(multiplier * min_distance, floor)`. A frame whose best match is
//! very close keeps only matches of comparable quality; the floor stops `T`
//! from collapsing to zero when an exact match exists.

use planar_track_core::Correspondence;
use serde::{Deserialize, Serialize};

/// Parameters of the match quality filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchFilterParams {
    /// Scale applied to the smallest distance of the frame.
    pub multiplier: f32,
    /// Lower bound on the threshold.
    pub floor: f32,
}

impl Default for MatchFilterParams {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            floor: 0.02,
        }
    }
}

impl MatchFilterParams {
    /// Acceptance threshold for a frame whose best distance is `min_distance`.
    #[inline]
    pub fn threshold(&self, min_distance: f32) -> f32 {
        (self.multiplier * min_distance).max(self.floor)
    }
}

/// Distance statistics of one frame's correspondences.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub min_distance: f32,
    /// Reported only; never used for filtering.
    pub max_distance: f32,
    pub threshold: f32,
}

/// Output of [`filter_matches`].
#[derive(Clone, Debug, Default)]
pub struct FilteredMatches {
    /// Correspondences with `distance <= threshold`, in input order.
    pub good: Vec<Correspondence>,
    /// `None` when the input had no finite distance.
    pub stats: Option<MatchStats>,
}

fn distance_range(matches: &[Correspondence]) -> Option<(f32, f32)> {
    matches
        .iter()
        .map(|m| m.distance)
        .filter(|d| d.is_finite())
        .fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
}

/// Keep the correspondences whose distance is within the adaptive threshold.
pub fn filter_matches(matches: &[Correspondence], params: &MatchFilterParams) -> FilteredMatches {
    let Some((min_distance, max_distance)) = distance_range(matches) else {
        return FilteredMatches::default();
    };
    let threshold = params.threshold(min_distance);
    log::trace!(
        "match distances: min {min_distance:.4}, max {max_distance:.4}, threshold {threshold:.4}"
    );

    // NaN compares false and never passes.
    let good = matches
        .iter()
        .filter(|m| m.distance <= threshold)
        .copied()
        .collect();

    FilteredMatches {
        good,
        stats: Some(MatchStats {
            min_distance,
            max_distance,
            threshold,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn with_distances(ds: &[f32]) -> Vec<Correspondence> {
        ds.iter()
            .enumerate()
            .map(|(i, &d)| Correspondence::new(i, i, d))
            .collect()
    }

    #[test]
    fn threshold_floor_and_scale() {
        let p = MatchFilterParams::default();
        assert_relative_eq!(p.threshold(0.0), 0.02);
        assert_relative_eq!(p.threshold(0.03), 0.06);
        assert_relative_eq!(p.threshold(0.005), 0.02);
    }

    #[test]
    fn keeps_matches_at_or_below_threshold() {
        let matches = with_distances(&[0.03, 0.06, 0.061, 0.5, 0.045]);
        let out = filter_matches(&matches, &MatchFilterParams::default());
        let kept: Vec<usize> = out.good.iter().map(|m| m.reference).collect();
        assert_eq!(kept, vec![0, 1, 4]);

        let stats = out.stats.expect("stats");
        assert_relative_eq!(stats.min_distance, 0.03);
        assert_relative_eq!(stats.max_distance, 0.5);
        assert_relative_eq!(stats.threshold, 0.06);
    }

    #[test]
    fn exact_match_uses_floor() {
        let matches = with_distances(&[0.0, 0.01, 0.02, 0.021]);
        let out = filter_matches(&matches, &MatchFilterParams::default());
        assert_eq!(out.good.len(), 3);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let out = filter_matches(&[], &MatchFilterParams::default());
        assert!(out.good.is_empty());
        assert!(out.stats.is_none());
    }

    #[test]
    fn non_finite_distances_never_pass() {
        let matches = with_distances(&[f32::NAN, 0.01, f32::INFINITY]);
        let out = filter_matches(&matches, &MatchFilterParams::default());
        assert_eq!(out.good.len(), 1);
        assert_eq!(out.good[0].reference, 1);
    }

    #[test]
    fn good_set_shrinks_with_multiplier() {
        let matches = with_distances(&[0.1, 0.15, 0.2, 0.25, 0.3, 0.35, 0.4]);
        let mut last = usize::MAX;
        for multiplier in [4.0, 3.0, 2.5, 2.0, 1.5, 1.0] {
            let params = MatchFilterParams {
                multiplier,
                ..MatchFilterParams::default()
            };
            let n = filter_matches(&matches, &params).good.len();
            assert!(n <= last, "multiplier {multiplier} kept {n} > {last}");
            assert!(n >= 1);
            last = n;
        }
    }
}
