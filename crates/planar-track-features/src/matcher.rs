//! Exhaustive nearest-neighbour descriptor matching.

use planar_track_core::{Correspondence, CorrespondenceMatcher, Descriptors};

/// Brute-force L2 matcher.
///
/// Every reference row is compared against every scene row and paired with
/// its closest one. For the few hundred descriptors a frame yields this is
/// fast enough and needs no index structure.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceMatcher;

impl BruteForceMatcher {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

impl CorrespondenceMatcher for BruteForceMatcher {
    fn match_descriptors(
        &self,
        reference: &Descriptors,
        scene: &Descriptors,
    ) -> Vec<Correspondence> {
        if scene.is_empty() || reference.is_empty() {
            return Vec::new();
        }
        if reference.dim() != scene.dim() {
            log::warn!(
                "descriptor dimension mismatch: reference {} vs scene {}",
                reference.dim(),
                scene.dim()
            );
            return Vec::new();
        }

        reference
            .rows()
            .enumerate()
            .filter_map(|(ri, r)| {
                scene
                    .rows()
                    .enumerate()
                    .map(|(si, s)| (si, l2_distance(r, s)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(si, d)| Correspondence::new(ri, si, d))
            })
            .collect()
    }
}
