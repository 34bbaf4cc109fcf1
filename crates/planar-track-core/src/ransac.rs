//! Outlier-tolerant homography fitting.
//!
//! Minimal 4-point samples are drawn with a seeded RNG, scored by
//! reprojection error, and the best consensus set is refit with the
//! normalized DLT.

use crate::{
    estimate_homography, homography_from_4pt, Homography, HomographyError, TransformEstimator,
};
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Sampling budget and acceptance rules for [`fit_homography_ransac`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Maximum number of minimal-sample iterations.
    pub max_iters: usize,
    /// Max reprojection error, in pixels, for a point to count as an inlier.
    pub inlier_threshold: f32,
    /// Minimum consensus size for a usable model.
    pub min_inliers: usize,
    /// RNG seed; fixed so a given frame always yields the same fit.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iters: 2000,
            inlier_threshold: 3.0,
            min_inliers: 4,
            seed: 0,
        }
    }
}

/// A consensus homography and its inlier mask.
#[derive(Clone, Debug)]
pub struct RansacFit {
    pub homography: Homography,
    pub inlier_mask: Vec<bool>,
    pub num_inliers: usize,
}

#[inline]
fn reprojection_error(h: &Homography, src: Point2<f32>, dst: Point2<f32>) -> f32 {
    match h.try_apply(src) {
        Some(p) => (p - dst).norm(),
        None => f32::INFINITY,
    }
}

fn score(
    h: &Homography,
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    threshold: f32,
) -> (usize, Vec<bool>) {
    let mask: Vec<bool> = src
        .iter()
        .zip(dst)
        .map(|(&s, &d)| reprojection_error(h, s, d) < threshold)
        .collect();
    let count = mask.iter().filter(|&&m| m).count();
    (count, mask)
}

/// Fit `dst ~ H * src` with RANSAC.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, dst, params), fields(n = src.len()))
)]
pub fn fit_homography_ransac(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    params: &RansacParams,
) -> Result<RansacFit, HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    let n = src.len();
    if n < 4 {
        return Err(HomographyError::TooFewPoints { needed: 4, got: n });
    }

    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut best: Option<(usize, Vec<bool>, Homography)> = None;

    for _ in 0..params.max_iters {
        let idx = rand::seq::index::sample(&mut rng, n, 4);
        let pick = |pts: &[Point2<f32>]| -> [Point2<f32>; 4] {
            std::array::from_fn(|k| pts[idx.index(k)])
        };
        let (s4, d4) = (pick(src), pick(dst));

        let Some(h) = homography_from_4pt(&s4, &d4) else {
            continue;
        };

        let (count, mask) = score(&h, src, dst, params.inlier_threshold);
        let improved = best.as_ref().is_none_or(|(c, _, _)| count > *c);
        if improved {
            best = Some((count, mask, h));

            // Stop once more than 90% agree.
            if count * 10 > n * 9 {
                break;
            }
        }
    }

    let Some((count, mask, h)) = best else {
        return Err(HomographyError::Degenerate);
    };

    if count < params.min_inliers.max(4) {
        return Err(HomographyError::InsufficientInliers {
            needed: params.min_inliers.max(4),
            found: count,
        });
    }

    let inlier_src: Vec<Point2<f32>> = (0..n).filter(|&i| mask[i]).map(|i| src[i]).collect();
    let inlier_dst: Vec<Point2<f32>> = (0..n).filter(|&i| mask[i]).map(|i| dst[i]).collect();

    let refit = estimate_homography(&inlier_src, &inlier_dst).unwrap_or(h);
    let (num_inliers, inlier_mask) = score(&refit, src, dst, params.inlier_threshold);

    // Keep the minimal-sample model if the refit lost support.
    if num_inliers < count {
        return Ok(RansacFit {
            homography: h,
            inlier_mask: mask,
            num_inliers: count,
        });
    }

    Ok(RansacFit {
        homography: refit,
        inlier_mask,
        num_inliers,
    })
}

/// [`TransformEstimator`] backed by [`fit_homography_ransac`].
#[derive(Clone, Debug, Default)]
pub struct RansacEstimator {
    params: RansacParams,
}

impl RansacEstimator {
    pub fn new(params: RansacParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RansacParams {
        &self.params
    }
}

impl TransformEstimator for RansacEstimator {
    fn fit(
        &self,
        src: &[Point2<f32>],
        dst: &[Point2<f32>],
    ) -> Result<Homography, HomographyError> {
        let fit = fit_homography_ransac(src, dst, &self.params)?;
        log::debug!(
            "ransac: {}/{} inliers",
            fit.num_inliers,
            fit.inlier_mask.len()
        );
        Ok(fit.homography)
    }
}
