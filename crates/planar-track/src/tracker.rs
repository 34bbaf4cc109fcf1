//! Single-frame tracking pipeline.
//!
//! `extract -> match -> filter -> gate -> estimate -> project`. Every frame
//! is handled independently; the only state is the immutable reference.

use crate::{
    filter_matches, project_boundary, FrameReport, MatchFilterParams, PresenceGateParams,
    ReferenceTarget, TrackingResult,
};
use nalgebra::Point2;
use planar_track_core::{
    Correspondence, CorrespondenceMatcher, DescriptorProvider, GrayImageView, Keypoint,
    TransformEstimator,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Locates a [`ReferenceTarget`] in scene frames.
#[derive(Clone, Debug)]
pub struct Tracker<P, M, E> {
    reference: ReferenceTarget,
    provider: P,
    matcher: M,
    estimator: E,
    filter: MatchFilterParams,
    gate: PresenceGateParams,
}

/// Resolve correspondences into index-aligned `(reference, scene)` point lists.
///
/// `None` if any index is out of range.
fn correspondence_points(
    good: &[Correspondence],
    reference: &[Keypoint],
    scene: &[Keypoint],
) -> Option<(Vec<Point2<f32>>, Vec<Point2<f32>>)> {
    let mut src = Vec::with_capacity(good.len());
    let mut dst = Vec::with_capacity(good.len());
    for m in good {
        src.push(reference.get(m.reference)?.position);
        dst.push(scene.get(m.scene)?.position);
    }
    Some((src, dst))
}

impl<P, M, E> Tracker<P, M, E>
where
    P: DescriptorProvider,
    M: CorrespondenceMatcher,
    E: TransformEstimator,
{
    pub fn new(reference: ReferenceTarget, provider: P, matcher: M, estimator: E) -> Self {
        Self {
            reference,
            provider,
            matcher,
            estimator,
            filter: MatchFilterParams::default(),
            gate: PresenceGateParams::default(),
        }
    }

    pub fn with_filter(mut self, filter: MatchFilterParams) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_gate(mut self, gate: PresenceGateParams) -> Self {
        self.gate = gate;
        self
    }

    #[inline]
    pub fn reference(&self) -> &ReferenceTarget {
        &self.reference
    }

    #[inline]
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Track the reference in one grayscale frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame),
            fields(width = frame.width, height = frame.height)
        )
    )]
    pub fn track(&self, index: usize, frame: &GrayImageView<'_>) -> FrameReport {
        let scene = self.provider.extract(frame);
        let matches = self
            .matcher
            .match_descriptors(self.reference.descriptors(), &scene.descriptors);
        let filtered = filter_matches(&matches, &self.filter);
        let good_matches = filtered.good.len();

        let result = if self.gate.is_present(good_matches) {
            self.locate(&filtered.good, &scene.keypoints)
        } else {
            TrackingResult::NotFound
        };

        FrameReport {
            index,
            matches: matches.len(),
            good_matches,
            threshold: filtered.stats.map(|s| s.threshold),
            result,
        }
    }

    fn locate(&self, good: &[Correspondence], scene: &[Keypoint]) -> TrackingResult {
        let Some((src, dst)) = correspondence_points(good, self.reference.keypoints(), scene)
        else {
            log::warn!("matcher returned out-of-range keypoint indices");
            return TrackingResult::NotFound;
        };

        match self.estimator.fit(&src, &dst) {
            Ok(h) => project_boundary(self.reference.corners(), &h),
            Err(err) => {
                log::debug!("homography estimation failed: {err}");
                TrackingResult::NotFound
            }
        }
    }
}
