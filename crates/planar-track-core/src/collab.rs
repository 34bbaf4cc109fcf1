//! Capability interfaces for the stages the tracker delegates.
//!
//! Concrete implementations are chosen at startup and handed to the tracker
//! by value; the tracker never inspects which one it got.

use crate::{Correspondence, Descriptors, Features, GrayImageView, Homography, HomographyError};
use nalgebra::Point2;

/// Keypoint detection plus descriptor computation.
pub trait DescriptorProvider {
    /// Detect keypoints in `image` and describe each one.
    ///
    /// `keypoints[i]` and `descriptors.row(i)` must refer to the same location.
    fn extract(&self, image: &GrayImageView<'_>) -> Features;
}

/// Nearest-neighbour search from reference descriptors into scene descriptors.
pub trait CorrespondenceMatcher {
    /// Return the best scene match for every reference row, in reference order.
    ///
    /// The output may be shorter than `reference` only when `scene` is empty.
    fn match_descriptors(
        &self,
        reference: &Descriptors,
        scene: &Descriptors,
    ) -> Vec<Correspondence>;
}

/// Robust homography fitting over putative correspondences.
pub trait TransformEstimator {
    /// Fit `dst ~ H * src`. `src` and `dst` are index-aligned.
    fn fit(&self, src: &[Point2<f32>], dst: &[Point2<f32>])
        -> Result<Homography, HomographyError>;
}

impl<T: DescriptorProvider + ?Sized> DescriptorProvider for &T {
    fn extract(&self, image: &GrayImageView<'_>) -> Features {
        (**self).extract(image)
    }
}

impl<T: CorrespondenceMatcher + ?Sized> CorrespondenceMatcher for &T {
    fn match_descriptors(
        &self,
        reference: &Descriptors,
        scene: &Descriptors,
    ) -> Vec<Correspondence> {
        (**self).match_descriptors(reference, scene)
    }
}

impl<T: TransformEstimator + ?Sized> TransformEstimator for &T {
    fn fit(
        &self,
        src: &[Point2<f32>],
        dst: &[Point2<f32>],
    ) -> Result<Homography, HomographyError> {
        (**self).fit(src, dst)
    }
}

impl<T: DescriptorProvider + ?Sized> DescriptorProvider for Box<T> {
    fn extract(&self, image: &GrayImageView<'_>) -> Features {
        (**self).extract(image)
    }
}

impl<T: CorrespondenceMatcher + ?Sized> CorrespondenceMatcher for Box<T> {
    fn match_descriptors(
        &self,
        reference: &Descriptors,
        scene: &Descriptors,
    ) -> Vec<Correspondence> {
        (**self).match_descriptors(reference, scene)
    }
}

impl<T: TransformEstimator + ?Sized> TransformEstimator for Box<T> {
    fn fit(
        &self,
        src: &[Point2<f32>],
        dst: &[Point2<f32>],
    ) -> Result<Homography, HomographyError> {
        (**self).fit(src, dst)
    }
}
