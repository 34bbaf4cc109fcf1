use crate::TrackError;
use nalgebra::Point2;
use planar_track_core::{DescriptorProvider, Descriptors, Features, GrayImageView, Keypoint};

/// The planar object being tracked: its outline and its features.
///
/// Built once at startup and never modified.
#[derive(Clone, Debug)]
pub struct ReferenceTarget {
    width: usize,
    height: usize,
    corners: [Point2<f32>; 4],
    features: Features,
}

impl ReferenceTarget {
    /// Wrap precomputed features of a `width x height` reference image.
    ///
    /// Fails with [`TrackError::NoReferenceDescriptors`] if there are none.
    pub fn new(width: usize, height: usize, features: Features) -> Result<Self, TrackError> {
        if features.descriptors.is_empty() {
            return Err(TrackError::NoReferenceDescriptors);
        }
        let (w, h) = (width as f32, height as f32);
        Ok(Self {
            width,
            height,
            corners: [
                Point2::new(0.0, 0.0),
                Point2::new(w, 0.0),
                Point2::new(w, h),
                Point2::new(0.0, h),
            ],
            features,
        })
    }

    /// Extract features from `image` with `provider`.
    pub fn from_image<P: DescriptorProvider>(
        image: &GrayImageView<'_>,
        provider: &P,
    ) -> Result<Self, TrackError> {
        let features = provider.extract(image);
        log::info!(
            "reference {}x{}: {} keypoints",
            image.width,
            image.height,
            features.len()
        );
        Self::new(image.width, image.height, features)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(0,0), (w,0), (w,h), (0,h)`.
    #[inline]
    pub fn corners(&self) -> &[Point2<f32>; 4] {
        &self.corners
    }

    #[inline]
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.features.keypoints
    }

    #[inline]
    pub fn descriptors(&self) -> &Descriptors {
        &self.features.descriptors
    }
}
