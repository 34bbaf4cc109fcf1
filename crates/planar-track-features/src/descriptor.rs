//! Normalized intensity-patch descriptors on top of FAST keypoints.
//!
//! Each descriptor is a `grid_size x grid_size` lattice of bilinear samples
//! centred on the keypoint, made zero-mean and scaled to unit L2 norm. The
//! Euclidean distance between two descriptors therefore lies in `[0, 2]`,
//! and identical patches up to gain/offset have distance 0.

use crate::fast::{FastDetector, FastParams};
use planar_track_core::{
    sample_bilinear, DescriptorProvider, Descriptors, Features, GrayImageView, Keypoint,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Patches whose intensity spread is below this norm are dropped.
const MIN_PATCH_NORM: f32 = 1e-3;

/// Parameters of [`PatchDescriptorProvider`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchDescriptorParams {
    pub fast: FastParams,
    /// Samples per side; the descriptor has `grid_size^2` entries.
    pub grid_size: usize,
    /// Pixel spacing between samples.
    pub stride: f32,
}

impl Default for PatchDescriptorParams {
    fn default() -> Self {
        Self {
            fast: FastParams::default(),
            grid_size: 8,
            stride: 2.0,
        }
    }
}

impl PatchDescriptorParams {
    /// Distance from the keypoint to the outermost sample.
    pub fn half_extent(&self) -> f32 {
        (self.grid_size.saturating_sub(1)) as f32 * 0.5 * self.stride
    }

    pub fn descriptor_len(&self) -> usize {
        self.grid_size * self.grid_size
    }
}

/// FAST keypoints described by normalized intensity patches.
#[derive(Clone, Debug)]
pub struct PatchDescriptorProvider {
    params: PatchDescriptorParams,
    detector: FastDetector,
    offsets: Vec<f32>,
}

impl Default for PatchDescriptorProvider {
    fn default() -> Self {
        Self::new(PatchDescriptorParams::default())
    }
}

impl PatchDescriptorProvider {
    pub fn new(params: PatchDescriptorParams) -> Self {
        let half = params.half_extent();
        // Keep the whole patch (plus the bilinear neighbour) inside the image.
        let mut fast = params.fast.clone();
        fast.margin = fast.margin.max(half.ceil() as usize + 1);
        let detector = FastDetector::new(fast);

        let offsets = (0..params.grid_size)
            .map(|k| k as f32 * params.stride - half)
            .collect();

        Self {
            params,
            detector,
            offsets,
        }
    }

    #[inline]
    pub fn params(&self) -> &PatchDescriptorParams {
        &self.params
    }

    /// Describe one keypoint; `None` for a flat patch.
    pub fn describe(&self, image: &GrayImageView<'_>, kp: &Keypoint) -> Option<Vec<f32>> {
        let mut patch = Vec::with_capacity(self.params.descriptor_len());
        for &dy in &self.offsets {
            for &dx in &self.offsets {
                patch.push(sample_bilinear(image, kp.position.x + dx, kp.position.y + dy));
            }
        }
        if patch.is_empty() {
            return None;
        }

        let mean = patch.iter().sum::<f32>() / patch.len() as f32;
        patch.iter_mut().for_each(|v| *v -= mean);
        let norm = patch.iter().map(|v| v * v).sum::<f32>().sqrt();
        if !norm.is_finite() || norm < MIN_PATCH_NORM {
            return None;
        }
        patch.iter_mut().for_each(|v| *v /= norm);
        Some(patch)
    }
}

impl DescriptorProvider for PatchDescriptorProvider {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, image),
            fields(width = image.width, height = image.height)
        )
    )]
    fn extract(&self, image: &GrayImageView<'_>) -> Features {
        let candidates = self.detector.detect(image);
        let mut keypoints = Vec::with_capacity(candidates.len());
        let mut descriptors = Descriptors::new(self.params.descriptor_len());

        for kp in candidates {
            if let Some(desc) = self.describe(image, &kp) {
                if descriptors.push(&desc) {
                    keypoints.push(kp);
                }
            }
        }

        log::debug!(
            "extracted {} keypoints from {}x{} image",
            keypoints.len(),
            image.width,
            image.height
        );
        Features {
            keypoints,
            descriptors,
        }
    }
}
