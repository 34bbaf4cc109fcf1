//! Keypoints, descriptors and correspondences shared by every pipeline stage.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A distinguished image location produced by a descriptor provider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Pixel position in image coordinates.
    pub position: Point2<f32>,
    /// Detector response; larger is stronger.
    pub response: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, response: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            response,
        }
    }
}

/// Row-major matrix of fixed-length `f32` descriptors, one row per keypoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Descriptors {
    dim: usize,
    data: Vec<f32>,
}

impl Descriptors {
    /// Empty set of `dim`-dimensional descriptors.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Build from explicit rows. Returns `None` if any row has the wrong length.
    pub fn from_rows<R: AsRef<[f32]>>(dim: usize, rows: &[R]) -> Option<Self> {
        let mut out = Self::new(dim);
        for row in rows {
            if !out.push(row.as_ref()) {
                return None;
            }
        }
        Some(out)
    }

    /// Append one row; rejected (returns `false`) if its length differs from `dim`.
    pub fn push(&mut self, row: &[f32]) -> bool {
        if row.len() != self.dim {
            return false;
        }
        self.data.extend_from_slice(row);
        true
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // `chunks_exact(0)` panics, an empty set yields nothing instead.
        self.data.chunks_exact(self.dim.max(1)).take(self.len())
    }
}

/// Keypoints together with their index-aligned descriptors.
#[derive(Clone, Debug, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Descriptors,
}

impl Features {
    /// Number of keypoints that carry a descriptor.
    pub fn len(&self) -> usize {
        self.keypoints.len().min(self.descriptors.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hypothesised pairing of a reference keypoint with a scene keypoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Index into the reference keypoints.
    pub reference: usize,
    /// Index into the scene keypoints.
    pub scene: usize,
    /// Descriptor distance, non-negative.
    pub distance: f32,
}

impl Correspondence {
    pub fn new(reference: usize, scene: usize, distance: f32) -> Self {
        Self {
            reference,
            scene,
            distance,
        }
    }
}
