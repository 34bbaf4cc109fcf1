//! FAST segment-test keypoints on top of `imageproc::corners`.
//!
//! `imageproc` runs the segment test and scores each corner with the largest
//! threshold at which it still passes. This layer adds the border margin,
//! optional non-maximum suppression and the strongest-first cap.

use imageproc::corners::{corners_fast12, corners_fast9, Corner};
use imageproc::suppress::local_maxima;
use planar_track_core::{GrayImageView, Keypoint};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Radius of the segment-test circle; `imageproc` never reports corners closer
/// than this to the border.
const CIRCLE_RADIUS: usize = 3;

/// Contiguous arc required on the 16-pixel circle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastVariant {
    #[default]
    Fast9,
    Fast12,
}

/// Parameters of the FAST detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FastParams {
    /// Intensity difference a circle pixel needs to count as brighter/darker.
    pub threshold: u8,
    pub variant: FastVariant,
    /// Keypoints closer than this to the border are discarded. Never below 3.
    pub margin: usize,
    /// Keep at most this many keypoints, strongest first.
    pub max_keypoints: usize,
    /// Keep only corners that beat every neighbour within one pixel.
    pub nonmax_suppression: bool,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            threshold: 20,
            variant: FastVariant::Fast9,
            margin: 8,
            max_keypoints: 1000,
            nonmax_suppression: true,
        }
    }
}

/// FAST corner detector.
#[derive(Clone, Debug, Default)]
pub struct FastDetector {
    params: FastParams,
}

impl FastDetector {
    pub fn new(params: FastParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &FastParams {
        &self.params
    }

    /// Detect corners, strongest first.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, img),
            fields(width = img.width, height = img.height)
        )
    )]
    pub fn detect(&self, img: &GrayImageView<'_>) -> Vec<Keypoint> {
        let margin = self.params.margin.max(CIRCLE_RADIUS);
        let (w, h) = (img.width, img.height);
        if w <= 2 * margin || h <= 2 * margin || img.data.len() < w * h {
            return Vec::new();
        }
        let pixels = img.data[..w * h].to_vec();
        let Some(buffer) = image::GrayImage::from_raw(w as u32, h as u32, pixels) else {
            return Vec::new();
        };

        let corners = match self.params.variant {
            FastVariant::Fast9 => corners_fast9(&buffer, self.params.threshold),
            FastVariant::Fast12 => corners_fast12(&buffer, self.params.threshold),
        };
        let corners = if self.params.nonmax_suppression {
            local_maxima(&corners, 1)
        } else {
            corners
        };

        let inside = |c: &Corner| {
            let (x, y) = (c.x as usize, c.y as usize);
            x >= margin && y >= margin && x < w - margin && y < h - margin
        };
        let mut keypoints: Vec<Keypoint> = corners
            .iter()
            .filter(|c| inside(c))
            .map(|c| Keypoint::new(c.x as f32, c.y as f32, c.score))
            .collect();

        keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
        keypoints.truncate(self.params.max_keypoints);
        log::trace!("fast: {} keypoints", keypoints.len());
        keypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planar_track_core::GrayImage;

    /// Dark image with one bright square; its four corners are FAST corners.
    fn square_image() -> GrayImage {
        let (w, h) = (40, 40);
        let mut data = vec![20u8; w * h];
        for y in 12..28 {
            for x in 12..28 {
                data[y * w + x] = 220;
            }
        }
        GrayImage::from_raw(w, h, data).expect("image")
    }

    fn near(kps: &[Keypoint], x: f32, y: f32) -> bool {
        kps.iter()
            .any(|k| (k.position.x - x).abs() <= 1.0 && (k.position.y - y).abs() <= 1.0)
    }

    #[test]
    fn finds_square_corners() {
        let img = square_image();
        let kps = FastDetector::default().detect(&img.view());
        for (x, y) in [(12.0, 12.0), (27.0, 12.0), (27.0, 27.0), (12.0, 27.0)] {
            assert!(near(&kps, x, y), "no keypoint near ({x}, {y})");
        }
        assert!(kps.windows(2).all(|p| p[0].response >= p[1].response));
    }

    #[test]
    fn suppression_thins_clusters() {
        let img = square_image();
        let raw = FastDetector::new(FastParams {
            nonmax_suppression: false,
            ..FastParams::default()
        })
        .detect(&img.view());
        let thinned = FastDetector::default().detect(&img.view());
        assert!(thinned.len() <= raw.len());
        assert!(!thinned.is_empty());
    }

    #[test]
    fn flat_image_has_no_corners() {
        let img = GrayImage::from_raw(32, 32, vec![128; 32 * 32]).expect("image");
        assert!(FastDetector::default().detect(&img.view()).is_empty());
    }

    #[test]
    fn respects_margin_and_cap() {
        let img = square_image();
        let det = FastDetector::new(FastParams {
            margin: 13,
            ..FastParams::default()
        });
        for k in det.detect(&img.view()) {
            assert!(k.position.x >= 13.0 && k.position.x < 27.0);
        }

        let capped = FastDetector::new(FastParams {
            max_keypoints: 2,
            ..FastParams::default()
        });
        assert!(capped.detect(&img.view()).len() <= 2);
    }

    #[test]
    fn image_smaller_than_margin_is_empty() {
        let img = GrayImage::from_raw(10, 10, vec![0; 100]).expect("image");
        assert!(FastDetector::default().detect(&img.view()).is_empty());
    }

    #[test]
    fn variant_parses_from_json() {
        let p: FastParams = serde_json::from_str(r#"{ "variant": "fast12" }"#).expect("parse");
        assert_eq!(p.variant, FastVariant::Fast12);
        assert_eq!(p.threshold, 20);
    }
}
