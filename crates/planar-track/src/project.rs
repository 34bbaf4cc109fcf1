//! Mapping the reference outline into the scene.

use nalgebra::Point2;
use planar_track_core::Homography;
use serde::{Deserialize, Serialize};

/// Per-frame tracking outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingResult {
    NotFound,
    /// Scene positions of the reference corners `(0,0), (w,0), (w,h), (0,h)`.
    Found([Point2<f32>; 4]),
}

impl TrackingResult {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[inline]
    pub fn corners(&self) -> Option<&[Point2<f32>; 4]> {
        match self {
            Self::Found(c) => Some(c),
            Self::NotFound => None,
        }
    }
}

/// Project `corners` through `h`, keeping their order.
///
/// A singular matrix, a vanishing projective denominator, or a non-finite
/// coordinate gives [`TrackingResult::NotFound`].
pub fn project_boundary(corners: &[Point2<f32>; 4], h: &Homography) -> TrackingResult {
    if h.is_singular() {
        log::debug!("singular homography (det = {:e})", h.determinant());
        return TrackingResult::NotFound;
    }

    let mut out = [Point2::origin(); 4];
    for (dst, &src) in out.iter_mut().zip(corners) {
        match h.try_apply(src) {
            Some(p) => *dst = p,
            None => {
                log::debug!("corner ({}, {}) projects to infinity", src.x, src.y);
                return TrackingResult::NotFound;
            }
        }
    }
    TrackingResult::Found(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn corners() -> [Point2<f32>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(120.0, 0.0),
            Point2::new(120.0, 80.0),
            Point2::new(0.0, 80.0),
        ]
    }

    #[test]
    fn identity_keeps_corners_and_order() {
        let result = project_boundary(&corners(), &Homography::identity());
        assert_eq!(result, TrackingResult::Found(corners()));
    }

    #[test]
    fn rescaled_identity_is_still_found() {
        let h = Homography::new(Matrix3::identity() * 1e-5);
        assert_eq!(
            project_boundary(&corners(), &h),
            TrackingResult::Found(corners())
        );
    }

    #[test]
    fn zero_matrix_is_not_found() {
        let result = project_boundary(&corners(), &Homography::zero());
        assert_eq!(result, TrackingResult::NotFound);
    }

    #[test]
    fn translation_moves_every_corner() {
        let h = Homography::new(Matrix3::new(1.0, 0.0, 15.0, 0.0, 1.0, -4.0, 0.0, 0.0, 1.0));
        let Some(out) = project_boundary(&corners(), &h).corners().copied() else {
            panic!("expected a projection");
        };
        for (p, c) in out.iter().zip(corners()) {
            assert_relative_eq!(p.x, c.x + 15.0, epsilon = 1e-4);
            assert_relative_eq!(p.y, c.y - 4.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn corner_on_line_at_infinity_is_not_found() {
        // w = 1 - x / 120 vanishes at the right-hand corners.
        let h = Homography::new(Matrix3::new(
            1.0,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
            -1.0 / 120.0,
            0.0,
            1.0,
        ));
        assert!(!h.is_singular());
        assert_eq!(
            project_boundary(&corners(), &h),
            TrackingResult::NotFound
        );
    }

    #[test]
    fn serializes_with_snake_case_tags() {
        let json = serde_json::to_string(&TrackingResult::NotFound).expect("json");
        assert_eq!(json, "\"not_found\"");
        let found = TrackingResult::Found(corners());
        let back: TrackingResult =
            serde_json::from_str(&serde_json::to_string(&found).expect("json")).expect("parse");
        assert_eq!(back, found);
    }
}
