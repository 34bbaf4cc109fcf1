//! Planar homographies and their direct linear estimation.
//!
//! Both the minimal 4-point solve and the overdetermined fit build the same
//! DLT system on Hartley-conditioned points and take its null vector, so the
//! result does not depend on `h33` being non-zero.

use nalgebra::{DMatrix, Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Projective denominators below this fraction of the point's reach count as zero.
const SINGULAR_EPS: f64 = 1e-12;

/// `|det H| / ‖H‖³` below this counts as singular.
const RELATIVE_DET_EPS: f64 = 1e-14;

/// Relative singular-value threshold for rank decisions.
const RANK_TOL: f64 = 1e-10;

/// Failure modes of homography estimation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HomographyError {
    #[error("too few correspondences: need {needed}, got {got}")]
    TooFewPoints { needed: usize, got: usize },
    #[error("source/destination length mismatch ({src} vs {dst})")]
    LengthMismatch { src: usize, dst: usize },
    #[error("degenerate point configuration")]
    Degenerate,
    #[error("insufficient inliers: need {needed}, found {found}")]
    InsufficientInliers { needed: usize, found: usize },
}

/// Projective map `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// The all-zero matrix; singular, maps every point to nowhere.
    pub fn zero() -> Self {
        Self::new(Matrix3::zeros())
    }

    #[inline]
    fn project(&self, p: Point2<f32>) -> Vector3<f64> {
        self.h * Vector3::new(p.x as f64, p.y as f64, 1.0)
    }

    /// Apply without any checks. Degenerate inputs produce `inf`/`NaN`.
    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.project(p);
        Point2::new((v.x / v.z) as f32, (v.y / v.z) as f32)
    }

    /// Apply, or `None` if `p` maps to (or near) the line at infinity or the
    /// result does not fit a finite `f32`.
    ///
    /// "Near" is relative to `‖H‖` and `|p|`, so rescaling `H` never changes
    /// the answer.
    #[inline]
    pub fn try_apply(&self, p: Point2<f32>) -> Option<Point2<f32>> {
        let v = self.project(p);
        let reach = self.h.norm() * (1.0 + (p.x as f64).abs() + (p.y as f64).abs());
        if !v.z.is_finite() || v.z.abs() <= SINGULAR_EPS * reach {
            return None;
        }
        let q = Point2::new((v.x / v.z) as f32, (v.y / v.z) as f32);
        (q.x.is_finite() && q.y.is_finite()).then_some(q)
    }

    pub fn determinant(&self) -> f64 {
        self.h.determinant()
    }

    /// `true` for non-invertible or non-finite matrices.
    ///
    /// Measured on `|det H| / ‖H‖_F³`, which is invariant to the overall
    /// scale of `H`.
    pub fn is_singular(&self) -> bool {
        let norm = self.h.norm();
        let det = self.determinant();
        if !(norm.is_finite() && det.is_finite()) || norm == 0.0 {
            return true;
        }
        det.abs() / norm.powi(3) < RELATIVE_DET_EPS
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Rescale so that `h33 = 1`, or to unit Frobenius norm when `h33` vanishes.
    fn canonical(h: Matrix3<f64>) -> Option<Self> {
        let s = if h[(2, 2)].abs() > SINGULAR_EPS * h.norm() {
            h[(2, 2)]
        } else {
            h.norm()
        };
        if !s.is_finite() || s.abs() < SINGULAR_EPS {
            return None;
        }
        let out = Self::new(h / s);
        (!out.is_singular()).then_some(out)
    }
}

/// Similarity that moves the centroid to the origin and scales the mean
/// distance from it to `sqrt(2)`.
struct Conditioning {
    t: Matrix3<f64>,
    points: Vec<Point2<f64>>,
}

impl Conditioning {
    fn new(pts: &[Point2<f32>]) -> Self {
        let n = pts.len().max(1) as f64;
        let centroid = pts
            .iter()
            .fold(Vector3::zeros(), |acc, p| {
                acc + Vector3::new(p.x as f64, p.y as f64, 0.0)
            })
            / n;
        let spread = pts
            .iter()
            .map(|p| (p.x as f64 - centroid.x).hypot(p.y as f64 - centroid.y))
            .sum::<f64>()
            / n;
        let s = if spread > SINGULAR_EPS {
            std::f64::consts::SQRT_2 / spread
        } else {
            1.0
        };

        let t = Matrix3::new(
            s, 0.0, -s * centroid.x, //
            0.0, s, -s * centroid.y, //
            0.0, 0.0, 1.0,
        );
        let points = pts
            .iter()
            .map(|p| {
                Point2::new(
                    s * (p.x as f64 - centroid.x),
                    s * (p.y as f64 - centroid.y),
                )
            })
            .collect();
        Self { t, points }
    }
}

/// The two DLT equations contributed by `s -> d`.
#[inline]
fn dlt_rows(s: Point2<f64>, d: Point2<f64>) -> [[f64; 9]; 2] {
    let (x, y, u, v) = (s.x, s.y, d.x, d.y);
    [
        [-x, -y, -1.0, 0.0, 0.0, 0.0, u * x, u * y, u],
        [0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v],
    ]
}

/// Null vector of the stacked DLT equations; `None` unless the system has
/// rank 8.
fn dlt_null_vector(src: &Conditioning, dst: &Conditioning) -> Option<Vec<f64>> {
    // At least nine rows so that V^T is 9x9 even for four points.
    let rows = (2 * src.points.len()).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (k, (&s, &d)) in src.points.iter().zip(&dst.points).enumerate() {
        for (r, eq) in dlt_rows(s, d).iter().enumerate() {
            a.row_mut(2 * k + r).copy_from_slice(eq);
        }
    }

    let svd = a.svd(false, true);
    let sv = &svd.singular_values;
    let largest = sv.max();
    if !(largest.is_finite() && largest > 0.0) {
        return None;
    }
    if sv.iter().filter(|&&s| s <= largest * RANK_TOL).count() > 1 {
        return None;
    }
    let v_t = svd.v_t?;
    Some(v_t.row(sv.imin()).iter().copied().collect())
}

fn solve(src: &[Point2<f32>], dst: &[Point2<f32>]) -> Option<Homography> {
    let cs = Conditioning::new(src);
    let cd = Conditioning::new(dst);
    let h = dlt_null_vector(&cs, &cd)?;
    let dst_inv = cd.t.try_inverse()?;
    Homography::canonical(dst_inv * Matrix3::from_row_slice(&h) * cs.t)
}

fn check_inputs(src: &[Point2<f32>], dst: &[Point2<f32>]) -> Result<(), HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    if src.len() < 4 {
        return Err(HomographyError::TooFewPoints {
            needed: 4,
            got: src.len(),
        });
    }
    Ok(())
}

/// Least-squares fit of `dst ~ H * src` over all correspondences.
pub fn estimate_homography(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
) -> Result<Homography, HomographyError> {
    check_inputs(src, dst)?;
    solve(src, dst).ok_or(HomographyError::Degenerate)
}

/// Exact homography through four correspondences, or `None` for degenerate
/// quadrilaterals (three collinear points on either side).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    solve(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn perspective() -> Homography {
        Homography::new(Matrix3::new(
            0.9, -0.12, 64.0, //
            0.08, 1.05, 31.0, //
            0.0007, -0.0003, 1.0,
        ))
    }

    fn assert_maps_like(a: &Homography, b: &Homography, probes: &[Point2<f32>]) {
        for &p in probes {
            let (pa, pb) = (a.apply(p), b.apply(p));
            assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-2);
            assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-2);
        }
    }

    fn probes() -> Vec<Point2<f32>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(75.0, 20.0),
            Point2::new(140.0, 110.0),
            Point2::new(12.0, 95.0),
        ]
    }

    #[test]
    fn inverse_undoes_the_map() {
        let h = perspective();
        let inv = h.inverse().expect("invertible");
        for p in probes() {
            let back = inv.apply(h.apply(p));
            assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-3);
            assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-3);
        }
    }

    #[test]
    fn four_correspondences_determine_h() {
        let truth = perspective();
        let quad = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(160.0, 0.0),
            Point2::new(160.0, 120.0),
            Point2::new(0.0, 120.0),
        ];
        let fit = homography_from_4pt(&quad, &quad.map(|p| truth.apply(p))).expect("fit");
        assert_abs_diff_eq!(fit.h[(2, 2)], 1.0, epsilon = 1e-12);
        assert_maps_like(&fit, &truth, &probes());
    }

    #[test]
    fn many_correspondences_least_squares() {
        let truth = perspective();
        let src: Vec<Point2<f32>> = (0..20)
            .map(|i| Point2::new((i % 5) as f32 * 35.0, (i / 5) as f32 * 30.0))
            .collect();
        let dst: Vec<Point2<f32>> = src.iter().map(|&p| truth.apply(p)).collect();

        let fit = estimate_homography(&src, &dst).expect("fit");
        assert_maps_like(&fit, &truth, &probes());
    }

    #[test]
    fn vanishing_h33_is_supported() {
        // (x, y) -> (x / y, 1 / y): h33 = 0 but invertible.
        let truth = Homography::new(Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0,
        ));
        let src = [
            Point2::new(1.0_f32, 1.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 5.0),
            Point2::new(-3.0, 4.0),
        ];
        let fit = homography_from_4pt(&src, &src.map(|p| truth.apply(p))).expect("fit");
        let probes = [Point2::new(3.0, 3.0), Point2::new(-1.0, 2.0)];
        assert_maps_like(&fit, &truth, &probes);
    }

    #[test]
    fn length_mismatch_and_too_few() {
        let four = [Point2::new(0.0_f32, 0.0); 4];
        let three = [Point2::new(1.0_f32, 1.0); 3];
        assert_eq!(
            estimate_homography(&four, &three),
            Err(HomographyError::LengthMismatch { src: 4, dst: 3 })
        );
        assert_eq!(
            estimate_homography(&three, &three),
            Err(HomographyError::TooFewPoints { needed: 4, got: 3 })
        );
    }

    #[test]
    fn collinear_points_are_rejected() {
        let line: Vec<Point2<f32>> = (0..4).map(|i| Point2::new(i as f32 * 10.0, 5.0)).collect();
        assert!(estimate_homography(&line, &line).is_err());

        let line6: Vec<Point2<f32>> = (0..6).map(|i| Point2::new(i as f32, i as f32)).collect();
        assert!(estimate_homography(&line6, &line6).is_err());
    }

    #[test]
    fn singularity_ignores_overall_scale() {
        let tiny = Homography::new(Matrix3::identity() * 1e-5);
        assert!(!tiny.is_singular());
        let p = tiny.try_apply(Point2::new(7.0, -3.0)).expect("finite");
        assert_abs_diff_eq!(p.x, 7.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.y, -3.0, epsilon = 1e-5);

        let huge = Homography::new(perspective().h * 1e8);
        assert!(!huge.is_singular());

        let rank2 = Matrix3::new(
            1.0, 2.0, 3.0, //
            2.0, 4.0, 6.0, //
            0.0, 1.0, 1.0,
        );
        assert!(Homography::new(rank2).is_singular());
        assert!(Homography::new(rank2 * 1e6).is_singular());
    }

    #[test]
    fn zero_matrix_is_singular_and_maps_nowhere() {
        let h = Homography::zero();
        assert!(h.is_singular());
        assert!(h.try_apply(Point2::new(3.0, 4.0)).is_none());
        assert!(!Homography::identity().is_singular());
    }
}
