mod common;

use approx::assert_abs_diff_eq;
use common::{block_texture, paste};
use image::{DynamicImage, GrayImage, Luma};
use planar_track::io::{gray_view, NullSink};
use planar_track::{
    FrameLoop, FrameSource, StopReason, TrackError, TrackerParams, TrackingResult,
};

const OFFSET: (u32, u32) = (35, 22);

fn params() -> TrackerParams {
    let mut params = TrackerParams::default();
    params.features.fast.max_keypoints = 5000;
    params.ransac.seed = 3;
    params
}

fn reference() -> GrayImage {
    block_texture(120, 90, 6, 17)
}

fn scene_with_target() -> GrayImage {
    paste(&block_texture(220, 170, 7, 101), &reference(), OFFSET.0, OFFSET.1)
}

#[test]
fn translated_target_is_found() {
    let params = params();
    let reference = reference();
    let tracker = params.build_tracker(&gray_view(&reference)).expect("tracker");
    assert!(tracker.reference().keypoints().len() > 20);

    let scene = scene_with_target();
    let report = tracker.track(0, &gray_view(&scene));
    assert!(report.good_matches > 8, "{} good matches", report.good_matches);

    let corners = report.result.corners().expect("target should be found");
    let expected = [(0.0, 0.0), (120.0, 0.0), (120.0, 90.0), (0.0, 90.0)];
    for (p, (x, y)) in corners.iter().zip(expected) {
        assert_abs_diff_eq!(p.x, x + OFFSET.0 as f32, epsilon = 1.0);
        assert_abs_diff_eq!(p.y, y + OFFSET.1 as f32, epsilon = 1.0);
    }
}

#[test]
fn featureless_frame_is_not_found() {
    let params = params();
    let reference = reference();
    let tracker = params.build_tracker(&gray_view(&reference)).expect("tracker");

    let blank = GrayImage::from_pixel(220, 170, Luma([128]));
    let report = tracker.track(0, &gray_view(&blank));
    assert_eq!(report.matches, 0);
    assert_eq!(report.result, TrackingResult::NotFound);
}

#[test]
fn featureless_reference_is_rejected() {
    let blank = GrayImage::from_pixel(64, 64, Luma([40]));
    let err = params().build_tracker(&gray_view(&blank)).unwrap_err();
    assert!(matches!(err, TrackError::NoReferenceDescriptors));
}

struct Scripted(Vec<GrayImage>);

impl FrameSource for Scripted {
    fn next_frame(&mut self) -> Result<Option<image::RgbImage>, TrackError> {
        if self.0.is_empty() {
            return Ok(None);
        }
        Ok(Some(DynamicImage::ImageLuma8(self.0.remove(0)).to_rgb8()))
    }
}

#[test]
fn each_frame_is_tracked_independently() {
    let params = params();
    let reference = reference();
    let tracker = params.build_tracker(&gray_view(&reference)).expect("tracker");

    let blank = GrayImage::from_pixel(220, 170, Luma([128]));
    let frames = Scripted(vec![
        scene_with_target(),
        blank,
        scene_with_target(),
    ]);
    let mut frame_loop = FrameLoop::new(tracker, frames, NullSink);

    let mut found = Vec::new();
    let reason = frame_loop
        .run(|r| found.push(r.result.is_found()))
        .expect("run");
    assert_eq!(reason, StopReason::SourceExhausted);
    assert_eq!(found, vec![true, false, true]);
}
