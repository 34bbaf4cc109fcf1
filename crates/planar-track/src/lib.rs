//! Real-time planar target tracking.
//!
//! Given one reference image of a planar object, every scene frame is run
//! through the same stateless pipeline:
//!
//! 1. describe the frame ([`core::DescriptorProvider`]),
//! 2. match reference descriptors into it ([`core::CorrespondenceMatcher`]),
//! 3. keep matches within `max(2 * min_distance, 0.02)` ([`filter_matches`]),
//! 4. require more than 8 survivors ([`PresenceGateParams`]),
//! 5. fit a homography ([`core::TransformEstimator`]) and project the
//!    reference corners into the frame ([`project_boundary`]).
//!
//! The result is [`TrackingResult::Found`] with the outline, or
//! [`TrackingResult::NotFound`]. [`FrameLoop`] drives a [`Tracker`] over a
//! [`FrameSource`] and hands results to a [`FrameSink`].
//!
//! ## Quickstart
//!
//! ```no_run
//! use planar_track::io::{gray_view, load_reference, ImageSequenceSource, NullSink};
//! use planar_track::{FrameLoop, TrackerParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = TrackerParams::default();
//! let reference = load_reference("box.png")?;
//! let tracker = params.build_tracker(&gray_view(&reference))?;
//!
//! let source = ImageSequenceSource::open("frames")?;
//! let mut frame_loop = FrameLoop::new(tracker, source, NullSink);
//! frame_loop.run(|report| println!("{}: {:?}", report.index, report.result))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `planar_track::core`: images, features, homographies, RANSAC, logging.
//! - `planar_track::features`: FAST keypoints, patch descriptors, brute-force matching.
//! - `planar_track::io`: image-directory frame source and annotated PNG sink.

pub use planar_track_core as core;
pub use planar_track_features as features;

mod draw;
mod error;
mod filter;
mod frame_loop;
mod gate;
pub mod io;
mod params;
mod project;
mod report;
mod target;
mod tracker;

pub use draw::{draw_line, draw_polygon};
pub use error::TrackError;
pub use filter::{filter_matches, FilteredMatches, MatchFilterParams, MatchStats};
pub use frame_loop::{FrameLoop, FrameSink, FrameSource, LoopState, StopReason};
pub use gate::PresenceGateParams;
pub use params::{DefaultTracker, OverlayParams, TrackerParams};
pub use project::{project_boundary, TrackingResult};
pub use report::{FrameReport, TrackReport};
pub use target::ReferenceTarget;
pub use tracker::Tracker;
