//! Acquire, track and render frames until told to stop.

use crate::io::gray_view;
use crate::{FrameReport, TrackError, Tracker};
use image::RgbImage;
use nalgebra::Point2;
use planar_track_core::{CorrespondenceMatcher, DescriptorProvider, TransformEstimator};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Where frames come from.
pub trait FrameSource {
    /// Next frame, or `None` once a finite source is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, TrackError>;
}

/// Where tracked frames go.
pub trait FrameSink {
    /// Present `frame`, outlining `corners` when the target was found.
    fn render(
        &mut self,
        frame: &RgbImage,
        corners: Option<&[Point2<f32>; 4]>,
    ) -> Result<(), TrackError>;
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, TrackError> {
        (**self).next_frame()
    }
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn render(
        &mut self,
        frame: &RgbImage,
        corners: Option<&[Point2<f32>; 4]>,
    ) -> Result<(), TrackError> {
        (**self).render(frame, corners)
    }
}

/// Lifecycle of a [`FrameLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Reference described, no frame processed yet.
    Initializing,
    Running,
    Stopped,
}

/// Why [`FrameLoop::run`] returned normally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    FrameLimit,
    SourceExhausted,
}

/// Drives a [`Tracker`] over a [`FrameSource`], rendering into a [`FrameSink`].
///
/// The loop owns its source and sink. Cancellation is checked once per
/// frame, so a frame in flight always completes.
pub struct FrameLoop<S, K, P, M, E> {
    tracker: Tracker<P, M, E>,
    source: S,
    sink: K,
    cancel: Arc<AtomicBool>,
    max_frames: Option<usize>,
    state: LoopState,
}

impl<S, K, P, M, E> FrameLoop<S, K, P, M, E>
where
    S: FrameSource,
    K: FrameSink,
    P: DescriptorProvider,
    M: CorrespondenceMatcher,
    E: TransformEstimator,
{
    pub fn new(tracker: Tracker<P, M, E>, source: S, sink: K) -> Self {
        Self {
            tracker,
            source,
            sink,
            cancel: Arc::new(AtomicBool::new(false)),
            max_frames: None,
            state: LoopState::Initializing,
        }
    }

    /// Stop after `n` frames.
    pub fn with_max_frames(mut self, n: Option<usize>) -> Self {
        self.max_frames = n;
        self
    }

    /// Share a cancellation flag (e.g. set from a Ctrl-C handler).
    pub fn with_cancel_token(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops the loop before the next frame when set.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn tracker(&self) -> &Tracker<P, M, E> {
        &self.tracker
    }

    #[inline]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Run until cancelled, the frame limit is reached, or the source ends.
    ///
    /// `on_frame` sees every report as it is produced. Capture and render
    /// failures end the loop with an error; the state is `Stopped` either way.
    pub fn run<F>(&mut self, mut on_frame: F) -> Result<StopReason, TrackError>
    where
        F: FnMut(&FrameReport),
    {
        self.state = LoopState::Running;
        let outcome = self.run_frames(&mut on_frame);
        self.state = LoopState::Stopped;
        match &outcome {
            Ok(reason) => log::info!("tracking stopped: {reason:?}"),
            Err(err) => log::error!("tracking aborted: {err}"),
        }
        outcome
    }

    fn run_frames(
        &mut self,
        on_frame: &mut dyn FnMut(&FrameReport),
    ) -> Result<StopReason, TrackError> {
        let mut index = 0usize;
        loop {
            if self.cancel.load(Ordering::SeqCst) {
                return Ok(StopReason::Cancelled);
            }
            if self.max_frames.is_some_and(|n| index >= n) {
                return Ok(StopReason::FrameLimit);
            }
            let Some(frame) = self.source.next_frame()? else {
                return Ok(StopReason::SourceExhausted);
            };

            let gray = image::imageops::grayscale(&frame);
            let report = self.tracker.track(index, &gray_view(&gray));
            self.sink.render(&frame, report.result.corners())?;
            on_frame(&report);
            index += 1;
        }
    }
}
