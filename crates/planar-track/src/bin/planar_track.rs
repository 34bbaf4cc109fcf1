use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use planar_track::io::{gray_view, load_reference, AnnotatingSink, ImageSequenceSource, NullSink};
use planar_track::{
    DefaultTracker, FrameLoop, FrameSink, StopReason, TrackError, TrackReport, TrackerParams,
};

#[derive(Parser, Debug)]
#[command(
    name = "planar-track",
    version,
    about = "Track a planar reference image through a sequence of frames"
)]
struct Args {
    /// Reference image of the planar target.
    reference: PathBuf,

    /// Directory of frames (png/jpg/jpeg/bmp), processed in name order.
    #[arg(long, default_value = "frames")]
    frames: PathBuf,

    /// Write annotated frames here as PNG.
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON file with tracker parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of every frame here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,

    /// Emit logs as JSON (tracing builds only).
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        planar_track::core::init_tracing(args.json_logs);
        log::set_max_level(args.log_level);
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        planar_track::core::init_with_level(args.log_level)?;
        Ok(())
    }
}

fn track<K: FrameSink>(
    args: &Args,
    tracker: DefaultTracker,
    source: ImageSequenceSource,
    sink: K,
    cancel: Arc<AtomicBool>,
    report: &mut TrackReport,
) -> Result<StopReason, TrackError> {
    FrameLoop::new(tracker, source, sink)
        .with_max_frames(args.max_frames)
        .with_cancel_token(cancel)
        .run(|frame| report.frames.push(frame.clone()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let params = match &args.config {
        Some(path) => TrackerParams::load_json(path)?,
        None => TrackerParams::default(),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler({
        let cancel = cancel.clone();
        move || {
            log::warn!("received Ctrl-C, stopping after the current frame");
            cancel.store(true, Ordering::SeqCst);
        }
    })?;

    // Nothing is written to disk until the reference and frame source check out.
    let reference = load_reference(&args.reference)?;
    let tracker = params.build_tracker(&gray_view(&reference))?;
    let source = ImageSequenceSource::open(&args.frames)?;
    let mut report = TrackReport::new(
        args.reference.display().to_string(),
        tracker.reference().keypoints().len(),
    );

    let outcome = match &args.output {
        Some(dir) => {
            let sink = AnnotatingSink::new(dir, params.overlay.clone())?;
            track(&args, tracker, source, sink, cancel, &mut report)
        }
        None => track(&args, tracker, source, NullSink, cancel, &mut report),
    };

    log::info!(
        "target found in {}/{} frames",
        report.found_frames(),
        report.frames.len()
    );
    if let Some(path) = &args.report {
        report.write_json(path)?;
        log::info!("report written to {}", path.display());
    }
    outcome?;
    Ok(())
}
