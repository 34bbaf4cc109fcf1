use std::path::PathBuf;

/// Errors that stop tracking.
///
/// Per-frame faults (too few matches, failed fits, degenerate projections)
/// are not errors; they surface as [`crate::TrackingResult::NotFound`].
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("failed to load reference image {path}: {source}")]
    ReferenceLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("reference image yields no descriptors")]
    NoReferenceDescriptors,

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("frame render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] planar_track_core::ImageError),
}
