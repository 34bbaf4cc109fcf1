//! Image-file frame sources and sinks.

use crate::{draw_polygon, FrameSink, FrameSource, OverlayParams, TrackError};
use image::{ImageReader, Rgb, RgbImage};
use nalgebra::Point2;
use planar_track_core::GrayImageView;
use std::{
    fs,
    path::{Path, PathBuf},
};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(img: &image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Read the reference image as 8-bit grayscale.
pub fn load_reference(path: impl AsRef<Path>) -> Result<image::GrayImage, TrackError> {
    let path = path.as_ref();
    let decoded = ImageReader::open(path)
        .map_err(image::ImageError::IoError)
        .and_then(|r| r.decode())
        .map_err(|source| TrackError::ReferenceLoad {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(decoded.to_luma8())
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Finite frame stream read from image files in a directory.
///
/// Files are visited in lexicographic path order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    /// List the frame files in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, TrackError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if is_frame_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        log::info!("{} frames in {}", paths.len(), dir.display());
        Ok(Self::from_paths(paths))
    }

    /// Use an explicit list of frame files, in the given order.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, TrackError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let img = ImageReader::open(path)
            .map_err(image::ImageError::IoError)
            .and_then(|r| r.decode())
            .map_err(|e| TrackError::Capture(format!("{}: {e}", path.display())))?;
        Ok(Some(img.to_rgb8()))
    }
}

/// Writes every frame as PNG with the target outline drawn on it.
#[derive(Debug)]
pub struct AnnotatingSink {
    dir: PathBuf,
    overlay: OverlayParams,
    written: usize,
}

impl AnnotatingSink {
    /// Create `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, overlay: OverlayParams) -> Result<Self, TrackError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            overlay,
            written: 0,
        })
    }

    /// Number of frames written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for AnnotatingSink {
    fn render(
        &mut self,
        frame: &RgbImage,
        corners: Option<&[Point2<f32>; 4]>,
    ) -> Result<(), TrackError> {
        let mut out = frame.clone();
        if let Some(corners) = corners {
            draw_polygon(
                &mut out,
                corners,
                Rgb(self.overlay.color),
                self.overlay.thickness,
            );
        }
        let path = self.dir.join(format!("frame_{:06}.png", self.written));
        out.save(&path)
            .map_err(|e| TrackError::Render(format!("{}: {e}", path.display())))?;
        self.written += 1;
        Ok(())
    }
}

/// Discards frames; for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn render(
        &mut self,
        _frame: &RgbImage,
        _corners: Option<&[Point2<f32>; 4]>,
    ) -> Result<(), TrackError> {
        Ok(())
    }
}
