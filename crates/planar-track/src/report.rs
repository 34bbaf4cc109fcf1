//! Per-frame and per-run tracking summaries.

use crate::{TrackError, TrackingResult};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// What happened on one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Zero-based position in the frame stream.
    pub index: usize,
    /// Correspondences before filtering.
    pub matches: usize,
    /// Correspondences that passed the quality filter.
    pub good_matches: usize,
    /// Filter threshold; absent when the frame had no matches.
    pub threshold: Option<f32>,
    pub result: TrackingResult,
}

/// Summary of a whole tracking run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackReport {
    pub reference: String,
    pub reference_keypoints: usize,
    pub frames: Vec<FrameReport>,
}

impl TrackReport {
    pub fn new(reference: impl Into<String>, reference_keypoints: usize) -> Self {
        Self {
            reference: reference.into(),
            reference_keypoints,
            frames: Vec::new(),
        }
    }

    /// Number of frames where the target was found.
    pub fn found_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.result.is_found()).count()
    }

    /// Load a report from JSON.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn counts_found_frames_and_survives_disk() {
        let mut report = TrackReport::new("ref.png", 120);
        report.frames.push(FrameReport {
            index: 0,
            matches: 120,
            good_matches: 4,
            threshold: Some(0.02),
            result: TrackingResult::NotFound,
        });
        report.frames.push(FrameReport {
            index: 1,
            matches: 120,
            good_matches: 40,
            threshold: Some(0.05),
            result: TrackingResult::Found([Point2::new(1.0, 2.0); 4]),
        });
        assert_eq!(report.found_frames(), 1);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        report.write_json(&path).expect("write");
        let back = TrackReport::load_json(&path).expect("load");
        assert_eq!(back.frames, report.frames);
        assert_eq!(back.reference, "ref.png");
    }
}
