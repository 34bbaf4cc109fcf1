//! JSON-loadable configuration for the whole tracker.

use crate::{MatchFilterParams, PresenceGateParams, ReferenceTarget, TrackError, Tracker};
use planar_track_core::{GrayImageView, RansacEstimator, RansacParams};
use planar_track_features::{BruteForceMatcher, PatchDescriptorParams, PatchDescriptorProvider};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Style of the outline drawn on annotated frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// RGB line colour.
    pub color: [u8; 3],
    /// Line thickness in pixels.
    pub thickness: u32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            thickness: 4,
        }
    }
}

/// All tunables. Every field is optional in JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    pub filter: MatchFilterParams,
    pub gate: PresenceGateParams,
    pub features: PatchDescriptorParams,
    pub ransac: RansacParams,
    pub overlay: OverlayParams,
}

/// Tracker built from the bundled collaborators.
pub type DefaultTracker = Tracker<PatchDescriptorProvider, BruteForceMatcher, RansacEstimator>;

impl TrackerParams {
    /// Load parameters from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write parameters as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Describe `reference` and assemble a tracker with the bundled collaborators.
    pub fn build_tracker(
        &self,
        reference: &GrayImageView<'_>,
    ) -> Result<DefaultTracker, TrackError> {
        let provider = PatchDescriptorProvider::new(self.features.clone());
        let target = ReferenceTarget::from_image(reference, &provider)?;
        Ok(Tracker::new(
            target,
            provider,
            BruteForceMatcher,
            RansacEstimator::new(self.ransac.clone()),
        )
        .with_filter(self.filter.clone())
        .with_gate(self.gate.clone()))
    }
}
