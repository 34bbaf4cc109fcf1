use serde::{Deserialize, Serialize};

/// Minimum-support gate in front of homography estimation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceGateParams {
    /// The target is present only with strictly more good matches than this.
    pub min_matches: usize,
}

impl Default for PresenceGateParams {
    fn default() -> Self {
        Self { min_matches: 8 }
    }
}

impl PresenceGateParams {
    /// Decide presence from the good-match count. Logs the count every call.
    pub fn is_present(&self, good_matches: usize) -> bool {
        log::info!("good matches: {good_matches}");
        good_matches > self.min_matches
    }
}
