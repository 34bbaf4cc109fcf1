//! Feature extraction and matching for `planar-track`.
//!
//! - [`FastDetector`]: `imageproc` FAST corners with non-maximum suppression.
//! - [`PatchDescriptorProvider`]: FAST keypoints described by zero-mean,
//!   unit-norm intensity patches. Implements
//!   [`planar_track_core::DescriptorProvider`].
//! - [`BruteForceMatcher`]: exhaustive L2 nearest neighbour. Implements
//!   [`planar_track_core::CorrespondenceMatcher`].
//!
//! ```
//! use planar_track_core::{CorrespondenceMatcher, DescriptorProvider, GrayImage};
//! use planar_track_features::{BruteForceMatcher, PatchDescriptorProvider};
//!
//! let img = GrayImage::from_raw(64, 64, vec![0; 64 * 64]).unwrap();
//! let provider = PatchDescriptorProvider::default();
//! let features = provider.extract(&img.view());
//! let matches = BruteForceMatcher.match_descriptors(&features.descriptors, &features.descriptors);
//! assert_eq!(matches.len(), features.len());
//! ```

mod descriptor;
mod fast;
mod matcher;

pub use descriptor::{PatchDescriptorParams, PatchDescriptorProvider};
pub use fast::{FastDetector, FastParams, FastVariant};
pub use matcher::BruteForceMatcher;
