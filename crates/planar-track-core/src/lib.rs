//! Core types and utilities for planar target tracking.
//!
//! Images, keypoints, descriptors, homographies and RANSAC, plus the minimal
//! logger. No concrete detector, matcher or image codec lives here; those
//! plug in through [`DescriptorProvider`], [`CorrespondenceMatcher`] and
//! [`TransformEstimator`].

mod collab;
mod features;
mod homography;
mod image;
mod logger;
mod ransac;

pub use collab::{CorrespondenceMatcher, DescriptorProvider, TransformEstimator};
pub use features::{Correspondence, Descriptors, Features, Keypoint};
pub use homography::{estimate_homography, homography_from_4pt, Homography, HomographyError};
pub use image::{sample_bilinear, GrayImage, GrayImageView, ImageError};
pub use ransac::{fit_homography_ransac, RansacEstimator, RansacFit, RansacParams};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
