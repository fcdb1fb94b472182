//! Multi-scale keypoint detection: image pyramid construction, grid-cell
//! FAST candidate collection, quad-tree spatial redistribution and
//! intensity-centroid orientation estimation.

pub mod config;
pub mod detector;
pub mod distribute;
pub mod error;
pub mod grid;
pub mod orientation;
pub mod pyramid;

pub use config::ExtractorBuilder;
pub use detector::KeypointDetector;
pub use error::{ExtractError, ExtractResult};
pub use pyramid::PyramidBuilder;
