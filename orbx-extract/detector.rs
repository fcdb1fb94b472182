use crate::{distribute, grid, orientation};
use orbx_core::{ExtractorConfig, Keypoint, PyramidImage, ScaleLevel};
use rayon::prelude::*;

/// Per-level keypoint detection driver: grid candidate collection,
/// quad-tree redistribution, coordinate/octave/size stamping and optional
/// orientation estimation.
pub struct KeypointDetector {
    ini_threshold: u8,
    min_threshold: u8,
    orientation: bool,
    patch_spans: Vec<i32>,
}

impl KeypointDetector {
    pub fn new(cfg: &ExtractorConfig) -> Self {
        Self {
            ini_threshold: cfg.ini_threshold,
            min_threshold: cfg.min_threshold,
            orientation: cfg.orientation,
            patch_spans: orientation::circular_patch_spans(orientation::HALF_PATCH_SIZE),
        }
    }

    /// Detect on every pyramid level. Levels run on the rayon pool and are
    /// collected by level index, so the result is deterministic regardless
    /// of completion order.
    pub fn detect(&self, pyramid: &[PyramidImage], levels: &[ScaleLevel]) -> Vec<Vec<Keypoint>> {
        (0..levels.len())
            .into_par_iter()
            .map(|level| self.detect_level(&pyramid[level], &levels[level], level))
            .collect()
    }

    fn detect_level(&self, img: &PyramidImage, scale: &ScaleLevel, level: usize) -> Vec<Keypoint> {
        let raw = grid::detect_in_cells(img, self.ini_threshold, self.min_threshold);

        let usable_w = img.width() as i32 - 2 * grid::DETECTION_MARGIN;
        let usable_h = img.height() as i32 - 2 * grid::DETECTION_MARGIN;
        let mut keypoints =
            distribute::distribute_quadtree(raw, usable_w, usable_h, scale.n_features);

        let margin = grid::DETECTION_MARGIN as f32;
        let size = orientation::PATCH_SIZE as f32 * scale.scale;
        for kp in &mut keypoints {
            kp.x += margin;
            kp.y += margin;
            kp.octave = level;
            kp.size = size;
        }

        if self.orientation {
            orientation::compute_orientations(img, &mut keypoints, &self.patch_spans);
        }
        keypoints
    }
}
