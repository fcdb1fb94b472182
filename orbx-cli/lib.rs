//! High-level multi-scale ORB extraction: drives pyramid construction,
//! per-level detection and description, and merges per-level results into
//! one keypoint/descriptor set with an optional dual-camera overlap split.

use image::GrayImage;
use orbx_core::{
    init_thread_pool, scale_levels, Descriptor, ExtractorConfig, Keypoint, ScaleLevel,
    DESCRIPTOR_SIZE,
};
use orbx_extract::{config, ExtractError, KeypointDetector, PyramidBuilder};
use rayon::prelude::*;

pub use orbx_core::{
    self, Descriptor as OrbDescriptor, ExtractorConfig as Config, Keypoint as OrbKeypoint,
};
pub use orbx_extract::ExtractorBuilder;

#[derive(Debug)]
pub enum OrbError {
    Extract(ExtractError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for OrbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrbError::Extract(e) => write!(f, "Extraction error: {}", e),
            OrbError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for OrbError {}

impl From<ExtractError> for OrbError {
    fn from(err: ExtractError) -> Self {
        OrbError::Extract(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for OrbError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        OrbError::ThreadPool(err)
    }
}

pub type OrbResult<T> = Result<T, OrbError>;

/// Full extraction output. Keypoints and descriptors pair 1:1 by index.
/// Mono keypoints occupy `[0, mono_count)` in detection order; overlap-band
/// keypoints occupy `[mono_count, len)` in reverse detection order.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
    pub mono_count: usize,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Keypoint/descriptor slices outside the overlap band.
    pub fn mono(&self) -> (&[Keypoint], &[Descriptor]) {
        (
            &self.keypoints[..self.mono_count],
            &self.descriptors[..self.mono_count],
        )
    }

    /// Keypoint/descriptor slices inside the overlap band.
    pub fn overlap(&self) -> (&[Keypoint], &[Descriptor]) {
        (
            &self.keypoints[self.mono_count..],
            &self.descriptors[self.mono_count..],
        )
    }
}

/// Multi-scale ORB extractor. Configuration is validated once at
/// construction; extraction itself never fails — an empty input image
/// produces an empty result.
pub struct OrbExtractor {
    cfg: ExtractorConfig,
    levels: Vec<ScaleLevel>,
    detector: KeypointDetector,
}

impl OrbExtractor {
    pub fn new(cfg: ExtractorConfig) -> OrbResult<Self> {
        config::validate(&cfg)?;
        init_thread_pool(cfg.n_threads)?;
        let levels = scale_levels(&cfg);
        let detector = KeypointDetector::new(&cfg);
        Ok(Self {
            cfg,
            levels,
            detector,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }

    /// Per-level scale factors and sigma weights for downstream matchers.
    pub fn scale_levels(&self) -> &[ScaleLevel] {
        &self.levels
    }

    /// Extract keypoints and descriptors. The mask is accepted for detector
    /// API compatibility and is not consulted.
    pub fn extract(&self, image: &GrayImage, mask: Option<&GrayImage>) -> Extraction {
        self.extract_impl(image, mask, None)
    }

    /// Dual-camera variant: keypoints whose level-0 x-coordinate falls in
    /// `[band[0], band[1]]` are packed at the tail of the output;
    /// `mono_count` tells the caller where the split sits.
    pub fn extract_dual(
        &self,
        image: &GrayImage,
        mask: Option<&GrayImage>,
        overlap_band: [f32; 2],
    ) -> Extraction {
        self.extract_impl(image, mask, Some(overlap_band))
    }

    fn extract_impl(
        &self,
        image: &GrayImage,
        _mask: Option<&GrayImage>,
        overlap_band: Option<[f32; 2]>,
    ) -> Extraction {
        if image.width() == 0 || image.height() == 0 {
            return Extraction::default();
        }

        let pyramid = PyramidBuilder::build(image, &self.levels, self.cfg.interpolation);
        let per_level = self.detector.detect(&pyramid, &self.levels);

        // each level blurs its own working copy and describes its
        // keypoints; collection is by level index, not completion order
        let described: Vec<(Vec<Keypoint>, Vec<Descriptor>)> = per_level
            .into_par_iter()
            .enumerate()
            .map(|(level, keypoints)| {
                if keypoints.is_empty() {
                    return (keypoints, Vec::new());
                }
                let working = orbx_brief::blur_working_copy(&pyramid[level]);
                let descriptors = orbx_brief::compute_descriptors(&working, &keypoints);
                (keypoints, descriptors)
            })
            .collect();

        let total: usize = described.iter().map(|(kps, _)| kps.len()).sum();
        let mut keypoints = vec![Keypoint::default(); total];
        let mut descriptors = vec![[0u8; DESCRIPTOR_SIZE]; total];

        // mono keypoints fill from the head, overlap-band ones from the
        // tail, producing two disjoint contiguous ranges in one pass
        let mut head = 0usize;
        let mut tail = total;
        for (level, (level_keypoints, level_descriptors)) in described.into_iter().enumerate() {
            let scale = self.levels[level].scale;
            for (mut kp, desc) in level_keypoints.into_iter().zip(level_descriptors) {
                if level != 0 {
                    kp.x *= scale;
                    kp.y *= scale;
                }
                let in_band = overlap_band.is_some_and(|[x0, x1]| kp.x >= x0 && kp.x <= x1);
                if in_band {
                    tail -= 1;
                    keypoints[tail] = kp;
                    descriptors[tail] = desc;
                } else {
                    keypoints[head] = kp;
                    descriptors[head] = desc;
                    head += 1;
                }
            }
        }

        Extraction {
            keypoints,
            descriptors,
            mono_count: head,
        }
    }
}
