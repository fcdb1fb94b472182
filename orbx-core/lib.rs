//! Shared vocabulary for the extraction workspace: keypoints, descriptors,
//! configuration, the per-level scale schedule and the border-padded
//! pyramid image buffer.

use image::GrayImage;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Border reserved on every side of a pyramid level so orientation and
/// descriptor sampling windows never leave the buffer.
pub const EDGE_THRESHOLD: u32 = 19;

/// Descriptor width in bytes (128 binary tests).
pub const DESCRIPTOR_SIZE: usize = 16;

/// 128-bit binary descriptor.
pub type Descriptor = [u8; DESCRIPTOR_SIZE];

/// Scale-space keypoint with corner response and dominant orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Corner response score from the segment test.
    pub response: f32,
    /// Dominant orientation in degrees; 0.0 when orientation is disabled.
    pub angle: f32,
    /// Pyramid level the keypoint was detected on.
    pub octave: usize,
    /// Nominal patch diameter, scaled by the level's scale factor.
    pub size: f32,
}

/// Interpolation used when resampling pyramid levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Bilinear
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractorConfig {
    /// Total keypoint budget across all pyramid levels.
    pub n_features: usize,
    /// Scale growth per level; must be > 1.0, images shrink as levels deepen.
    pub scale_factor: f32,
    pub n_levels: usize,
    /// Segment-test threshold tried first in every grid cell.
    pub ini_threshold: u8,
    /// Fallback threshold for cells the initial threshold leaves empty.
    pub min_threshold: u8,
    pub interpolation: Interpolation,
    /// Estimate a dominant orientation per keypoint; descriptors are steered
    /// by it. Disabling leaves angles at 0.0 (identity steering).
    pub orientation: bool,
    /// Worker threads for the global pool; 0 keeps rayon's default.
    pub n_threads: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            n_features: 500,
            scale_factor: 1.2,
            n_levels: 8,
            ini_threshold: 20,
            min_threshold: 7,
            interpolation: Interpolation::Bilinear,
            orientation: true,
            n_threads: 0,
        }
    }
}

/// Per-level scale parameters exposed to downstream matchers.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleLevel {
    pub scale: f32,
    pub inv_scale: f32,
    /// Squared scale; the uncertainty weight matchers apply to this level.
    pub sigma2: f32,
    pub inv_sigma2: f32,
    /// Candidate budget for the spatial distributor on this level.
    pub n_features: usize,
}

/// Builds the scale schedule. Scales grow geometrically from 1.0; the
/// feature budget shrinks geometrically with level so coarse levels get
/// more candidates, and the last level absorbs the rounding remainder so
/// the budgets sum to `cfg.n_features` exactly.
pub fn scale_levels(cfg: &ExtractorConfig) -> Vec<ScaleLevel> {
    let mut levels = Vec::with_capacity(cfg.n_levels);

    let factor = 1.0 / cfg.scale_factor;
    let mut desired =
        cfg.n_features as f32 * (1.0 - factor) / (1.0 - factor.powi(cfg.n_levels as i32));

    let mut scale = 1.0f32;
    let mut assigned = 0usize;
    for level in 0..cfg.n_levels {
        if level > 0 {
            scale *= cfg.scale_factor;
        }
        let n_features = if level + 1 < cfg.n_levels {
            desired.round() as usize
        } else {
            cfg.n_features.saturating_sub(assigned)
        };
        assigned += n_features;
        desired *= factor;

        let sigma2 = scale * scale;
        levels.push(ScaleLevel {
            scale,
            inv_scale: 1.0 / scale,
            sigma2,
            inv_sigma2: 1.0 / sigma2,
            n_features,
        });
    }
    levels
}

/// One pyramid level: an 8-bit intensity buffer with a mirrored border so
/// sampling windows can run past the nominal bounds without bounds checks.
#[derive(Debug, Clone)]
pub struct PyramidImage {
    padded: GrayImage,
    border: u32,
    width: u32,
    height: u32,
}

impl PyramidImage {
    /// Pads `inner` on all four sides with reflected pixels (mirrored
    /// without duplicating the edge row/column).
    pub fn from_unpadded(inner: &GrayImage, border: u32) -> Self {
        let (w, h) = inner.dimensions();
        let padded = GrayImage::from_fn(w + 2 * border, h + 2 * border, |px, py| {
            let x = reflect_101(px as i64 - border as i64, w as i64);
            let y = reflect_101(py as i64 - border as i64, h as i64);
            *inner.get_pixel(x as u32, y as u32)
        });
        Self {
            padded,
            border,
            width: w,
            height: h,
        }
    }

    /// Wraps an already padded buffer, e.g. a blurred working copy.
    pub fn from_padded(padded: GrayImage, border: u32) -> Self {
        let (pw, ph) = padded.dimensions();
        assert!(pw > 2 * border && ph > 2 * border, "buffer smaller than its border");
        Self {
            padded,
            border,
            width: pw - 2 * border,
            height: ph - 2 * border,
        }
    }

    /// Nominal (unpadded) width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Nominal (unpadded) height.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    pub fn padded(&self) -> &GrayImage {
        &self.padded
    }

    /// Intensity at nominal coordinates; anything down to `-border` (and up
    /// to `dim + border - 1`) is valid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let px = (x + self.border as i32) as u32;
        let py = (y + self.border as i32) as u32;
        self.padded.get_pixel(px, py).0[0]
    }

    /// Copy of the unpadded interior.
    pub fn inner(&self) -> GrayImage {
        image::imageops::crop_imm(&self.padded, self.border, self.border, self.width, self.height)
            .to_image()
    }
}

/// Reflect-without-edge index mapping: `gfedcb|abcdefgh|gfedcb`.
fn reflect_101(mut i: i64, n: i64) -> i64 {
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i;
        }
    }
}

/// Initialize the global rayon pool with `n_threads` workers. Zero leaves
/// rayon's default pool untouched.
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    if n_threads == 0 {
        return Ok(());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
