//! Steered 128-bit binary descriptors computed over blurred pyramid
//! levels. Each level is blurred once into a working copy; every keypoint
//! on the level samples that same copy.

use imageproc::filter::separable_filter;
use orbx_core::{Descriptor, Keypoint, PyramidImage, DESCRIPTOR_SIZE};
use rayon::prelude::*;

pub mod pattern;

pub use pattern::SAMPLING_PATTERN;

/// Normalized 1-D Gaussian with the given sigma and radius.
fn gaussian_kernel(sigma: f32, radius: i32) -> Vec<f32> {
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Blur a level into the working copy descriptors sample from: a 7-tap
/// sigma-2 separable Gaussian over the padded buffer.
pub fn blur_working_copy(level: &PyramidImage) -> PyramidImage {
    let kernel = gaussian_kernel(2.0, 3);
    let blurred = separable_filter(level.padded(), &kernel, &kernel);
    PyramidImage::from_padded(blurred, level.border())
}

/// Descriptor for one keypoint: each pattern row contributes one bit,
/// comparing the intensities at its two offsets rotated by the keypoint
/// angle. A zero angle (orientation disabled) makes the rotation the
/// identity.
pub fn steered_descriptor(img: &PyramidImage, kp: &Keypoint) -> Descriptor {
    let angle = kp.angle.to_radians();
    let (sin_a, cos_a) = angle.sin_cos();
    let cx = kp.x.round() as i32;
    let cy = kp.y.round() as i32;

    let sample = |dx: i8, dy: i8| -> u8 {
        let (px, py) = (dx as f32, dy as f32);
        let col = (px * cos_a - py * sin_a).round() as i32;
        let row = (px * sin_a + py * cos_a).round() as i32;
        img.get(cx + col, cy + row)
    };

    let mut desc = [0u8; DESCRIPTOR_SIZE];
    for (byte, rows) in desc.iter_mut().zip(SAMPLING_PATTERN.chunks(8)) {
        for (bit, row) in rows.iter().enumerate() {
            let [x0, y0, x1, y1] = *row;
            if sample(x0, y0) < sample(x1, y1) {
                *byte |= 1 << bit;
            }
        }
    }
    desc
}

/// Descriptors for every keypoint of one level, in keypoint order.
pub fn compute_descriptors(img: &PyramidImage, keypoints: &[Keypoint]) -> Vec<Descriptor> {
    keypoints
        .par_iter()
        .map(|kp| steered_descriptor(img, kp))
        .collect()
}
