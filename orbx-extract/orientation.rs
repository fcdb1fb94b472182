use orbx_core::{Keypoint, PyramidImage};

/// Nominal descriptor patch diameter at level 0.
pub const PATCH_SIZE: i32 = 31;
/// Radius of the circular orientation patch.
pub const HALF_PATCH_SIZE: i32 = 15;

/// Per-row half-spans of the discretized circular patch, indexed by |v| in
/// [0, half_patch]. Built once per detector; the backward pass forces the
/// octant symmetry the rounded radii alone would miss, which keeps the
/// spans mirror-symmetric and monotone away from the center row.
pub fn circular_patch_spans(half_patch: i32) -> Vec<i32> {
    let mut spans = vec![0i32; (half_patch + 1) as usize];

    let v_max = (half_patch as f64 * std::f64::consts::FRAC_1_SQRT_2 + 1.0).floor() as i32;
    let v_min = (half_patch as f64 * std::f64::consts::FRAC_1_SQRT_2).ceil() as i32;
    let hp2 = (half_patch * half_patch) as f64;
    for v in 0..=v_max {
        spans[v as usize] = (hp2 - (v * v) as f64).sqrt().round() as i32;
    }

    let mut v0 = 0usize;
    for v in (v_min..=half_patch).rev() {
        while spans[v0] == spans[v0 + 1] {
            v0 += 1;
        }
        spans[v as usize] = v0 as i32;
        v0 += 1;
    }
    spans
}

/// Intensity-centroid orientation for one keypoint: the angle of the first
/// moment of the circular patch around the (pixel-rounded) position, in
/// degrees on the atan2 branch.
pub fn intensity_centroid_angle(img: &PyramidImage, x: f32, y: f32, spans: &[i32]) -> f32 {
    let cx = x.round() as i32;
    let cy = y.round() as i32;

    let mut m_10 = 0i32;
    let mut m_01 = 0i32;

    // center row, v = 0
    for u in -HALF_PATCH_SIZE..=HALF_PATCH_SIZE {
        m_10 += u * img.get(cx + u, cy) as i32;
    }

    // remaining rows in symmetric pairs
    for v in 1..=HALF_PATCH_SIZE {
        let d = spans[v as usize];
        let mut v_sum = 0i32;
        for u in -d..=d {
            let val_plus = img.get(cx + u, cy + v) as i32;
            let val_minus = img.get(cx + u, cy - v) as i32;
            v_sum += val_plus - val_minus;
            m_10 += u * (val_plus + val_minus);
        }
        m_01 += v * v_sum;
    }

    (m_01 as f32).atan2(m_10 as f32).to_degrees()
}

/// Stamp every keypoint's dominant orientation in place.
pub fn compute_orientations(img: &PyramidImage, keypoints: &mut [Keypoint], spans: &[i32]) {
    for kp in keypoints {
        kp.angle = intensity_centroid_angle(img, kp.x, kp.y, spans);
    }
}
