use image::imageops::crop_imm;
use imageproc::corners::{corners_fast9, Corner};
use orbx_core::{Keypoint, PyramidImage, EDGE_THRESHOLD};
use std::collections::HashMap;

/// Grid cell edge in pixels; cells partition the usable sub-rectangle.
pub const CELL_SIZE: i32 = 35;

/// Margin of the usable sub-rectangle inside each level, three pixels
/// tighter than the padded border so the segment-test circle of a corner on
/// the margin still reads valid pixels.
pub const DETECTION_MARGIN: i32 = EDGE_THRESHOLD as i32 - 3;

/// Per-cell corner detection over one pyramid level. Each cell runs the
/// segment test at `ini_threshold` first and falls back to `min_threshold`
/// when the cell comes up empty, so low-contrast regions still contribute
/// coverage. Returned coordinates are relative to the usable
/// sub-rectangle's origin.
pub fn detect_in_cells(
    level: &PyramidImage,
    ini_threshold: u8,
    min_threshold: u8,
) -> Vec<Keypoint> {
    let min_border_x = DETECTION_MARGIN;
    let min_border_y = DETECTION_MARGIN;
    let max_border_x = level.width() as i32 - DETECTION_MARGIN;
    let max_border_y = level.height() as i32 - DETECTION_MARGIN;

    let width = max_border_x - min_border_x;
    let height = max_border_y - min_border_y;
    if width <= 0 || height <= 0 {
        return Vec::new();
    }

    let n_cols = (width / CELL_SIZE).max(1);
    let n_rows = (height / CELL_SIZE).max(1);
    let w_cell = (width as f32 / n_cols as f32).ceil() as i32;
    let h_cell = (height as f32 / n_rows as f32).ceil() as i32;

    let mut candidates = Vec::new();

    for i in 0..n_rows {
        let ini_y = min_border_y + i * h_cell;
        if ini_y >= max_border_y - 3 {
            continue;
        }
        // windows overlap their right/bottom neighbors by 6 px so corners on
        // cell seams keep their full test circle
        let max_y = (ini_y + h_cell + 6).min(max_border_y);

        for j in 0..n_cols {
            let ini_x = min_border_x + j * w_cell;
            if ini_x >= max_border_x - 6 {
                continue;
            }
            let max_x = (ini_x + w_cell + 6).min(max_border_x);

            let cell_w = (max_x - ini_x) as u32;
            let cell_h = (max_y - ini_y) as u32;
            if cell_w < 7 || cell_h < 7 {
                // too small for the radius-3 test circle
                continue;
            }

            let cell = crop_imm(
                level.padded(),
                (ini_x + level.border() as i32) as u32,
                (ini_y + level.border() as i32) as u32,
                cell_w,
                cell_h,
            )
            .to_image();

            let mut corners = corners_fast9(&cell, ini_threshold);
            if corners.is_empty() {
                corners = corners_fast9(&cell, min_threshold);
            }

            for corner in suppress_non_max(&corners) {
                candidates.push(Keypoint {
                    x: (corner.x as i32 + j * w_cell) as f32,
                    y: (corner.y as i32 + i * h_cell) as f32,
                    response: corner.score,
                    ..Keypoint::default()
                });
            }
        }
    }

    candidates
}

/// 3x3 non-maximum suppression over segment-test scores; on equal scores
/// the raster-earlier corner wins.
fn suppress_non_max(corners: &[Corner]) -> Vec<Corner> {
    if corners.len() < 2 {
        return corners.to_vec();
    }
    let scores: HashMap<(u32, u32), f32> =
        corners.iter().map(|c| ((c.x, c.y), c.score)).collect();

    corners
        .iter()
        .filter(|c| {
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = c.x as i64 + dx;
                    let ny = c.y as i64 + dy;
                    if nx < 0 || ny < 0 {
                        continue;
                    }
                    if let Some(&s) = scores.get(&(nx as u32, ny as u32)) {
                        if s > c.score || (s == c.score && (ny as u32, nx as u32) < (c.y, c.x)) {
                            return false;
                        }
                    }
                }
            }
            true
        })
        .copied()
        .collect()
}
