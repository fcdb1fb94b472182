use image::imageops::{self, FilterType};
use image::GrayImage;
use orbx_core::{Interpolation, PyramidImage, ScaleLevel, EDGE_THRESHOLD};

/// Multi-scale image pyramid construction.
pub struct PyramidBuilder;

impl PyramidBuilder {
    /// Build one padded image per scale level. Level i's nominal size is
    /// round(base size x inv_scale[i]); level i > 0 resamples level i-1's
    /// unpadded image, so padding never reads across a previous border.
    pub fn build(
        base: &GrayImage,
        levels: &[ScaleLevel],
        interpolation: Interpolation,
    ) -> Vec<PyramidImage> {
        let filter = filter_type(interpolation);
        let (base_w, base_h) = base.dimensions();

        let mut pyramid = Vec::with_capacity(levels.len());
        let mut current = base.clone();
        for (i, level) in levels.iter().enumerate() {
            if i > 0 {
                let w = ((base_w as f32 * level.inv_scale).round() as u32).max(1);
                let h = ((base_h as f32 * level.inv_scale).round() as u32).max(1);
                current = imageops::resize(&current, w, h, filter);
            }
            pyramid.push(PyramidImage::from_unpadded(&current, EDGE_THRESHOLD));
        }
        pyramid
    }
}

fn filter_type(interpolation: Interpolation) -> FilterType {
    match interpolation {
        Interpolation::Nearest => FilterType::Nearest,
        Interpolation::Bilinear => FilterType::Triangle,
        Interpolation::CatmullRom => FilterType::CatmullRom,
        Interpolation::Lanczos3 => FilterType::Lanczos3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbx_core::{scale_levels, ExtractorConfig};

    fn gradient_image(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| image::Luma([(x * 3 + y * 5) as u8]))
    }

    #[test]
    fn level_zero_matches_base_exactly() {
        let base = gradient_image(120, 90);
        let levels = scale_levels(&ExtractorConfig::default());
        let pyramid = PyramidBuilder::build(&base, &levels, Interpolation::Bilinear);

        assert_eq!(pyramid.len(), levels.len());
        assert_eq!(pyramid[0].width(), 120);
        assert_eq!(pyramid[0].height(), 90);
        assert_eq!(pyramid[0].inner(), base);
    }

    #[test]
    fn level_sizes_follow_inverse_cumulative_scale() {
        let base = gradient_image(640, 480);
        let levels = scale_levels(&ExtractorConfig::default());
        let pyramid = PyramidBuilder::build(&base, &levels, Interpolation::Bilinear);

        for (img, level) in pyramid.iter().zip(&levels) {
            let expected_w = (640.0 * level.inv_scale).round() as u32;
            let expected_h = (480.0 * level.inv_scale).round() as u32;
            assert_eq!(img.width(), expected_w);
            assert_eq!(img.height(), expected_h);
        }
    }

    #[test]
    fn levels_are_padded_by_the_fixed_border() {
        let base = gradient_image(100, 80);
        let levels = scale_levels(&ExtractorConfig::default());
        let pyramid = PyramidBuilder::build(&base, &levels, Interpolation::Bilinear);

        for img in &pyramid {
            assert_eq!(img.border(), EDGE_THRESHOLD);
            assert_eq!(img.padded().width(), img.width() + 2 * EDGE_THRESHOLD);
            assert_eq!(img.padded().height(), img.height() + 2 * EDGE_THRESHOLD);
        }
    }

    #[test]
    fn tiny_base_survives_deep_pyramids() {
        let base = gradient_image(5, 4);
        let levels = scale_levels(&ExtractorConfig {
            n_levels: 12,
            ..ExtractorConfig::default()
        });
        let pyramid = PyramidBuilder::build(&base, &levels, Interpolation::Bilinear);
        assert_eq!(pyramid.len(), 12);
        for img in &pyramid {
            assert!(img.width() >= 1 && img.height() >= 1);
        }
    }

    #[test]
    fn interpolation_modes_resolve_to_distinct_filters() {
        let base = gradient_image(64, 64);
        let levels = scale_levels(&ExtractorConfig {
            n_levels: 2,
            ..ExtractorConfig::default()
        });
        // nearest and bilinear should genuinely differ on a gradient
        let nearest = PyramidBuilder::build(&base, &levels, Interpolation::Nearest);
        let bilinear = PyramidBuilder::build(&base, &levels, Interpolation::Bilinear);
        assert_ne!(nearest[1].inner(), bilinear[1].inner());
    }
}
