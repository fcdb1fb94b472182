use image::{ImageReader, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_circle_mut;
use orbx_cli::{Config, OrbExtractor};
use std::time::Instant;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "input.png".to_string());

    // Load grayscale image
    let img = ImageReader::open(&path)
        .expect("Image not found")
        .decode()
        .expect("Decode failed")
        .to_luma8();

    let extractor = OrbExtractor::new(Config::default()).expect("Invalid configuration");

    // Time the full pipeline
    let t0 = Instant::now();
    let result = extractor.extract(&img, None);
    let elapsed = t0.elapsed();

    println!("Time taken: {:.2?}", elapsed);
    println!(
        "Extracted {} keypoints across {} pyramid levels",
        result.len(),
        extractor.scale_levels().len()
    );

    // Convert image to RGBA for drawing
    let mut output: RgbaImage = image::DynamicImage::ImageLuma8(img).into_rgba8();

    // Draw red circles, radius growing with the detection level
    for kp in &result.keypoints {
        draw_hollow_circle_mut(
            &mut output,
            (kp.x as i32, kp.y as i32),
            2 + kp.octave as i32,
            Rgba([255, 0, 0, 255]),
        );
    }

    // Save result
    output
        .save("keypoints.png")
        .expect("Failed to save output image");
    println!("Saved result image as keypoints.png");
}
