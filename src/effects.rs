//! Local sketch filter: contour extraction plus a faint tonal detail pass,
//! producing the `<stem>_hand_drawn<ext>` sibling of the input image.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::adapter::EffectAdapter;
use crate::error::RestyleError;

const CONTOUR_SIGMA: f32 = 1.4;
const EDGE_GAIN: f32 = 1.6;
const DETAIL_BLEND: f32 = 0.25;

pub fn hand_drawn_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_hand_drawn.{ext}"),
        None => format!("{stem}_hand_drawn.png"),
    };
    input.with_file_name(name)
}

/// Renders dark contour strokes over lightened paper. Edges come from sobel
/// magnitude on a blurred luma plane; the original tone bleeds through at
/// `DETAIL_BLEND` strength so flat regions keep a hint of texture.
pub fn apply_hand_drawn(input: &Path) -> Result<PathBuf, RestyleError> {
    let source = image::open(input)?;
    let gray = source.to_luma8();
    let (width, height) = gray.dimensions();

    let blurred = gaussian_blur_f32(&gray, CONTOUR_SIGMA);
    let gx = horizontal_sobel(&blurred);
    let gy = vertical_sobel(&blurred);

    let mut magnitudes = vec![0f32; (width * height) as usize];
    let mut max_magnitude = f32::EPSILON;
    for y in 0..height {
        for x in 0..width {
            let dx = gx.get_pixel(x, y)[0] as f32;
            let dy = gy.get_pixel(x, y)[0] as f32;
            let magnitude = (dx * dx + dy * dy).sqrt();
            magnitudes[(y * width + x) as usize] = magnitude;
            max_magnitude = max_magnitude.max(magnitude);
        }
    }

    let mut sketch = GrayImage::new(width, height);
    for (x, y, pixel) in sketch.enumerate_pixels_mut() {
        let stroke = (magnitudes[(y * width + x) as usize] / max_magnitude * EDGE_GAIN).min(1.0);
        let base = gray.get_pixel(x, y)[0] as f32 / 255.0;
        let paper = 1.0 - DETAIL_BLEND * (1.0 - base);
        let value = paper * (1.0 - stroke);
        *pixel = Luma([(value * 255.0).round() as u8]);
    }

    let output = hand_drawn_output_path(input);
    sketch.save(&output)?;
    Ok(output)
}

/// The local branch of the restyle pipeline. The auxiliary prompt file is
/// part of the effect contract but the sketch filter has no use for its
/// contents.
#[derive(Default)]
pub struct SketchEffect;

impl EffectAdapter for SketchEffect {
    fn apply(&self, image_path: &Path, prompt_path: &Path) -> Result<PathBuf, RestyleError> {
        tracing::debug!(
            "applying sketch effect to {} (aux text {})",
            image_path.display(),
            prompt_path.display()
        );
        apply_hand_drawn(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_gradient_image(path: &Path) {
        let img = GrayImage::from_fn(32, 32, |x, _y| if x < 16 { Luma([20]) } else { Luma([230]) });
        img.save(path).expect("save image");
    }

    #[test]
    fn output_path_derives_from_the_input_stem() {
        assert_eq!(
            hand_drawn_output_path(Path::new("/tmp/cat.png")),
            PathBuf::from("/tmp/cat_hand_drawn.png")
        );
        assert_eq!(
            hand_drawn_output_path(Path::new("photo.jpeg")),
            PathBuf::from("photo_hand_drawn.jpeg")
        );
    }

    #[test]
    fn applies_the_effect_and_preserves_dimensions() {
        let temp = TempDir::new().expect("temp dir");
        let input = temp.path().join("scene.png");
        write_gradient_image(&input);

        let output = apply_hand_drawn(&input).expect("apply");

        assert_eq!(output, temp.path().join("scene_hand_drawn.png"));
        let rendered = image::open(&output).expect("open output").to_luma8();
        assert_eq!(rendered.dimensions(), (32, 32));
    }

    #[test]
    fn flat_images_come_out_as_blank_paper() {
        let temp = TempDir::new().expect("temp dir");
        let input = temp.path().join("flat.png");
        GrayImage::from_pixel(16, 16, Luma([255])).save(&input).expect("save");

        let output = apply_hand_drawn(&input).expect("apply");
        let rendered = image::open(&output).expect("open").to_luma8();
        let center = rendered.get_pixel(8, 8)[0];
        assert!(center > 200, "expected near-white paper, got {center}");
    }

    #[test]
    fn missing_input_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("nope.png");
        assert!(apply_hand_drawn(&missing).is_err());
    }

    #[test]
    fn effect_adapter_ignores_the_aux_text_contents() {
        let temp = TempDir::new().expect("temp dir");
        let input = temp.path().join("scene.png");
        write_gradient_image(&input);
        let aux = temp.path().join("prompt.txt");
        std::fs::write(&aux, "pencil sketch").expect("write aux");

        let output = SketchEffect.apply(&input, &aux).expect("apply");
        assert!(output.exists());
    }
}
