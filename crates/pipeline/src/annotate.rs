//! Annotated image output

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use spatial::Detection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::PipelineError;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Draw detection boxes onto an image buffer, clipped to its bounds
pub fn draw_detections(canvas: &mut RgbImage, detections: &[Detection]) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let max_x = f64::from(width - 1);
    let max_y = f64::from(height - 1);

    for detection in detections {
        let x1 = detection.bbox.x1.clamp(0.0, max_x);
        let y1 = detection.bbox.y1.clamp(0.0, max_y);
        let x2 = detection.bbox.x2.clamp(0.0, max_x);
        let y2 = detection.bbox.y2.clamp(0.0, max_y);

        let w = ((x2 - x1).round() as u32).max(1);
        let h = ((y2 - y1).round() as u32).max(1);
        let rect = Rect::at(x1.round() as i32, y1.round() as i32).of_size(w, h);
        draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
    }
}

/// Save a copy of `source` with detection boxes drawn as
/// `<out_dir>/<stem>_0.jpg`
pub fn annotate_image(
    source: &Path,
    detections: &[Detection],
    out_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let mut canvas = image::open(source)?.to_rgb8();
    draw_detections(&mut canvas, detections);

    fs::create_dir_all(out_dir)?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let out_path = out_dir.join(format!("{}_0.jpg", stem));

    canvas.save(&out_path)?;
    debug!("Saved annotated image {}", out_path.display());
    Ok(out_path)
}
