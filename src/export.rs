use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::ColorImage;

/// Write a viewport screenshot to `path` as PNG.
pub fn save_png(path: &Path, image: &ColorImage) -> Result<()> {
    let [w, h] = image.size;
    let bytes: Vec<u8> = image.pixels.iter().flat_map(|c| c.to_array()).collect();
    let buffer = image::RgbaImage::from_raw(w as u32, h as u32, bytes)
        .context("screenshot buffer does not match its size")?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {w}×{h} chart to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    #[test]
    fn writes_png_of_screenshot_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let mut shot = ColorImage::new([4, 3], Color32::WHITE);
        shot.pixels[0] = Color32::from_rgb(0, 0, 255);

        save_png(&path, &shot).unwrap();

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (4, 3));
        assert_eq!(back.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(back.get_pixel(3, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn unwritable_path_is_reported() {
        let shot = ColorImage::new([1, 1], Color32::BLACK);
        let err = save_png(Path::new("/no/such/dir/chart.png"), &shot).unwrap_err();
        assert!(err.to_string().starts_with("writing"));
    }
}
