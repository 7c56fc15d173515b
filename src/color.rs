use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::error::{TrendError, TrendResult};

/// Row traces: gray at 20% opacity.
pub const TRACE_COLOR: Color32 = Color32::from_rgba_premultiplied(26, 26, 26, 51);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Named colours
// ---------------------------------------------------------------------------

/// Resolve a CSS colour name (`"orange"`) or hex string (`"#ff8800"`).
pub fn resolve_color(name: &str) -> TrendResult<Color32> {
    let name = name.trim();
    let rgb: Srgb<u8> = if name.starts_with('#') {
        name.parse()
            .map_err(|_| TrendError::Configuration(format!("invalid hex colour '{name}'")))?
    } else {
        palette::named::from_str(&name.to_ascii_lowercase())
            .ok_or_else(|| TrendError::Configuration(format!("unknown colour name '{name}'")))?
    };
    Ok(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colours() {
        assert_eq!(resolve_color("blue").unwrap(), Color32::from_rgb(0, 0, 255));
        assert_eq!(resolve_color("Orange").unwrap(), Color32::from_rgb(255, 165, 0));
        assert_eq!(resolve_color("green").unwrap(), Color32::from_rgb(0, 128, 0));
    }

    #[test]
    fn hex_colours() {
        assert_eq!(resolve_color("#102030").unwrap(), Color32::from_rgb(16, 32, 48));
        assert!(resolve_color("#zz").is_err());
    }

    #[test]
    fn unknown_name() {
        assert!(matches!(
            resolve_color("blurple"),
            Err(TrendError::Configuration(_))
        ));
    }

    #[test]
    fn palette_is_distinct() {
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert!(generate_palette(0).is_empty());
    }
}
