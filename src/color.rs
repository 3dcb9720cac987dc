use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Diverging scale: correlation coefficient → Color32
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

/// Colour for a value in `[-1, 1]`: blue through light grey to red,
/// interpolated in linear RGB. NaN maps to dark grey.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::DARK_GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let (from, to, factor) = if t < 0.0 {
        (NEUTRAL, COOL, -t)
    } else {
        (NEUTRAL, WARM, t)
    };
    let mixed = linear(from).mix(linear(to), factor);
    let rgb: Srgb<f32> = Srgb::from_linear(mixed);
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

fn linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
