//! Color ramps for similarity scores.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#rrggbb` (leading `#` optional). Alpha is 255.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance (Rec. 709 weights) in `[0, 255]`.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32
    }
}

/// One anchor of a [`ColorRamp`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position in `[0, 1]`.
    pub position: f32,
    pub color: Color,
}

/// Magma anchors at `i / 8`, dark (dissimilar) to light (similar).
pub const MAGMA_HEX: [&str; 9] = [
    "#000004", "#1c1044", "#4f127b", "#812581", "#b5367a", "#e55064", "#fb8761", "#fec287",
    "#fcfdbf",
];

const MAGMA_RGB: [(u8, u8, u8); 9] = [
    (0, 0, 4),
    (28, 16, 68),
    (79, 18, 123),
    (129, 37, 129),
    (181, 54, 122),
    (229, 80, 100),
    (251, 135, 97),
    (254, 194, 135),
    (252, 253, 191),
];

/// Piecewise-linear color ramp over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRamp")]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

#[derive(Deserialize)]
struct RawRamp {
    stops: Vec<ColorStop>,
}

impl TryFrom<RawRamp> for ColorRamp {
    type Error = String;

    fn try_from(raw: RawRamp) -> Result<Self, Self::Error> {
        let count = raw.stops.len();
        ColorRamp::new(raw.stops).ok_or_else(|| {
            format!(
                "color ramp needs at least two finite stops in ascending order, got {}",
                count
            )
        })
    }
}

impl ColorRamp {
    /// Build a ramp from stops sorted by ascending position.
    ///
    /// Returns `None` for fewer than two stops, non-finite or unsorted positions.
    pub fn new(stops: Vec<ColorStop>) -> Option<Self> {
        if stops.len() < 2 || stops.iter().any(|s| !s.position.is_finite()) {
            return None;
        }
        if stops.windows(2).any(|w| w[1].position <= w[0].position) {
            return None;
        }
        Some(Self { stops })
    }

    /// The perceptually uniform magma ramp.
    pub fn magma() -> Self {
        let last = (MAGMA_RGB.len() - 1) as f32;
        let stops = MAGMA_RGB
            .iter()
            .enumerate()
            .map(|(i, &(r, g, b))| ColorStop {
                position: i as f32 / last,
                color: Color::rgb(r, g, b),
            })
            .collect();
        Self { stops }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color for `value`, clamped to the ramp's range.
    ///
    /// NaN maps to transparent.
    pub fn color_at(&self, value: f32) -> Color {
        if value.is_nan() {
            return Color::transparent();
        }
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if value <= first.position {
            return first.color;
        }
        if value >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if value <= hi.position {
                let t = (value - lo.position) / (hi.position - lo.position);
                return interpolate_color(lo.color, hi.color, t);
            }
        }
        last.color
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::magma()
    }
}

/// Linear color interpolation with per-channel rounding.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + t * (b as f32 - a as f32)).round() as u8;

    Color::new(
        lerp(color1.r, color2.r),
        lerp(color1.g, color2.g),
        lerp(color1.b, color2.b),
        lerp(color1.a, color2.a),
    )
}

/// Render one pixel per cell.
///
/// # Arguments
/// - `scores`: row-major cell scores, `None` for missing cells
/// - `width`: Number of columns
/// - `height`: Number of rows
/// - `ramp`: color ramp applied to each present score
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel). Missing cells are transparent.
pub fn render_grid(scores: &[Option<f32>], width: usize, height: usize, ramp: &ColorRamp) -> Vec<u8> {
    let mut pixels = vec![0u8; width * height * 4];

    for (idx, score) in scores.iter().take(width * height).enumerate() {
        let color = match score {
            Some(s) => ramp.color_at(*s),
            None => Color::transparent(),
        };
        let pixel_idx = idx * 4;
        pixels[pixel_idx] = color.r;
        pixels[pixel_idx + 1] = color.g;
        pixels[pixel_idx + 2] = color.b;
        pixels[pixel_idx + 3] = color.a;
    }

    pixels
}
