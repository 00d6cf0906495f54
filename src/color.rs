use std::fmt;
use std::str::FromStr;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba8(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Builds an opaque color from linear components in [0, 1]
    pub fn from_unit(rgb: [f32; 3]) -> Self {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::rgb8(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// Scales the color channels by a light intensity
    pub fn with_intensity(self, intensity: f64) -> Self {
        let scale = |c: u8| (c as f64 * intensity).clamp(0.0, 255.0) as u8;
        Color::rgba8(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// Channel-wise interpolation, `t = 0` yields `self`
    pub fn lerp(self, other: Color, t: f64) -> Self {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Color::rgba8(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Composites `self` over an opaque `background`
    pub fn over(self, background: Color) -> Self {
        let alpha = self.a as f64 / 255.0;
        let rgb = background.lerp(Color { a: background.a, ..self }, alpha);
        Color { a: background.a, ..rgb }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised color `{0}`")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and a few CSS color names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = value.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(err());
            }
            let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
            return match hex.len() {
                3 => {
                    let mut rgb = [0u8; 3];
                    for (i, digit) in hex.chars().enumerate() {
                        let v = digit.to_digit(16).ok_or_else(err)? as u8;
                        rgb[i] = v * 17;
                    }
                    Ok(Color::rgb8(rgb[0], rgb[1], rgb[2]))
                }
                6 => Ok(Color::rgb8(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                )),
                8 => Ok(Color::rgba8(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    channel(&hex[6..8])?,
                )),
                _ => Err(err()),
            };
        }

        match value.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::rgb8(255, 0, 0)),
            "green" => Ok(Color::rgb8(0, 128, 0)),
            "blue" => Ok(Color::rgb8(0, 0, 255)),
            "yellow" => Ok(Color::rgb8(255, 255, 0)),
            "orange" => Ok(Color::rgb8(255, 165, 0)),
            "gray" | "grey" => Ok(Color::rgb8(128, 128, 128)),
            "transparent" => Ok(Color::TRANSPARENT),
            _ => Err(err()),
        }
    }
}
