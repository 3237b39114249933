use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{BarError, BarResult};

pub use kurbo::{Point, Rect, RoundedRect};

/// Straight (non-premultiplied) RGBA8 color.
///
/// Parses from the hex forms widget scripts use: `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`
/// (the leading `#` is optional, digits are case-insensitive).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, `255` is opaque.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Build a color from straight RGBA8 channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string.
    pub fn from_hex(s: &str) -> BarResult<Self> {
        parse_hex(s).map_err(BarError::color)
    }

    /// Whether the color leaves the destination untouched.
    pub fn is_invisible(self) -> bool {
        self.a == 0
    }

    /// `#rrggbb` part of the color, used by SVG paint attributes.
    pub fn rgb_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a `[0, 1]` opacity.
    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl FromStr for Color {
    type Err = BarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl serde::Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 255)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if !digits.is_ascii() {
        return Err(format!("\"{s}\" is not a hex color"));
    }

    fn nibble(c: u8) -> Result<u8, String> {
        (c as char)
            .to_digit(16)
            .map(|d| (d as u8) * 17)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let b = digits.as_bytes();
    let (r, g, bl, a) = match b.len() {
        3 => (nibble(b[0])?, nibble(b[1])?, nibble(b[2])?, 255),
        4 => (nibble(b[0])?, nibble(b[1])?, nibble(b[2])?, nibble(b[3])?),
        6 => (
            hex_byte(&digits[0..2])?,
            hex_byte(&digits[2..4])?,
            hex_byte(&digits[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&digits[0..2])?,
            hex_byte(&digits[2..4])?,
            hex_byte(&digits[4..6])?,
            hex_byte(&digits[6..8])?,
        ),
        _ => {
            return Err(format!(
                "\"{s}\" must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA (case-insensitive)"
            ));
        }
    };

    Ok(Color::rgba(r, g, bl, a))
}
