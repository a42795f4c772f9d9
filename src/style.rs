//! Style values and parsers
//!
//! Fixed aesthetic values arrive as strings (from layer styles and
//! themes) and are parsed here into colors, lengths, shapes, line types
//! and font faces. Parsers never abort a plot: a malformed value logs a
//! warning and falls back to a documented default.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::DataFrame;
use crate::scale::ScalesView;

/// Points per millimeter.
pub const MM: f64 = 2.834646;

// =============================================================================
// Colors
// =============================================================================

/// An 8-bit RGBA color, non-premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    /// Replace alpha with `a` in [0,1].
    pub fn with_alpha(self, a: f64) -> Color {
        Color {
            a: (a.clamp(0.0, 1.0) * 255.0) as u8,
            ..self
        }
    }

    /// Convert an HSV triple (h in [0,1), s and v in [0,1]) to RGB.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Color {
        let h = h * 6.0;
        let hi = h.floor() as i32;
        let f = h - hi as f64;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match hi.rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Color::rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
    }
}

impl fmt::Display for Color {
    /// `#rrggbb`, with `aa` appended when not fully opaque.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Fallback for colors that fail to parse.
pub const FALLBACK_COLOR: Color = Color::rgba(0xaa, 0x66, 0x77, 0x7f);

/// Built-in named colors.
pub fn builtin_color(name: &str) -> Option<Color> {
    Some(match name {
        "red" => Color::rgb(0xff, 0x00, 0x00),
        "green" => Color::rgb(0x00, 0xff, 0x00),
        "blue" => Color::rgb(0x00, 0x00, 0xff),
        "cyan" => Color::rgb(0x00, 0xff, 0xff),
        "magenta" => Color::rgb(0xff, 0x00, 0xff),
        "yellow" => Color::rgb(0xff, 0xff, 0x00),
        "white" => Color::rgb(0xff, 0xff, 0xff),
        "black" => Color::rgb(0x00, 0x00, 0x00),
        "gray20" => Color::rgb(0x33, 0x33, 0x33),
        "gray40" => Color::rgb(0x66, 0x66, 0x66),
        "gray" | "gray50" => Color::rgb(0x7f, 0x7f, 0x7f),
        "gray60" => Color::rgb(0x99, 0x99, 0x99),
        "gray80" => Color::rgb(0xcc, 0xcc, 0xcc),
        _ => return None,
    })
}

/// Parse `#rrggbb`, `#rrggbbaa` or a palette name. Unknown values log
/// and return [`FALLBACK_COLOR`].
pub fn parse_color(s: &str) -> Color {
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() >= 6 {
            let byte = |range| u8::from_str_radix(&hex[range], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (byte(0..2), byte(2..4), byte(4..6)) {
                let a = if hex.len() >= 8 {
                    byte(6..8).unwrap_or(0xff)
                } else {
                    0xff
                };
                return Color::rgba(r, g, b, a);
            }
        }
    }
    if let Some(c) = builtin_color(s) {
        return c;
    }
    log::warn!("cannot parse color {:?}, using fallback", s);
    FALLBACK_COLOR
}

// =============================================================================
// Lengths and angles
// =============================================================================

/// Parse a float with an optional unit suffix (`%`, `°`, `pt`, `mm`,
/// `cm`, `in`), clipped to `[low, high]`. Parse failures log and return
/// `low`.
pub fn parse_float(s: &str, low: f64, high: f64) -> f64 {
    let (num, factor) = if let Some(rest) = s.strip_suffix('%') {
        (rest, 0.01)
    } else if let Some(rest) = s.strip_suffix('°') {
        (rest, std::f64::consts::PI / 180.0)
    } else if let Some(rest) = s.strip_suffix("pt") {
        (rest, 1.0)
    } else if let Some(rest) = s.strip_suffix("mm") {
        (rest, MM)
    } else if let Some(rest) = s.strip_suffix("cm") {
        (rest, 10.0 * MM)
    } else if let Some(rest) = s.strip_suffix("in") {
        (rest, 72.0)
    } else {
        (s, 1.0)
    };

    match num.trim().parse::<f64>() {
        Ok(value) => (value * factor).clamp(low, high),
        Err(err) => {
            log::warn!("cannot parse style value {:?} as float: {}", s, err);
            low
        }
    }
}

// =============================================================================
// Point shapes
// =============================================================================

/// Shape of a point grob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointShape {
    Blank,
    Dot,
    Circle,
    Square,
    Diamond,
    Delta,
    Nabla,
    SolidCircle,
    SolidSquare,
    SolidDiamond,
    SolidDelta,
    SolidNabla,
    Cross,
    Plus,
    Star,
}

const SHAPE_NAMES: [&str; 15] = [
    "blank",
    "dot",
    "circle",
    "square",
    "diamond",
    "delta",
    "nabla",
    "solidcircle",
    "solidsquare",
    "soliddiamond",
    "soliddelta",
    "solidnabla",
    "cross",
    "plus",
    "star",
];

impl PointShape {
    /// The largest enum value; the discrete style ramp maps into
    /// `[0, Star]`.
    pub const MAX: i32 = PointShape::Star as i32;

    pub fn from_index(i: i32) -> PointShape {
        match i.rem_euclid(PointShape::MAX + 1) {
            0 => PointShape::Blank,
            1 => PointShape::Dot,
            2 => PointShape::Circle,
            3 => PointShape::Square,
            4 => PointShape::Diamond,
            5 => PointShape::Delta,
            6 => PointShape::Nabla,
            7 => PointShape::SolidCircle,
            8 => PointShape::SolidSquare,
            9 => PointShape::SolidDiamond,
            10 => PointShape::SolidDelta,
            11 => PointShape::SolidNabla,
            12 => PointShape::Cross,
            13 => PointShape::Plus,
            _ => PointShape::Star,
        }
    }

    pub fn name(&self) -> &'static str {
        SHAPE_NAMES[*self as usize]
    }

    pub fn solid(&self) -> bool {
        (*self >= PointShape::SolidCircle) && (*self <= PointShape::SolidNabla)
    }
}

impl fmt::Display for PointShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a shape from its enum integer or canonical name. Unknown names
/// yield `Blank`.
pub fn parse_shape(s: &str) -> PointShape {
    if let Ok(n) = s.trim().parse::<i32>() {
        return PointShape::from_index(n);
    }
    match SHAPE_NAMES.iter().position(|n| *n == s) {
        Some(i) => PointShape::from_index(i as i32),
        None => PointShape::Blank,
    }
}

// =============================================================================
// Line types
// =============================================================================

/// Dash pattern of a line or path grob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Blank,
    Solid,
    Dashed,
    Dotted,
    DotDash,
    LongDash,
    TwoDash,
}

const LINETYPE_NAMES: [&str; 7] = [
    "blank", "solid", "dashed", "dotted", "dotdash", "longdash", "twodash",
];

impl LineType {
    pub const MAX: i32 = LineType::TwoDash as i32;

    pub fn from_index(i: i32) -> LineType {
        match i.rem_euclid(LineType::MAX + 1) {
            0 => LineType::Blank,
            1 => LineType::Solid,
            2 => LineType::Dashed,
            3 => LineType::Dotted,
            4 => LineType::DotDash,
            5 => LineType::LongDash,
            _ => LineType::TwoDash,
        }
    }

    pub fn name(&self) -> &'static str {
        LINETYPE_NAMES[*self as usize]
    }

    /// Dash segment lengths in points; empty for solid strokes.
    pub fn dashes(&self) -> &'static [f64] {
        match self {
            LineType::Blank => &[1.0],
            LineType::Solid => &[],
            LineType::Dashed => &[10.0, 8.0],
            LineType::Dotted => &[4.0, 4.0],
            LineType::DotDash => &[10.0, 4.0, 4.0, 4.0],
            LineType::LongDash => &[10.0, 3.0],
            LineType::TwoDash => &[10.0, 2.0, 4.0, 2.0],
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a line type from its enum integer or canonical name. Unknown
/// names yield `Blank`.
pub fn parse_linetype(s: &str) -> LineType {
    if let Ok(n) = s.trim().parse::<i32>() {
        return LineType::from_index(n);
    }
    match LINETYPE_NAMES.iter().position(|n| *n == s) {
        Some(i) => LineType::from_index(i as i32),
        None => LineType::Blank,
    }
}

// =============================================================================
// Font faces
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontFace {
    pub fn name(&self) -> &'static str {
        match self {
            FontFace::Regular => "regular",
            FontFace::Bold => "bold",
            FontFace::Italic => "italic",
            FontFace::BoldItalic => "bolditalic",
        }
    }
}

pub fn parse_fontface(s: &str) -> FontFace {
    match s {
        "bold" => FontFace::Bold,
        "italic" => FontFace::Italic,
        "bolditalic" => FontFace::BoldItalic,
        _ => FontFace::Regular,
    }
}

// =============================================================================
// Mapped-or-fixed accessors
// =============================================================================

use crate::aes::AesMapping;

/// Per-row color lookup: either through the panel's color scale for a
/// mapped aesthetic, or a constant parsed from the style.
pub enum ColorAccessor<'a> {
    Mapped { data: &'a [f64], scales: &'a ScalesView<'a>, aes: &'a str },
    Fixed(Color),
}

impl<'a> ColorAccessor<'a> {
    pub fn new(
        aes: &'a str,
        data: &'a DataFrame,
        scales: &'a ScalesView<'a>,
        style: &AesMapping,
    ) -> Self {
        match data.columns.get(aes) {
            Some(col) if scales.get(aes).is_some() => ColorAccessor::Mapped {
                data: &col.data,
                scales,
                aes,
            },
            _ => ColorAccessor::Fixed(parse_color(style.get(aes).unwrap_or(""))),
        }
    }

    pub fn at(&self, i: usize) -> Color {
        match self {
            ColorAccessor::Mapped { data, scales, aes } => {
                scales.get(aes).unwrap().color(data[i])
            }
            ColorAccessor::Fixed(c) => *c,
        }
    }
}

/// Per-row continuous lookup: a mapped aesthetic is passed through its
/// scale's position function and re-ranged to `[min, max]`; a fixed one
/// is parsed from the style.
pub enum PosAccessor<'a> {
    Mapped {
        data: &'a [f64],
        scales: &'a ScalesView<'a>,
        aes: &'a str,
        min: f64,
        max: f64,
    },
    Fixed(f64),
}

impl<'a> PosAccessor<'a> {
    pub fn new(
        aes: &'a str,
        data: &'a DataFrame,
        scales: &'a ScalesView<'a>,
        style: &AesMapping,
        min: f64,
        max: f64,
    ) -> Self {
        match data.columns.get(aes) {
            Some(col) if scales.get(aes).is_some() => PosAccessor::Mapped {
                data: &col.data,
                scales,
                aes,
                min,
                max,
            },
            _ => PosAccessor::Fixed(parse_float(
                style.get(aes).unwrap_or(""),
                f64::NEG_INFINITY,
                f64::INFINITY,
            )),
        }
    }

    pub fn at(&self, i: usize) -> f64 {
        match self {
            PosAccessor::Mapped { data, scales, aes, min, max } => {
                let pos = scales.get(aes).unwrap().pos(data[i]);
                pos * (max - min) + min
            }
            PosAccessor::Fixed(x) => *x,
        }
    }
}

/// Per-row discrete style lookup (point shape or line type), either
/// through the scale's style ramp or parsed from the style mapping.
pub enum StyleAccessor<'a> {
    Mapped { data: &'a [f64], scales: &'a ScalesView<'a>, aes: &'a str },
    Fixed(i32),
}

impl<'a> StyleAccessor<'a> {
    pub fn new(
        aes: &'a str,
        data: &'a DataFrame,
        scales: &'a ScalesView<'a>,
        style: &AesMapping,
    ) -> Self {
        match data.columns.get(aes) {
            Some(col) if scales.get(aes).is_some() => StyleAccessor::Mapped {
                data: &col.data,
                scales,
                aes,
            },
            _ => {
                let raw = style.get(aes).unwrap_or("");
                let x = match aes {
                    "shape" => parse_shape(raw) as i32,
                    "linetype" => parse_linetype(raw) as i32,
                    _ => 0,
                };
                StyleAccessor::Fixed(x)
            }
        }
    }

    pub fn at(&self, i: usize) -> i32 {
        match self {
            StyleAccessor::Mapped { data, scales, aes } => {
                scales.get(aes).unwrap().style(data[i])
            }
            StyleAccessor::Fixed(x) => *x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#1256ab"), Color::rgb(0x12, 0x56, 0xab));
        assert_eq!(parse_color("#1256abcd"), Color::rgba(0x12, 0x56, 0xab, 0xcd));
        assert_eq!(parse_color("red"), Color::rgb(0xff, 0, 0));
        assert_eq!(parse_color("green"), Color::rgb(0, 0xff, 0));
        assert_eq!(parse_color("blue"), Color::rgb(0, 0, 0xff));
        assert_eq!(parse_color("nonsense"), FALLBACK_COLOR);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(format!("{}", Color::rgb(0x12, 0x56, 0xab)), "#1256ab");
        assert_eq!(
            format!("{}", Color::rgba(0x12, 0x56, 0xab, 0xcd)),
            "#1256abcd"
        );
    }

    #[test]
    fn test_with_alpha() {
        let c = Color::rgb(10, 20, 30).with_alpha(0.5);
        assert_eq!(c.a, 127);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    }

    #[test]
    fn test_parse_float_units() {
        assert_eq!(parse_float("50%", 0.0, 1.0), 0.5);
        assert!((parse_float("45°", 0.0, 7.0) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert_eq!(parse_float("12 pt", 0.0, 100.0), 12.0);
        assert!((parse_float("2 mm", 0.0, 100.0) - 2.0 * MM).abs() < 1e-9);
        assert_eq!(parse_float("1 in", 0.0, 100.0), 72.0);
    }

    #[test]
    fn test_parse_float_clips_and_falls_back() {
        assert_eq!(parse_float("200", 0.0, 100.0), 100.0);
        assert_eq!(parse_float("-5", 0.0, 100.0), 0.0);
        assert_eq!(parse_float("wat", 2.0, 100.0), 2.0);
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!(parse_shape("circle"), PointShape::Circle);
        assert_eq!(parse_shape("soliddelta"), PointShape::SolidDelta);
        assert_eq!(parse_shape("2"), PointShape::Circle);
        assert_eq!(parse_shape("unknown"), PointShape::Blank);
        // enum integers wrap
        assert_eq!(parse_shape("15"), PointShape::Blank);
    }

    #[test]
    fn test_parse_linetype() {
        assert_eq!(parse_linetype("dashed"), LineType::Dashed);
        assert_eq!(parse_linetype("3"), LineType::Dotted);
        assert_eq!(parse_linetype("unknown"), LineType::Blank);
    }

    #[test]
    fn test_hsv_endpoints() {
        let red = Color::from_hsv(0.0, 1.0, 1.0);
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));
        let green = Color::from_hsv(1.0 / 3.0, 1.0, 1.0);
        assert_eq!(green.g, 255);
    }
}
