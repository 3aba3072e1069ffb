//! Property values.
//!
//! A [`Value`] is what a layer property holds: scalars, colors, vectors,
//! matrices and texture references. [`Value::to_json`] implements the
//! persistence rule shared by export and the content hash.

use lazy_static::lazy_static;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;

use crate::validate::{LaminaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Color(Color),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    Mat3([f64; 9]),
    Mat4([f64; 16]),
    Texture(TextureRef),
    /// Anything else, passed through persistence unchanged.
    Json(serde_json::Value),
}

/// Round half up (toward positive infinity) to two decimals, matching the
/// persisted precision. `-0.125` becomes `-0.12`.
pub fn round_to_two(n: f64) -> f64 {
    ((n + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}

fn rounded_array(values: &[f64]) -> serde_json::Value {
    serde_json::Value::Array(values.iter().map(|v| json!(round_to_two(*v))).collect())
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Persisted form: vectors and matrices become rounded arrays, colors a
    /// `#rrggbb` string, textures their source, numbers are rounded.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => json!(b),
            Value::Number(n) => serde_json::Number::from_f64(round_to_two(*n))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => json!(s),
            Value::Color(c) => json!(c.to_hex()),
            Value::Vec2(v) => rounded_array(v),
            Value::Vec3(v) => rounded_array(v),
            Value::Vec4(v) => rounded_array(v),
            Value::Mat3(v) => rounded_array(v),
            Value::Mat4(v) => rounded_array(v),
            Value::Texture(t) => json!(t.src),
            Value::Json(v) => v.clone(),
        }
    }

    /// Inverse of [`Value::to_json`] where the shape is unambiguous. Strings
    /// stay text; uniform coercion turns them into colors or textures.
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                let numbers: Option<Vec<f64>> = items.iter().map(|i| i.as_f64()).collect();
                match numbers.as_deref() {
                    Some([a, b]) => Value::Vec2([*a, *b]),
                    Some([a, b, c]) => Value::Vec3([*a, *b, *c]),
                    Some([a, b, c, d]) => Value::Vec4([*a, *b, *c, *d]),
                    Some(n) if n.len() == 9 => {
                        let mut m = [0.0; 9];
                        m.copy_from_slice(n);
                        Value::Mat3(m)
                    }
                    Some(n) if n.len() == 16 => {
                        let mut m = [0.0; 16];
                        m.copy_from_slice(n);
                        Value::Mat4(m)
                    }
                    _ => Value::Json(value.clone()),
                }
            }
            serde_json::Value::Object(_) => Value::Json(value.clone()),
        }
    }

    /// Uniform values never hold plain text: a string is a texture source or
    /// a color.
    pub fn into_uniform(self, key: &str) -> Result<Value> {
        match self {
            Value::Text(s) if is_texture_source(&s) => Ok(Value::Texture(TextureRef::new(s))),
            Value::Text(s) => Color::parse(&s)
                .map(Value::Color)
                .ok_or_else(|| LaminaError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("'{}' is neither a color nor a texture source", s),
                }),
            other => Ok(other),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<TextureRef> for Value {
    fn from(v: TextureRef) -> Self {
        Value::Texture(v)
    }
}

impl From<[f64; 2]> for Value {
    fn from(v: [f64; 2]) -> Self {
        Value::Vec2(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vec3(v)
    }
}

impl From<[f64; 4]> for Value {
    fn from(v: [f64; 4]) -> Self {
        Value::Vec4(v)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLOR
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref NAMED_COLORS: HashMap<&'static str, u32> = {
        let mut m = HashMap::new();
        m.insert("black", 0x000000);
        m.insert("white", 0xffffff);
        m.insert("red", 0xff0000);
        m.insert("green", 0x008000);
        m.insert("lime", 0x00ff00);
        m.insert("blue", 0x0000ff);
        m.insert("yellow", 0xffff00);
        m.insert("cyan", 0x00ffff);
        m.insert("aqua", 0x00ffff);
        m.insert("magenta", 0xff00ff);
        m.insert("fuchsia", 0xff00ff);
        m.insert("orange", 0xffa500);
        m.insert("purple", 0x800080);
        m.insert("pink", 0xffc0cb);
        m.insert("hotpink", 0xff69b4);
        m.insert("brown", 0xa52a2a);
        m.insert("gray", 0x808080);
        m.insert("grey", 0x808080);
        m.insert("silver", 0xc0c0c0);
        m.insert("gold", 0xffd700);
        m.insert("navy", 0x000080);
        m.insert("teal", 0x008080);
        m.insert("olive", 0x808000);
        m.insert("maroon", 0x800000);
        m.insert("coral", 0xff7f50);
        m.insert("salmon", 0xfa8072);
        m.insert("violet", 0xee82ee);
        m.insert("indigo", 0x4b0082);
        m.insert("skyblue", 0x87ceeb);
        m.insert("orangered", 0xff4500);
        m
    };
}

/// RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Color {
            r: ((hex >> 16) & 0xff) as f64 / 255.0,
            g: ((hex >> 8) & 0xff) as f64 / 255.0,
            b: (hex & 0xff) as f64 / 255.0,
        }
    }

    /// Accepts `#rgb`, `#rrggbb` and CSS color names.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok().map(Color::from_hex),
                3 => {
                    let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                    u32::from_str_radix(&expanded, 16).ok().map(Color::from_hex)
                }
                _ => None,
            };
        }
        NAMED_COLORS
            .get(s.to_ascii_lowercase().as_str())
            .copied()
            .map(Color::from_hex)
    }

    pub fn to_hex(&self) -> String {
        let channel = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    /// sRGB to linear transfer, per channel.
    pub fn to_linear(&self) -> Color {
        fn convert(c: f64) -> f64 {
            if c < 0.04045 {
                c * 0.0773993808
            } else {
                (c * 0.9478672986 + 0.0521327014).powf(2.4)
            }
        }
        Color::new(convert(self.r), convert(self.g), convert(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEXTURES
// ═══════════════════════════════════════════════════════════════════════════════

/// A texture by its originating source. Decoding is the host's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    pub src: String,
}

impl TextureRef {
    pub fn new(src: impl Into<String>) -> Self {
        TextureRef { src: src.into() }
    }
}

const IMAGE_EXTENSIONS: [&str; 7] = [".png", ".jpg", ".jpeg", ".webp", ".gif", ".bmp", ".hdr"];

pub fn is_texture_source(s: &str) -> bool {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    lower.starts_with("data:image")
        || lower.starts_with("blob:")
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
