//! Blend Module for Lamina Compiler
//!
//! The fixed blend-mode catalogue. Each mode has a GLSL implementation in
//! [`BLEND_MODES_CHUNK`] (always injected whole into the fragment program)
//! and a CPU mirror used by tests and host-side previews.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validate::LaminaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Subtract,
    Multiply,
    Lighten,
    Darken,
    Divide,
    Overlay,
    Screen,
    Softlight,
    Reflect,
    Negation,
}

impl BlendMode {
    pub const ALL: [BlendMode; 12] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Multiply,
        BlendMode::Lighten,
        BlendMode::Darken,
        BlendMode::Divide,
        BlendMode::Overlay,
        BlendMode::Screen,
        BlendMode::Softlight,
        BlendMode::Reflect,
        BlendMode::Negation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Subtract => "subtract",
            BlendMode::Multiply => "multiply",
            BlendMode::Lighten => "lighten",
            BlendMode::Darken => "darken",
            BlendMode::Divide => "divide",
            BlendMode::Overlay => "overlay",
            BlendMode::Screen => "screen",
            BlendMode::Softlight => "softlight",
            BlendMode::Reflect => "reflect",
            BlendMode::Negation => "negation",
        }
    }

    /// GLSL function implementing this mode. Normal maps to the
    /// alpha-clamped `lamina_blend_alpha`, not `lamina_blend_normal`.
    pub fn function_name(self) -> &'static str {
        match self {
            BlendMode::Normal => "lamina_blend_alpha",
            BlendMode::Add => "lamina_blend_add",
            BlendMode::Subtract => "lamina_blend_subtract",
            BlendMode::Multiply => "lamina_blend_multiply",
            BlendMode::Lighten => "lamina_blend_lighten",
            BlendMode::Darken => "lamina_blend_darken",
            BlendMode::Divide => "lamina_blend_divide",
            BlendMode::Overlay => "lamina_blend_overlay",
            BlendMode::Screen => "lamina_blend_screen",
            BlendMode::Softlight => "lamina_blend_softlight",
            BlendMode::Reflect => "lamina_blend_reflect",
            BlendMode::Negation => "lamina_blend_negation",
        }
    }

    /// `fn(accumulator, incoming, incoming.a)` as GLSL text.
    pub fn call(self, accumulator: &str, incoming: &str) -> String {
        format!(
            "{}({}, {}, {}.a)",
            self.function_name(),
            accumulator,
            incoming,
            incoming
        )
    }

    pub fn option_names() -> Vec<String> {
        Self::ALL.iter().map(|m| m.as_str().to_string()).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CPU REFERENCE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Per-channel combination `f(base, incoming)` before opacity mixing.
    pub fn blend_channel(self, x: f64, y: f64) -> f64 {
        match self {
            BlendMode::Normal => y,
            BlendMode::Add => (x + y).min(1.0),
            BlendMode::Subtract => (x + y - 1.0).max(0.0),
            BlendMode::Multiply => x * y,
            BlendMode::Lighten => x.max(y),
            BlendMode::Darken => x.min(y),
            BlendMode::Divide => {
                if y > 0.0 {
                    (x / y).min(1.0)
                } else {
                    1.0
                }
            }
            BlendMode::Overlay => {
                if x < 0.5 {
                    2.0 * x * y
                } else {
                    1.0 - 2.0 * (1.0 - x) * (1.0 - y)
                }
            }
            BlendMode::Screen => 1.0 - (1.0 - x) * (1.0 - y),
            BlendMode::Softlight => {
                if y < 0.5 {
                    2.0 * x * y + x * x * (1.0 - 2.0 * y)
                } else {
                    x.max(0.0).sqrt() * (2.0 * y - 1.0) + 2.0 * x * (1.0 - y)
                }
            }
            BlendMode::Reflect => {
                if y >= 1.0 {
                    1.0
                } else {
                    (x * x / (1.0 - y)).min(1.0)
                }
            }
            BlendMode::Negation => 1.0 - (1.0 - x - y).abs(),
        }
    }

    /// Blend RGBA `incoming` over `base`. The result keeps the base alpha.
    pub fn apply(self, base: [f64; 4], incoming: [f64; 4], opacity: f64) -> [f64; 4] {
        let opacity = match self {
            BlendMode::Normal => opacity.min(incoming[3]),
            _ => opacity,
        };
        let mut out = base;
        for c in 0..3 {
            let z = self.blend_channel(base[c], incoming[c]);
            out[c] = z * opacity + base[c] * (1.0 - opacity);
        }
        out
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = LaminaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlendMode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| LaminaError::InvalidValue {
                key: "mode".to_string(),
                reason: format!("unknown blend mode '{}'", s),
            })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GLSL LIBRARY
// ═══════════════════════════════════════════════════════════════════════════════

pub const BLEND_MODES_CHUNK: &str = r#"
vec4 lamina_blend_add(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(min(x.xyz + y.xyz, 1.0) * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec3 lamina_blend_alpha(const in vec3 x, const in vec3 y, const in float opacity) {
	return y * opacity + x * (1.0 - opacity);
}

vec4 lamina_blend_alpha(const in vec4 x, const in vec4 y, const in float opacity) {
	float a = min(y.a, opacity);
	return vec4(lamina_blend_alpha(x.rgb, y.rgb, a), x.a);
}

vec4 lamina_blend_average(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4((x.xyz + y.xyz) * 0.5 * opacity + x.xyz * (1.0 - opacity), x.a);
}

float lamina_blend_color_burn(const in float x, const in float y) {
	return (y == 0.0) ? y : max(1.0 - (1.0 - x) / y, 0.0);
}

vec4 lamina_blend_color_burn(const in vec4 x, const in vec4 y, const in float opacity) {
	vec4 z = vec4(
		lamina_blend_color_burn(x.r, y.r),
		lamina_blend_color_burn(x.g, y.g),
		lamina_blend_color_burn(x.b, y.b),
		lamina_blend_color_burn(x.a, y.a)
	);
	return vec4(z.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

float lamina_blend_color_dodge(const in float x, const in float y) {
	return (y == 1.0) ? y : min(x / (1.0 - y), 1.0);
}

vec4 lamina_blend_color_dodge(const in vec4 x, const in vec4 y, const in float opacity) {
	vec4 z = vec4(
		lamina_blend_color_dodge(x.r, y.r),
		lamina_blend_color_dodge(x.g, y.g),
		lamina_blend_color_dodge(x.b, y.b),
		lamina_blend_color_dodge(x.a, y.a)
	);
	return vec4(z.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_darken(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(min(x.xyz, y.xyz) * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_difference(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(abs(x.xyz - y.xyz) * opacity + x.xyz * (1.0 - opacity), x.a);
}

float lamina_blend_divide(const in float x, const in float y) {
	return (y > 0.0) ? min(x / y, 1.0) : 1.0;
}

vec4 lamina_blend_divide(const in vec4 x, const in vec4 y, const in float opacity) {
	vec4 z = vec4(
		lamina_blend_divide(x.r, y.r),
		lamina_blend_divide(x.g, y.g),
		lamina_blend_divide(x.b, y.b),
		lamina_blend_divide(x.a, y.a)
	);
	return vec4(z.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_exclusion(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4((x.xyz + y.xyz - 2.0 * x.xyz * y.xyz) * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_lighten(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(max(x.xyz, y.xyz) * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_multiply(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(x.xyz * y.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_negation(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4((1.0 - abs(1.0 - x.xyz - y.xyz)) * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_normal(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(y.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

float lamina_blend_overlay(const in float x, const in float y) {
	return (x < 0.5) ? (2.0 * x * y) : (1.0 - 2.0 * (1.0 - x) * (1.0 - y));
}

vec4 lamina_blend_overlay(const in vec4 x, const in vec4 y, const in float opacity) {
	vec4 z = vec4(
		lamina_blend_overlay(x.r, y.r),
		lamina_blend_overlay(x.g, y.g),
		lamina_blend_overlay(x.b, y.b),
		lamina_blend_overlay(x.a, y.a)
	);
	return vec4(z.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

float lamina_blend_reflect(const in float x, const in float y) {
	return (y == 1.0) ? y : min(x * x / (1.0 - y), 1.0);
}

vec4 lamina_blend_reflect(const in vec4 x, const in vec4 y, const in float opacity) {
	vec4 z = vec4(
		lamina_blend_reflect(x.r, y.r),
		lamina_blend_reflect(x.g, y.g),
		lamina_blend_reflect(x.b, y.b),
		lamina_blend_reflect(x.a, y.a)
	);
	return vec4(z.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_screen(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4((1.0 - (1.0 - x.xyz) * (1.0 - y.xyz)) * opacity + x.xyz * (1.0 - opacity), x.a);
}

float lamina_blend_softlight(const in float x, const in float y) {
	return (y < 0.5) ?
		(2.0 * x * y + x * x * (1.0 - 2.0 * y)) :
		(sqrt(x) * (2.0 * y - 1.0) + 2.0 * x * (1.0 - y));
}

vec4 lamina_blend_softlight(const in vec4 x, const in vec4 y, const in float opacity) {
	vec4 z = vec4(
		lamina_blend_softlight(x.r, y.r),
		lamina_blend_softlight(x.g, y.g),
		lamina_blend_softlight(x.b, y.b),
		lamina_blend_softlight(x.a, y.a)
	);
	return vec4(z.xyz * opacity + x.xyz * (1.0 - opacity), x.a);
}

vec4 lamina_blend_subtract(const in vec4 x, const in vec4 y, const in float opacity) {
	return vec4(max(x.xyz + y.xyz - 1.0, 0.0) * opacity + x.xyz * (1.0 - opacity), x.a);
}
"#;
