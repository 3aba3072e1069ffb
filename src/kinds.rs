//! Built-in Layer Kinds for Lamina Compiler
//!
//! Each kind is a [`LayerDefinition`]: GLSL templates written against the
//! short `u_`/`v_`/`f_` names, ordered defaults, and optional hooks that
//! specialise the processed text after every rebuild.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::definition::LayerDefinition;
use crate::hooks::Hook;
use crate::layer::{Layer, ProcessedPart};
use crate::property::SchemaEntry;
use crate::validate::{LaminaError, Result};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════════════
// KIND ENUM
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Color,
    Depth,
    Noise,
    Fresnel,
    Gradient,
    Matcap,
    Texture,
    Displace,
    Normal,
    /// Bare layer whose program text is supplied at runtime.
    Shader,
    Custom(Arc<LayerDefinition>),
}

impl LayerKind {
    pub const BUILTIN: [LayerKind; 10] = [
        LayerKind::Color,
        LayerKind::Depth,
        LayerKind::Noise,
        LayerKind::Fresnel,
        LayerKind::Gradient,
        LayerKind::Matcap,
        LayerKind::Texture,
        LayerKind::Displace,
        LayerKind::Normal,
        LayerKind::Shader,
    ];

    pub fn name(&self) -> &str {
        match self {
            LayerKind::Color => "Color",
            LayerKind::Depth => "Depth",
            LayerKind::Noise => "Noise",
            LayerKind::Fresnel => "Fresnel",
            LayerKind::Gradient => "Gradient",
            LayerKind::Matcap => "Matcap",
            LayerKind::Texture => "Texture",
            LayerKind::Displace => "Displace",
            LayerKind::Normal => "Normal",
            LayerKind::Shader => "Shader",
            LayerKind::Custom(def) => def.name(),
        }
    }

    pub fn definition(&self) -> Arc<LayerDefinition> {
        let def = match self {
            LayerKind::Color => &*COLOR,
            LayerKind::Depth => &*DEPTH,
            LayerKind::Noise => &*NOISE,
            LayerKind::Fresnel => &*FRESNEL,
            LayerKind::Gradient => &*GRADIENT,
            LayerKind::Matcap => &*MATCAP,
            LayerKind::Texture => &*TEXTURE,
            LayerKind::Displace => &*DISPLACE,
            LayerKind::Normal => &*NORMAL,
            LayerKind::Shader => &*SHADER,
            LayerKind::Custom(def) => return Arc::clone(def),
        };
        Arc::clone(def)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = LaminaError;

    /// Built-in kinds only; custom kinds resolve through a [`LayerRegistry`].
    fn from_str(s: &str) -> Result<Self> {
        LayerKind::BUILTIN
            .iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .cloned()
            .ok_or_else(|| LaminaError::UnknownKind(s.to_string()))
    }
}

impl From<LayerDefinition> for LayerKind {
    fn from(def: LayerDefinition) -> Self {
        LayerKind::Custom(Arc::new(def))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Custom kinds registered by the host, looked up by name alongside the
/// built-ins.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    custom: HashMap<String, Arc<LayerDefinition>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom kind. Names are unique across built-ins and customs.
    pub fn register(&mut self, definition: LayerDefinition) -> Result<LayerKind> {
        let name = definition.name().to_string();
        if name.parse::<LayerKind>().is_ok() || self.custom.contains_key(&name) {
            return Err(LaminaError::DuplicateKind(name));
        }
        let def = Arc::new(definition);
        self.custom.insert(name, Arc::clone(&def));
        Ok(LayerKind::Custom(def))
    }

    pub fn get(&self, name: &str) -> Option<LayerKind> {
        self.custom.get(name).map(|def| LayerKind::Custom(Arc::clone(def)))
    }

    pub fn resolve(&self, name: &str) -> Result<LayerKind> {
        match self.get(name) {
            Some(kind) => Ok(kind),
            None => name.parse(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOOKS
// ═══════════════════════════════════════════════════════════════════════════════

pub const DEPTH_HOOK: Hook = Hook::new("depth", depth_shader_parse);
pub const NOISE_HOOK: Hook = Hook::new("noise", noise_shader_parse);
pub const GRADIENT_HOOK: Hook = Hook::new("gradient", gradient_shader_parse);
pub const DISPLACE_HOOK: Hook = Hook::new("displace", displace_shader_parse);

pub fn builtin_hooks() -> [Hook; 4] {
    [DEPTH_HOOK, NOISE_HOOK, GRADIENT_HOOK, DISPLACE_HOOK]
}

const MAPPING_TEMPLATE: &str = "lamina_mapping_template";
const NOISE_TEMPLATE: &str = "lamina_noise_template";
const AXES_TEMPLATE: &str = "axes_template";

const NOISE_TYPES: [&str; 5] = ["perlin", "simplex", "cell", "curl", "white"];
const MAPPING_TYPES: [&str; 3] = ["local", "world", "uv"];

fn text_property<'a>(layer: &'a Layer, name: &str, fallback: &'a str) -> &'a str {
    layer.get(name).and_then(Value::as_str).unwrap_or(fallback)
}

fn push_choice(layer: &mut Layer, label: &str, options: &[&str]) {
    let value = layer.get(label).cloned().unwrap_or(Value::Null);
    layer.push_schema(SchemaEntry::new(label, &value).with_options(options.iter().copied()));
}

fn noise_function(kind: &str) -> &'static str {
    match kind {
        "simplex" => "lamina_noise_simplex",
        "cell" => "lamina_noise_worley",
        "white" => "lamina_noise_white",
        "curl" => "lamina_noise_swirl",
        _ => "lamina_noise_perlin",
    }
}

fn position_mapping(kind: &str, position: &str) -> String {
    match kind {
        "world" => format!("(modelMatrix * vec4({},1.0)).xyz", position),
        "uv" => "vec3(uv, 0.)".to_string(),
        _ => position.to_string(),
    }
}

fn depth_shader_parse(layer: &mut Layer) {
    push_choice(layer, "mapping", &["vector", "world", "camera"]);
    let id = layer.id().to_string();
    let mapping = match text_property(layer, "mapping", "vector") {
        "world" => format!("length(v_{}_position - vec3(0.))", id),
        "camera" => format!("length(v_{}_worldPosition - cameraPosition)", id),
        _ => format!("length(v_{}_worldPosition - u_{}_origin)", id, id),
    };
    layer.replace_processed(ProcessedPart::Fragment, MAPPING_TEMPLATE, &mapping);
}

fn noise_shader_parse(layer: &mut Layer) {
    push_choice(layer, "type", &NOISE_TYPES);
    push_choice(layer, "mapping", &MAPPING_TYPES);
    let noise = noise_function(text_property(layer, "type", "perlin"));
    let mapping = position_mapping(text_property(layer, "mapping", "local"), "position");
    layer.replace_processed(ProcessedPart::Vertex, MAPPING_TEMPLATE, &mapping);
    layer.replace_processed(ProcessedPart::Fragment, NOISE_TEMPLATE, noise);
}

fn gradient_shader_parse(layer: &mut Layer) {
    push_choice(layer, "axes", &["x", "y", "z"]);
    push_choice(layer, "mapping", &MAPPING_TYPES);
    let mapping = position_mapping(text_property(layer, "mapping", "local"), "position");
    let axes = text_property(layer, "axes", "x").to_string();
    layer.replace_processed(ProcessedPart::Vertex, MAPPING_TEMPLATE, &mapping);
    layer.replace_processed(ProcessedPart::Fragment, AXES_TEMPLATE, &axes);
}

fn displace_shader_parse(layer: &mut Layer) {
    push_choice(layer, "type", &NOISE_TYPES);
    push_choice(layer, "mapping", &MAPPING_TYPES);
    let noise = noise_function(text_property(layer, "type", "perlin"));
    let mapping = position_mapping(text_property(layer, "mapping", "local"), "p");
    layer.replace_processed(ProcessedPart::VertexVariables, MAPPING_TEMPLATE, &mapping);
    layer.replace_processed(ProcessedPart::VertexVariables, NOISE_TEMPLATE, noise);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn builtin(def: Result<LayerDefinition>) -> Arc<LayerDefinition> {
    match def {
        Ok(def) => Arc::new(def),
        Err(e) => panic!("built-in layer definition is invalid: {}", e),
    }
}

lazy_static! {
    static ref COLOR: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Color")
            .default("u_color", "red")
            .default("u_alpha", 1.0)
            .fragment(COLOR_FRAGMENT)
            .build()
    );
    static ref DEPTH: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Depth")
            .default("u_near", 2.0)
            .default("u_far", 10.0)
            .default("u_origin", [0.0, 0.0, 0.0])
            .default("u_colorA", "white")
            .default("u_colorB", "black")
            .default("u_alpha", 1.0)
            .default("mapping", "vector")
            .vertex(DEPTH_VERTEX)
            .fragment(DEPTH_FRAGMENT)
            .on_shader_parse(DEPTH_HOOK)
            .build()
    );
    static ref NOISE: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Noise")
            .default("u_colorA", "#666666")
            .default("u_colorB", "#666666")
            .default("u_colorC", "#FFFFFF")
            .default("u_colorD", "#FFFFFF")
            .default("u_alpha", 1.0)
            .default("u_scale", 1.0)
            .default("u_offset", [0.0, 0.0, 0.0])
            .default("type", "perlin")
            .default("mapping", "local")
            .vertex(NOISE_VERTEX)
            .fragment(NOISE_FRAGMENT)
            .on_shader_parse(NOISE_HOOK)
            .build()
    );
    static ref FRESNEL: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Fresnel")
            .default("u_color", "white")
            .default("u_alpha", 1.0)
            .default("u_bias", 0.0)
            .default("u_intensity", 1.0)
            .default("u_power", 2.0)
            .default("u_factor", 1.0)
            .vertex(FRESNEL_VERTEX)
            .fragment(FRESNEL_FRAGMENT)
            .build()
    );
    static ref GRADIENT: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Gradient")
            .default("u_colorA", "white")
            .default("u_colorB", "black")
            .default("u_alpha", 1.0)
            .default("u_start", 1.0)
            .default("u_end", -1.0)
            .default("u_contrast", 1.0)
            .default("axes", "x")
            .default("mapping", "local")
            .vertex(GRADIENT_VERTEX)
            .fragment(GRADIENT_FRAGMENT)
            .on_shader_parse(GRADIENT_HOOK)
            .build()
    );
    static ref MATCAP: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Matcap")
            .default("u_alpha", 1.0)
            .default("u_map", Value::Null)
            .vertex(MATCAP_VERTEX)
            .fragment(MATCAP_FRAGMENT)
            .build()
    );
    static ref TEXTURE: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Texture")
            .default("u_alpha", 1.0)
            .default("u_map", Value::Null)
            .vertex(TEXTURE_VERTEX)
            .fragment(TEXTURE_FRAGMENT)
            .build()
    );
    static ref DISPLACE: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Displace")
            .default("u_strength", 1.0)
            .default("u_scale", 1.0)
            .default("u_offset", [0.0, 0.0, 0.0])
            .default("type", "perlin")
            .default("mapping", "local")
            .vertex(DISPLACE_VERTEX)
            .on_shader_parse(DISPLACE_HOOK)
            .build()
    );
    static ref NORMAL: Arc<LayerDefinition> = builtin(
        LayerDefinition::builder("Normal")
            .default("u_alpha", 1.0)
            .default("u_direction", [1.0, 1.0, 1.0])
            .vertex(NORMAL_VERTEX)
            .fragment(NORMAL_FRAGMENT)
            .build()
    );
    static ref SHADER: Arc<LayerDefinition> =
        builtin(LayerDefinition::builder("Shader").build());
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATES
// ═══════════════════════════════════════════════════════════════════════════════

const COLOR_FRAGMENT: &str = r#"
    uniform vec3 u_color;
    uniform float u_alpha;

    void main() {
      return vec4(u_color, u_alpha);
    }
"#;

const DEPTH_VERTEX: &str = r#"
    varying vec3 v_worldPosition;
    varying vec3 v_position;

    void main() {
      v_worldPosition = (vec4(position, 1.0) * modelMatrix).xyz;
      v_position = position;
    }
"#;

const DEPTH_FRAGMENT: &str = r#"
    uniform float u_alpha;
    uniform float u_near;
    uniform float u_far;
    uniform vec3 u_origin;
    uniform vec3 u_colorA;
    uniform vec3 u_colorB;

    varying vec3 v_worldPosition;
    varying vec3 v_position;

    void main() {
      float f_dist = lamina_mapping_template;
      float f_depth = (f_dist - u_near) / (u_far - u_near);
      vec3 f_depthColor = mix(u_colorB, u_colorA, 1.0 - clamp(f_depth, 0., 1.));

      return vec4(f_depthColor, u_alpha);
    }
"#;

const NOISE_VERTEX: &str = r#"
    varying vec3 v_position;

    void main() {
      v_position = lamina_mapping_template;
    }
"#;

const NOISE_FRAGMENT: &str = r#"
    uniform vec3 u_colorA;
    uniform vec3 u_colorB;
    uniform vec3 u_colorC;
    uniform vec3 u_colorD;
    uniform vec3 u_offset;

    uniform float u_alpha;
    uniform float u_scale;

    varying vec3 v_position;

    void main() {
      float f_n = lamina_noise_template((v_position + u_offset) * u_scale);

      float f_step1 = 0.;
      float f_step2 = 0.2;
      float f_step3 = 0.6;
      float f_step4 = 1.;

      vec3 f_color = mix(u_colorA, u_colorB, smoothstep(f_step1, f_step2, f_n));
      f_color = mix(f_color, u_colorC, smoothstep(f_step2, f_step3, f_n));
      f_color = mix(f_color, u_colorD, smoothstep(f_step3, f_step4, f_n));

      return vec4(f_color, u_alpha);
    }
"#;

const FRESNEL_VERTEX: &str = r#"
    varying vec3 v_worldPosition;
    varying vec3 v_worldNormal;

    void main() {
      v_worldPosition = vec3(-viewMatrix[0][2], -viewMatrix[1][2], -viewMatrix[2][2]);
      v_worldNormal = normalize(mat3(modelMatrix[0].xyz, modelMatrix[1].xyz, modelMatrix[2].xyz) * normal);
    }
"#;

const FRESNEL_FRAGMENT: &str = r#"
    uniform vec3 u_color;
    uniform float u_alpha;
    uniform float u_bias;
    uniform float u_intensity;
    uniform float u_power;
    uniform float u_factor;

    varying vec3 v_worldPosition;
    varying vec3 v_worldNormal;

    void main() {
      float f_a = (u_factor + dot(v_worldPosition, v_worldNormal));
      float f_fresnel = u_bias + u_intensity * pow(abs(f_a), u_power);

      f_fresnel = clamp(f_fresnel, 0.0, 1.0);
      return vec4(f_fresnel * u_color, u_alpha);
    }
"#;

const GRADIENT_VERTEX: &str = r#"
    varying vec3 v_position;

    void main() {
      v_position = lamina_mapping_template;
    }
"#;

const GRADIENT_FRAGMENT: &str = r#"
    uniform vec3 u_colorA;
    uniform vec3 u_colorB;
    uniform float u_alpha;
    uniform float u_start;
    uniform float u_end;
    uniform float u_contrast;

    varying vec3 v_position;

    void main() {
      float f_step = smoothstep(u_start, u_end, v_position.axes_template * u_contrast);
      vec3 f_color = mix(u_colorA, u_colorB, f_step);

      return vec4(f_color, u_alpha);
    }
"#;

const MATCAP_VERTEX: &str = r#"
    varying vec3 v_position;
    varying vec3 v_normal;

    void main() {
      v_position = normalize(vec3(modelViewMatrix * vec4(position, 1.0)));
      v_normal = normalize(normalMatrix * normal);
    }
"#;

const MATCAP_FRAGMENT: &str = r#"
    uniform sampler2D u_map;
    uniform float u_alpha;
    varying vec3 v_position;
    varying vec3 v_normal;

    void main() {
      vec3 f_r = reflect(v_position, v_normal);
      float f_m = 2. * sqrt(pow(f_r.x, 2.) + pow(f_r.y, 2.) + pow(f_r.z + 1., 2.));
      vec2 f_vN = f_r.xy / f_m + .5;

      vec3 f_base = texture2D(u_map, f_vN).rgb;

      return vec4(f_base, u_alpha);
    }
"#;

const TEXTURE_VERTEX: &str = r#"
    varying vec2 v_uv;

    void main() {
      v_uv = uv;
    }
"#;

const TEXTURE_FRAGMENT: &str = r#"
    uniform sampler2D u_map;
    uniform float u_alpha;
    varying vec2 v_uv;

    void main() {
      vec3 f_color = texture2D(u_map, v_uv).rgb;
      return vec4(f_color, u_alpha);
    }
"#;

const DISPLACE_VERTEX: &str = r#"
    uniform float u_strength;
    uniform float u_scale;
    uniform vec3 u_offset;

    vec3 displace(vec3 p) {
      vec3 f_position = lamina_mapping_template;
      float f_n = lamina_noise_template((f_position + u_offset) * u_scale) * u_strength;
      vec3 f_newPosition = p + (f_n * normal);

      return f_newPosition;
    }

    vec3 orthogonal(vec3 v) {
      return normalize(abs(v.x) > abs(v.z) ? vec3(-v.y, v.x, 0.0)
      : vec3(0.0, -v.z, v.y));
    }

    vec3 recalcNormals(vec3 newPos) {
      float offset = 0.001;
      vec3 tangent = orthogonal(normal);
      vec3 bitangent = normalize(cross(normal, tangent));
      vec3 neighbour1 = position + tangent * offset;
      vec3 neighbour2 = position + bitangent * offset;
      vec3 displacedNeighbour1 = displace(neighbour1);
      vec3 displacedNeighbour2 = displace(neighbour2);
      vec3 displacedTangent = displacedNeighbour1 - newPos;
      vec3 displacedBitangent = displacedNeighbour2 - newPos;
      return normalize(cross(displacedTangent, displacedBitangent));
    }

    void main() {
      vec3 f_newPosition = displace(position);
      lamina_finalNormal = recalcNormals(f_newPosition);

      return f_newPosition;
    }
"#;

const NORMAL_VERTEX: &str = r#"
    varying vec3 v_normals;

    void main() {
      v_normals = normal;
    }
"#;

const NORMAL_FRAGMENT: &str = r#"
    uniform float u_alpha;
    uniform vec3 u_direction;

    varying vec3 v_normals;

    void main() {
      vec3 f_normalColor = vec3(1.);
      f_normalColor.x = v_normals.x * u_direction.x;
      f_normalColor.y = v_normals.y * u_direction.y;
      f_normalColor.z = v_normals.z * u_direction.z;

      return vec4(f_normalColor, u_alpha);
    }
"#;
