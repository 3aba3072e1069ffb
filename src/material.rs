//! Material Module for Lamina Compiler
//!
//! A [`Material`] owns an ordered stack of layers plus the base color and
//! alpha every fragment program starts from. It recomposes whenever a layer
//! signals that its program text changed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::compose::{compose, merge_uniforms, ComposedProgram, BASE_ALPHA_UNIFORM, BASE_COLOR_UNIFORM};
use crate::layer::{Layer, RebuildNotifier};
use crate::property::UniformTable;
use crate::validate::{LaminaError, Result};
use crate::value::{round_to_two, Color, Value};

pub const DEFAULT_MATERIAL_NAME: &str = "LayerMaterial";

/// Lighting model of the host material the program is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lighting {
    #[default]
    Basic,
    Phong,
    Physical,
    Toon,
    Lambert,
    Standard,
}

impl Lighting {
    pub fn as_str(self) -> &'static str {
        match self {
            Lighting::Basic => "basic",
            Lighting::Phong => "phong",
            Lighting::Physical => "physical",
            Lighting::Toon => "toon",
            Lighting::Lambert => "lambert",
            Lighting::Standard => "standard",
        }
    }
}

impl fmt::Display for Lighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lighting {
    type Err = LaminaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Lighting::Basic),
            "phong" => Ok(Lighting::Phong),
            "physical" => Ok(Lighting::Physical),
            "toon" => Ok(Lighting::Toon),
            "lambert" => Ok(Lighting::Lambert),
            "standard" => Ok(Lighting::Standard),
            _ => Err(LaminaError::InvalidValue {
                key: "lighting".to_string(),
                reason: format!("unknown lighting model '{}'", s),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<Lighting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct Material {
    name: String,
    color: Color,
    alpha: f64,
    lighting: Lighting,
    layers: Vec<Layer>,
    program: ComposedProgram,
    signal: Arc<AtomicU64>,
    seen: u64,
}

impl Material {
    pub fn new(options: MaterialOptions) -> Result<Material> {
        let color = match options.color.as_deref() {
            Some(text) => Color::parse(text).ok_or_else(|| LaminaError::InvalidValue {
                key: "color".to_string(),
                reason: format!("'{}' is not a color", text),
            })?,
            None => Color::from_hex(0xffffff),
        };
        let mut material = Material {
            name: options
                .name
                .unwrap_or_else(|| DEFAULT_MATERIAL_NAME.to_string()),
            color,
            alpha: options.alpha.unwrap_or(1.0),
            lighting: options.lighting.unwrap_or_default(),
            layers: Vec::new(),
            program: ComposedProgram::default(),
            signal: Arc::new(AtomicU64::new(0)),
            seen: 0,
        };
        material.refresh();
        Ok(material)
    }

    pub fn with_layers(options: MaterialOptions, layers: Vec<Layer>) -> Result<Material> {
        let mut material = Material::new(options)?;
        for mut layer in layers {
            material.check_unique(layer.id())?;
            layer.attach_notifier(RebuildNotifier::new(&material.signal));
            material.layers.push(layer);
        }
        material.refresh();
        Ok(material)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    pub fn program(&self) -> &ComposedProgram {
        &self.program
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    /// Two layers with one id would share namespaced uniform keys.
    fn check_unique(&self, id: &str) -> Result<()> {
        match self.position(id) {
            Some(_) => Err(LaminaError::DuplicateLayer(id.to_string())),
            None => Ok(()),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Layer stack
    // ───────────────────────────────────────────────────────────────────────────

    /// Append a layer on top of the stack. Returns its id.
    pub fn add_layer(&mut self, layer: Layer) -> Result<String> {
        let index = self.layers.len();
        self.insert_layer(index, layer)
    }

    /// Insert at `index`, clamped to the stack length. Fails with
    /// `DuplicateLayer` if the stack already holds a layer with this id.
    pub fn insert_layer(&mut self, index: usize, mut layer: Layer) -> Result<String> {
        self.check_unique(layer.id())?;
        layer.attach_notifier(RebuildNotifier::new(&self.signal));
        let id = layer.id().to_string();
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        self.refresh();
        Ok(id)
    }

    pub fn remove_layer(&mut self, id: &str) -> Option<Layer> {
        let index = self.position(id)?;
        let mut layer = self.layers.remove(index);
        layer.detach_notifier();
        self.refresh();
        Some(layer)
    }

    /// Move a layer to `index`, clamped. Returns false for an unknown id.
    pub fn move_layer(&mut self, id: &str, index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let layer = self.layers.remove(from);
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        self.refresh();
        true
    }

    /// Mutate one layer in place, then bring the program up to date: a full
    /// recompose if the layer rebuilt, otherwise a uniform push.
    pub fn with_layer_mut<R>(&mut self, id: &str, f: impl FnOnce(&mut Layer) -> R) -> Option<R> {
        let index = self.position(id)?;
        let result = f(&mut self.layers[index]);
        self.sync();
        Some(result)
    }

    pub fn set_layer_property(&mut self, id: &str, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.with_layer_mut(id, |layer| layer.set(name, value))
            .ok_or_else(|| LaminaError::UnknownLayer(id.to_string()))?
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Base properties
    // ───────────────────────────────────────────────────────────────────────────

    pub fn set_color(&mut self, color: &str) -> Result<()> {
        self.color = Color::parse(color).ok_or_else(|| LaminaError::InvalidValue {
            key: "color".to_string(),
            reason: format!("'{}' is not a color", color),
        })?;
        self.refresh_uniforms();
        Ok(())
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.refresh_uniforms();
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
        self.refresh();
    }

    /// Base uniforms; the color is converted to linear space.
    pub fn base_uniforms(&self) -> UniformTable {
        let mut uniforms = UniformTable::new();
        uniforms.insert(
            BASE_COLOR_UNIFORM.to_string(),
            Value::Color(self.color.to_linear()),
        );
        uniforms.insert(BASE_ALPHA_UNIFORM.to_string(), Value::Number(self.alpha));
        uniforms
    }

    pub fn options(&self) -> MaterialOptions {
        MaterialOptions {
            color: Some(self.color.to_hex()),
            alpha: Some(round_to_two(self.alpha)),
            lighting: Some(self.lighting),
            name: Some(self.name.clone()),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Refresh
    // ───────────────────────────────────────────────────────────────────────────

    fn sync(&mut self) {
        let current = self.signal.load(Ordering::SeqCst);
        if current != self.seen {
            self.refresh();
        } else {
            self.refresh_uniforms();
        }
    }

    /// Recompose the program from the current layer stack.
    pub fn refresh(&mut self) {
        self.seen = self.signal.load(Ordering::SeqCst);
        self.program = compose(&self.layers, &self.base_uniforms());
        log::debug!(
            "[Lamina] Recomposed '{}' from {} layers ({} uniforms)",
            self.name,
            self.layers.len(),
            self.program.uniforms.len()
        );
    }

    fn refresh_uniforms(&mut self) {
        self.program.uniforms = merge_uniforms(&self.layers, &self.base_uniforms());
    }
}
