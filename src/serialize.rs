//! Serialize Module for Lamina Compiler
//!
//! JSON persistence for layers and materials. Two file types exist, told
//! apart by `metadata.type`:
//!
//! - `"mat"`: a material base plus its layer stack
//! - `"layer"`: a single layer
//!
//! Hooks are stored by name and resolved against a [`HookRegistry`] on load.
//! A name the registry does not know is reported and the layer loads without
//! that hook.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::definition::LayerDefinition;
use crate::hooks::{Hook, HookRegistry, LayerHooks};
use crate::layer::{Layer, LayerOverrides};
use crate::material::{Material, MaterialOptions};
use crate::validate::{LaminaError, Result};
use crate::value::Value;

pub const FORMAT_VERSION: u32 = 1;
pub const MATERIAL_FILE_TYPE: &str = "mat";
pub const LAYER_FILE_TYPE: &str = "layer";
pub const MATERIAL_CONSTRUCTOR: &str = "LayerMaterial";

// ═══════════════════════════════════════════════════════════════════════════════
// FILE SHAPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(rename = "type")]
    pub file_type: String,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedHooks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_shader_parse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_non_uniforms_parse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_uniforms_parse: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedLayer {
    pub constructor: String,
    #[serde(default)]
    pub fragment: String,
    #[serde(default)]
    pub vertex: String,
    /// Uniform defaults by short name.
    #[serde(default)]
    pub uniforms: Map<String, serde_json::Value>,
    #[serde(default)]
    pub non_uniforms: Map<String, serde_json::Value>,
    /// Current values of every property.
    #[serde(default)]
    pub currents: Map<String, serde_json::Value>,
    #[serde(default)]
    pub functions: SerializedHooks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedBase {
    pub constructor: String,
    #[serde(default)]
    pub currents: Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialFile {
    pub metadata: Metadata,
    pub base: SerializedBase,
    #[serde(default)]
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFile {
    pub metadata: Metadata,
    pub base: SerializedLayer,
}

#[derive(Debug)]
pub enum Imported {
    Material(Material),
    Layer(Layer),
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════════

fn to_map(entries: &[(String, Value)]) -> Map<String, serde_json::Value> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

impl Layer {
    pub fn serialize(&self) -> SerializedLayer {
        let hooks = self.hooks();
        SerializedLayer {
            constructor: self.kind().to_string(),
            fragment: self.fragment_source().to_string(),
            vertex: self.vertex_source().to_string(),
            uniforms: to_map(self.uniform_defaults()),
            non_uniforms: to_map(self.non_uniform_defaults()),
            currents: self
                .properties()
                .iter()
                .map(|p| (p.name.clone(), p.value.to_json()))
                .collect(),
            functions: SerializedHooks {
                on_shader_parse: hooks.on_shader_parse.map(|h| h.name.to_string()),
                on_non_uniforms_parse: hooks.on_non_uniforms_parse.map(|h| h.name.to_string()),
                on_uniforms_parse: hooks.on_uniforms_parse.map(|h| h.name.to_string()),
            },
        }
    }

    pub fn to_file(&self) -> LayerFile {
        LayerFile {
            metadata: Metadata {
                version: FORMAT_VERSION,
                file_type: LAYER_FILE_TYPE.to_string(),
            },
            base: self.serialize(),
        }
    }
}

impl Material {
    pub fn serialize(&self) -> MaterialFile {
        let currents = match serde_json::to_value(self.options()) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Map::new(),
        };
        MaterialFile {
            metadata: Metadata {
                version: FORMAT_VERSION,
                file_type: MATERIAL_FILE_TYPE.to_string(),
            },
            base: SerializedBase {
                constructor: MATERIAL_CONSTRUCTOR.to_string(),
                currents,
            },
            layers: self.layers().iter().map(Layer::serialize).collect(),
        }
    }
}

pub fn export_layer(layer: &Layer) -> Result<String> {
    Ok(serde_json::to_string_pretty(&layer.to_file())?)
}

pub fn export_material(material: &Material) -> Result<String> {
    Ok(serde_json::to_string_pretty(&material.serialize())?)
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn import_str(json: &str, registry: &HookRegistry) -> Result<Imported> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    let metadata: Metadata = match raw.get("metadata") {
        Some(meta) => serde_json::from_value(meta.clone())?,
        None => return Err(LaminaError::UnsupportedFile("<missing metadata>".to_string())),
    };
    if metadata.version > FORMAT_VERSION {
        log::warn!(
            "[Lamina] File format version {} is newer than supported version {}",
            metadata.version,
            FORMAT_VERSION
        );
    }

    match metadata.file_type.as_str() {
        MATERIAL_FILE_TYPE => {
            let file: MaterialFile = serde_json::from_value(raw)?;
            import_material(&file, registry).map(Imported::Material)
        }
        LAYER_FILE_TYPE => {
            let file: LayerFile = serde_json::from_value(raw)?;
            import_layer(&file.base, registry).map(Imported::Layer)
        }
        other => Err(LaminaError::UnsupportedFile(other.to_string())),
    }
}

pub fn import_material(file: &MaterialFile, registry: &HookRegistry) -> Result<Material> {
    let options: MaterialOptions =
        serde_json::from_value(serde_json::Value::Object(file.base.currents.clone()))?;
    let layers = file
        .layers
        .iter()
        .map(|layer| import_layer(layer, registry))
        .collect::<Result<Vec<_>>>()?;
    log::info!(
        "[Lamina] Imported material {:?} with {} layers",
        options.name,
        layers.len()
    );
    Material::with_layers(options, layers)
}

fn resolve_hook(registry: &HookRegistry, layer: &str, name: Option<&String>) -> Option<Hook> {
    let name = name?;
    let hook = registry.resolve(name);
    if hook.is_none() {
        log::warn!(
            "[Lamina] Unknown hook '{}' on layer '{}', loading without it",
            name,
            layer
        );
    }
    hook
}

pub fn import_layer(serialized: &SerializedLayer, registry: &HookRegistry) -> Result<Layer> {
    let name = &serialized.constructor;
    let hooks = LayerHooks {
        on_shader_parse: resolve_hook(registry, name, serialized.functions.on_shader_parse.as_ref()),
        on_non_uniforms_parse: resolve_hook(
            registry,
            name,
            serialized.functions.on_non_uniforms_parse.as_ref(),
        ),
        on_uniforms_parse: resolve_hook(
            registry,
            name,
            serialized.functions.on_uniforms_parse.as_ref(),
        ),
    };

    let mut builder = LayerDefinition::builder(name.as_str())
        .fragment(serialized.fragment.as_str())
        .vertex(serialized.vertex.as_str())
        .hooks(hooks);
    for (key, value) in &serialized.uniforms {
        builder = builder.uniform(key, Value::from_json(value));
    }
    for (key, value) in &serialized.non_uniforms {
        builder = builder.non_uniform(key, Value::from_json(value));
    }
    let definition = builder.build()?;

    let mut layer = Layer::from_definition(&definition, LayerOverrides::new())?;
    for (key, value) in &serialized.currents {
        if let Err(e) = layer.set(key, Value::from_json(value)) {
            log::warn!("[Lamina] Skipping current '{}' on layer '{}': {}", key, name, e);
        }
    }
    Ok(layer)
}
