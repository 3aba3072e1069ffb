//! Layer Module for Lamina Compiler
//!
//! A [`Layer`] is one instance of a layer kind. It owns its property values,
//! the uniform table it contributes to the composed program, the schema seen
//! by editors, and the four processed fragments the composer concatenates.
//!
//! Setting a uniform only pushes a value. Setting a non-uniform regenerates
//! the processed text and notifies the owning material, which recomposes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::blend::BlendMode;
use crate::definition::LayerDefinition;
use crate::functions::extract_main;
use crate::hash::content_hash;
use crate::hooks::{Hook, LayerHooks};
use crate::kinds::LayerKind;
use crate::lexer::tokenize;
use crate::property::{PropertyKind, PropertyTable, SchemaEntry, UniformTable};
use crate::renamer::{descope, LayerRenamer};
use crate::transform::{process_final, ShaderStage};
use crate::validate::{check_layer_id, LaminaError, Result};
use crate::value::Value;

/// Global counter for layer ids.
static LAYER_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn generate_layer_id() -> String {
    format!("l{:x}", LAYER_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROCESSED OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessedPart {
    Vertex,
    Fragment,
    VertexVariables,
    FragmentVariables,
}

/// Descoped, return-rewritten program pieces ready for composition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedShaders {
    pub vertex: String,
    pub fragment: String,
    pub vertex_variables: String,
    pub fragment_variables: String,
}

impl ProcessedShaders {
    fn part_mut(&mut self, part: ProcessedPart) -> &mut String {
        match part {
            ProcessedPart::Vertex => &mut self.vertex,
            ProcessedPart::Fragment => &mut self.fragment,
            ProcessedPart::VertexVariables => &mut self.vertex_variables,
            ProcessedPart::FragmentVariables => &mut self.fragment_variables,
        }
    }
}

/// Weak handle a layer uses to tell its material that program text changed.
#[derive(Debug, Clone)]
pub struct RebuildNotifier {
    signal: Weak<AtomicU64>,
}

impl RebuildNotifier {
    pub fn new(signal: &Arc<AtomicU64>) -> Self {
        RebuildNotifier {
            signal: Arc::downgrade(signal),
        }
    }

    fn notify(&self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTRUCTION OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-instance overrides applied on top of a kind's defaults.
#[derive(Debug, Clone, Default)]
pub struct LayerOverrides {
    pub id: Option<String>,
    pub values: Vec<(String, Value)>,
    pub hooks: LayerHooks,
}

impl LayerOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.push((name.to_string(), value.into()));
        self
    }

    pub fn mode(self, mode: BlendMode) -> Self {
        self.set("mode", mode.as_str())
    }

    pub fn visible(self, visible: bool) -> Self {
        self.set("visible", visible)
    }

    pub fn on_shader_parse(mut self, hook: Hook) -> Self {
        self.hooks.on_shader_parse = Some(hook);
        self
    }

    pub fn on_uniforms_parse(mut self, hook: Hook) -> Self {
        self.hooks.on_uniforms_parse = Some(hook);
        self
    }

    pub fn on_non_uniforms_parse(mut self, hook: Hook) -> Self {
        self.hooks.on_non_uniforms_parse = Some(hook);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Layer {
    id: String,
    kind: String,
    fragment_source: String,
    vertex_source: String,
    uniform_defaults: Vec<(String, Value)>,
    non_uniform_defaults: Vec<(String, Value)>,
    properties: PropertyTable,
    uniforms: UniformTable,
    schema: Vec<SchemaEntry>,
    processed: ProcessedShaders,
    hooks: LayerHooks,
    /// Uniforms whose writes regenerate program text, as marked by a hook.
    rebuild_on_set: HashSet<String>,
    notifier: Option<RebuildNotifier>,
}

impl Layer {
    pub fn new(kind: &LayerKind, overrides: LayerOverrides) -> Result<Layer> {
        Layer::from_definition(&kind.definition(), overrides)
    }

    pub fn from_definition(def: &LayerDefinition, overrides: LayerOverrides) -> Result<Layer> {
        let id = match overrides.id {
            Some(id) => {
                check_layer_id(&id)?;
                id
            }
            None => generate_layer_id(),
        };

        let mut layer = Layer {
            id,
            kind: def.name().to_string(),
            fragment_source: def.fragment().to_string(),
            vertex_source: def.vertex().to_string(),
            uniform_defaults: def.uniforms().to_vec(),
            non_uniform_defaults: def.non_uniforms().to_vec(),
            properties: PropertyTable::new(),
            uniforms: UniformTable::new(),
            schema: Vec::new(),
            processed: ProcessedShaders::default(),
            // Definition hooks take precedence over per-instance ones.
            hooks: def.hooks().or(overrides.hooks),
            rebuild_on_set: HashSet::new(),
            notifier: None,
        };

        layer.build_uniforms();
        layer.build_non_uniforms();
        for (name, value) in overrides.values {
            layer.assign(&name, value)?;
        }
        layer.rebuild();

        log::debug!(
            "[Lamina] Created {} layer '{}' ({} properties)",
            layer.kind,
            layer.id,
            layer.properties.len()
        );
        Ok(layer)
    }

    fn build_uniforms(&mut self) {
        let defaults = self.uniform_defaults.clone();
        for (name, value) in defaults {
            self.install_uniform(&name, value);
        }
        if let Some(hook) = self.hooks.on_uniforms_parse {
            hook.call(self);
        }
    }

    fn install_uniform(&mut self, name: &str, value: Value) -> bool {
        if !self
            .properties
            .insert(name, PropertyKind::Uniform, value.clone())
        {
            return false;
        }
        let key = LayerRenamer::new(&self.id).uniform_key(name);
        self.push_schema(SchemaEntry::new(name, &value));
        self.uniforms.insert(key, value);
        true
    }

    fn build_non_uniforms(&mut self) {
        let defaults = self.non_uniform_defaults.clone();
        for (name, value) in defaults {
            if !self
                .properties
                .insert(&name, PropertyKind::NonUniform, value.clone())
            {
                continue;
            }
            let entry = SchemaEntry::new(name.as_str(), &value);
            let entry = if name == "mode" {
                entry.with_options(BlendMode::option_names())
            } else {
                entry
            };
            self.push_schema(entry);
        }
        if let Some(hook) = self.hooks.on_non_uniforms_parse {
            hook.call(self);
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the kind this layer was created from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).map(|p| &p.value)
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn processed(&self) -> &ProcessedShaders {
        &self.processed
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn uniform_defaults(&self) -> &[(String, Value)] {
        &self.uniform_defaults
    }

    pub fn non_uniform_defaults(&self) -> &[(String, Value)] {
        &self.non_uniform_defaults
    }

    pub fn hooks(&self) -> LayerHooks {
        self.hooks
    }

    /// Unknown mode text reads as `normal`.
    pub fn blend_mode(&self) -> BlendMode {
        match self.get("mode") {
            Some(Value::Text(mode)) => mode.parse().unwrap_or_else(|_| {
                log::warn!(
                    "[Lamina] Layer '{}' has unknown blend mode '{}', using normal",
                    self.id,
                    mode
                );
                BlendMode::Normal
            }),
            _ => BlendMode::Normal,
        }
    }

    pub fn visible(&self) -> bool {
        self.get("visible").and_then(Value::as_bool).unwrap_or(true)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Mutation
    // ───────────────────────────────────────────────────────────────────────────

    /// Set a property. Uniforms update the constant table; non-uniforms
    /// rebuild the program text and notify the owning material. A uniform
    /// marked with [`Layer::rebuild_on_set`] behaves like a non-uniform.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let kind = self.assign(name, value.into())?;
        if kind == PropertyKind::NonUniform || self.rebuild_on_set.contains(name) {
            self.rebuild();
            self.notify();
        }
        Ok(())
    }

    /// Make writes to uniform `name` rebuild and notify. Meant for
    /// `on_uniforms_parse` hooks whose shader text depends on a uniform's
    /// value. Unknown names are ignored.
    pub fn rebuild_on_set(&mut self, name: &str) {
        if self.properties.contains(name) {
            self.rebuild_on_set.insert(name.to_string());
        }
    }

    pub fn rebuilds_on_set(&self, name: &str) -> bool {
        self.rebuild_on_set.contains(name)
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) -> Result<()> {
        self.set("mode", mode.as_str())
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<()> {
        self.set("visible", visible)
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<PropertyKind> {
        let kind = match self.properties.get(name) {
            Some(property) => property.kind,
            None => {
                return Err(LaminaError::UnknownProperty {
                    layer: self.id.clone(),
                    key: name.to_string(),
                })
            }
        };

        let value = match kind {
            PropertyKind::Uniform => value.into_uniform(name)?,
            PropertyKind::NonUniform => {
                match name {
                    "mode" => check_mode(&value)?,
                    "visible" => check_visible(&value)?,
                    _ => {}
                }
                value
            }
        };

        if kind == PropertyKind::Uniform {
            let key = LayerRenamer::new(&self.id).uniform_key(name);
            self.uniforms.insert(key, value.clone());
        }
        if let Some(property) = self.properties.get_mut(name) {
            property.value = value;
        }
        Ok(kind)
    }

    /// Add a uniform after construction. Setting an existing uniform this way
    /// just updates it.
    pub fn register_uniform(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into().into_uniform(name)?;
        match self.properties.get(name).map(|p| p.kind) {
            Some(PropertyKind::Uniform) => {
                self.assign(name, value)?;
                return Ok(());
            }
            Some(PropertyKind::NonUniform) => {
                return Err(LaminaError::DuplicateProperty {
                    kind: self.kind.clone(),
                    key: name.to_string(),
                })
            }
            None => {}
        }
        self.uniform_defaults.push((name.to_string(), value.clone()));
        self.install_uniform(name, value);
        self.notify();
        Ok(())
    }

    pub fn set_fragment_source(&mut self, source: impl Into<String>) {
        self.fragment_source = source.into();
        self.rebuild();
        self.notify();
    }

    pub fn set_vertex_source(&mut self, source: impl Into<String>) {
        self.vertex_source = source.into();
        self.rebuild();
        self.notify();
    }

    pub fn attach_notifier(&mut self, notifier: RebuildNotifier) {
        self.notifier = Some(notifier);
    }

    pub fn detach_notifier(&mut self) {
        self.notifier = None;
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Rebuild
    // ───────────────────────────────────────────────────────────────────────────

    /// Regenerate the processed fragments from the templates.
    ///
    /// Each template is tokenized and descoped exactly once per pass; `main`
    /// is then split off and its returns rewritten for the current mode.
    pub fn rebuild(&mut self) {
        let mode = self.blend_mode();
        let renamer = LayerRenamer::new(&self.id);

        let vertex = descope(&tokenize(&self.vertex_source), |n| renamer.rename(n));
        let fragment = descope(&tokenize(&self.fragment_source), |n| renamer.rename(n));
        let vertex_main = extract_main(&vertex);
        let fragment_main = extract_main(&fragment);

        let processed = ProcessedShaders {
            vertex: process_final(&vertex_main.body, ShaderStage::Vertex, &self.id, mode),
            fragment: process_final(&fragment_main.body, ShaderStage::Fragment, &self.id, mode),
            vertex_variables: vertex_main.variables,
            fragment_variables: fragment_main.variables,
        };
        self.processed = processed;

        if let Some(hook) = self.hooks.on_shader_parse {
            hook.call(self);
        }
        log::trace!("[Lamina] Rebuilt layer '{}' with mode {}", self.id, mode);
    }

    /// Replace the first occurrence of `marker` in one processed fragment.
    pub fn replace_processed(&mut self, part: ProcessedPart, marker: &str, replacement: &str) {
        let text = self.processed.part_mut(part);
        if text.contains(marker) {
            *text = text.replacen(marker, replacement, 1);
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Schema & hash
    // ───────────────────────────────────────────────────────────────────────────

    /// Add a schema entry, replacing any entry with the same label in place.
    pub fn push_schema(&mut self, entry: SchemaEntry) {
        match self.schema.iter_mut().find(|e| e.label == entry.label) {
            Some(existing) => *existing = entry,
            None => self.schema.push(entry),
        }
    }

    /// Editable parameters with their current values.
    pub fn schema(&self) -> Vec<SchemaEntry> {
        self.schema
            .iter()
            .map(|entry| {
                let mut entry = entry.clone();
                if let Some(value) = self.get(&entry.label) {
                    entry.value = value.to_json();
                }
                entry.with_special_parameters()
            })
            .collect()
    }

    /// Content hash over uniform values, then non-uniform values.
    pub fn hash(&self) -> String {
        let values: Vec<serde_json::Value> = self
            .properties
            .of_kind(PropertyKind::Uniform)
            .chain(self.properties.of_kind(PropertyKind::NonUniform))
            .map(|p| p.value.to_json())
            .collect();
        content_hash(&values)
    }
}

fn check_visible(value: &Value) -> Result<()> {
    match value {
        Value::Bool(_) => Ok(()),
        other => Err(LaminaError::InvalidValue {
            key: "visible".to_string(),
            reason: format!("expected a boolean, got {:?}", other),
        }),
    }
}

fn check_mode(value: &Value) -> Result<()> {
    match value {
        Value::Text(mode) => mode.parse::<BlendMode>().map(|_| ()),
        other => Err(LaminaError::InvalidValue {
            key: "mode".to_string(),
            reason: format!("expected a blend mode name, got {:?}", other),
        }),
    }
}
