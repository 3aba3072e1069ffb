//! Layer definitions.
//!
//! A [`LayerDefinition`] is the class-level description shared by every
//! instance of a layer kind: templates, ordered defaults and hooks. Defaults
//! are routed once, at registration, by name:
//!
//! - `u_*` → uniform default under the short name (`u_color` → `color`)
//! - `fragmentShader` / `vertexShader` → the templates
//! - reserved names → ignored
//! - anything else → non-uniform default
//!
//! Every definition carries the non-uniform defaults `mode` and `visible`.

use crate::blend::BlendMode;
use crate::hooks::{Hook, LayerHooks};
use crate::renamer::UNIFORM_PREFIX;
use crate::validate::{check_disjoint, Result};
use crate::value::Value;

const RESERVED_NAMES: [&str; 4] = ["length", "prototype", "name", "constructor"];

const MODE: &str = "mode";
const VISIBLE: &str = "visible";

#[derive(Debug, Clone, PartialEq)]
pub struct LayerDefinition {
    name: String,
    fragment: String,
    vertex: String,
    uniforms: Vec<(String, Value)>,
    non_uniforms: Vec<(String, Value)>,
    hooks: LayerHooks,
}

impl LayerDefinition {
    pub fn builder(name: impl Into<String>) -> LayerDefinitionBuilder {
        LayerDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    /// Uniform defaults by short name, in declaration order.
    pub fn uniforms(&self) -> &[(String, Value)] {
        &self.uniforms
    }

    /// Non-uniform defaults, `mode` and `visible` first.
    pub fn non_uniforms(&self) -> &[(String, Value)] {
        &self.non_uniforms
    }

    pub fn hooks(&self) -> LayerHooks {
        self.hooks
    }
}

#[derive(Debug, Clone)]
pub struct LayerDefinitionBuilder {
    name: String,
    fragment: String,
    vertex: String,
    uniforms: Vec<(String, Value)>,
    non_uniforms: Vec<(String, Value)>,
    hooks: LayerHooks,
}

impl LayerDefinitionBuilder {
    fn new(name: impl Into<String>) -> Self {
        LayerDefinitionBuilder {
            name: name.into(),
            fragment: String::new(),
            vertex: String::new(),
            uniforms: Vec::new(),
            non_uniforms: Vec::new(),
            hooks: LayerHooks::default(),
        }
    }

    pub fn fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment = source.into();
        self
    }

    pub fn vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex = source.into();
        self
    }

    /// Declare a default by its raw name and let the name decide its role.
    pub fn default(self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if let Some(short) = name.strip_prefix(UNIFORM_PREFIX) {
            return self.uniform(short, value);
        }
        match name {
            "fragmentShader" => match value {
                Value::Text(source) => self.fragment(source),
                _ => self,
            },
            "vertexShader" => match value {
                Value::Text(source) => self.vertex(source),
                _ => self,
            },
            reserved if RESERVED_NAMES.contains(&reserved) => {
                log::debug!("[Lamina] Ignoring reserved default '{}' on {}", name, self.name);
                self
            }
            _ => self.non_uniform(name, value),
        }
    }

    /// Declare a uniform default by short name.
    pub fn uniform(mut self, short_name: &str, value: impl Into<Value>) -> Self {
        self.uniforms.push((short_name.to_string(), value.into()));
        self
    }

    pub fn non_uniform(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.non_uniforms.push((name.to_string(), value.into()));
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

    pub fn on_shader_parse(mut self, hook: Hook) -> Self {
        self.hooks.on_shader_parse = Some(hook);
        self
    }

    pub fn hooks(mut self, hooks: LayerHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validate and freeze. Fails with `DuplicateProperty` naming the first
    /// key that is declared twice or as both uniform and non-uniform.
    pub fn build(self) -> Result<LayerDefinition> {
        let implicit: Vec<&str> = [MODE, VISIBLE]
            .into_iter()
            .filter(|k| !self.non_uniforms.iter().any(|(name, _)| name == *k))
            .collect();
        check_disjoint(
            &self.name,
            self.uniforms.iter().map(|(k, _)| k.as_str()),
            implicit
                .iter()
                .copied()
                .chain(self.non_uniforms.iter().map(|(k, _)| k.as_str())),
        )?;

        let mut uniforms = Vec::with_capacity(self.uniforms.len());
        for (key, value) in self.uniforms {
            let value = value.into_uniform(&key)?;
            uniforms.push((key, value));
        }

        let mut non_uniforms = vec![
            (MODE.to_string(), Value::from(BlendMode::Normal.as_str())),
            (VISIBLE.to_string(), Value::Bool(true)),
        ];
        for (key, value) in self.non_uniforms {
            match non_uniforms.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => non_uniforms.push((key, value)),
            }
        }

        Ok(LayerDefinition {
            name: self.name,
            fragment: self.fragment,
            vertex: self.vertex,
            uniforms,
            non_uniforms,
            hooks: self.hooks,
        })
    }
}
