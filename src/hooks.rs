//! Layer hooks.
//!
//! Hooks are plain functions selected from a closed, named set. Persisted
//! files store only the hook name; loading resolves it through a
//! [`HookRegistry`], so no code is ever reconstructed from file contents.

use std::collections::HashMap;
use std::fmt;

use crate::kinds;
use crate::layer::Layer;

pub type HookFn = fn(&mut Layer);

/// A named hook implementation.
#[derive(Clone, Copy)]
pub struct Hook {
    pub name: &'static str,
    pub func: HookFn,
}

impl Hook {
    pub const fn new(name: &'static str, func: HookFn) -> Self {
        Hook { name, func }
    }

    pub fn call(&self, layer: &mut Layer) {
        (self.func)(layer)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.name).finish()
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerHooks {
    /// Runs once the uniform properties are installed.
    pub on_uniforms_parse: Option<Hook>,
    /// Runs once the non-uniform properties are installed.
    pub on_non_uniforms_parse: Option<Hook>,
    /// Runs at the end of every shader rebuild.
    pub on_shader_parse: Option<Hook>,
}

impl LayerHooks {
    /// Slot-wise merge; `self` wins where both are set.
    pub fn or(self, fallback: LayerHooks) -> LayerHooks {
        LayerHooks {
            on_uniforms_parse: self.on_uniforms_parse.or(fallback.on_uniforms_parse),
            on_non_uniforms_parse: self.on_non_uniforms_parse.or(fallback.on_non_uniforms_parse),
            on_shader_parse: self.on_shader_parse.or(fallback.on_shader_parse),
        }
    }
}

/// Name → hook lookup used when loading persisted layers.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<&'static str, Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the hooks of the built-in layer kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for hook in kinds::builtin_hooks() {
            registry.register(hook);
        }
        registry
    }

    /// Registers `hook`, replacing any hook of the same name.
    pub fn register(&mut self, hook: Hook) {
        self.hooks.insert(hook.name, hook);
    }

    pub fn resolve(&self, name: &str) -> Option<Hook> {
        self.hooks.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
