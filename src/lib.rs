//! # Lamina Compiler
//!
//! Composes stacks of shader "layers" into a single vertex and fragment
//! program for a host material.
//!
//! ## Pipeline
//!
//! 1. **Tokenize**: layer templates are split into GLSL tokens (`lexer`).
//! 2. **Descope**: `u_`, `v_` and `f_` identifiers are namespaced by layer
//!    id so layers never collide once concatenated (`renamer`).
//! 3. **Extract**: declarations before `main` and the body of `main` are
//!    split apart (`functions`).
//! 4. **Rewrite returns**: `return E;` becomes an assignment into
//!    `lamina_finalColor` through the layer's blend function, or into
//!    `lamina_finalPosition` for vertex code (`transform`).
//! 5. **Compose**: visible layers are concatenated in stack order around the
//!    shared helper, noise and blend chunks (`compose`).
//!
//! ## Invariants
//!
//! 1. Descoping is applied exactly once per rebuild pass.
//! 2. Uniform and non-uniform property names of a kind are disjoint.
//! 3. Setting a uniform never regenerates program text; setting a
//!    non-uniform always does and notifies the owning material.
//! 4. Layer order is blend order.

mod blend;
mod chunks;
mod compose;
mod definition;
mod functions;
mod hash;
mod hooks;
mod kinds;
mod layer;
mod lexer;
mod loader;
mod material;
mod property;
mod renamer;
mod serialize;
mod transform;
mod validate;
mod value;

#[cfg(test)]
mod blend_tests;
#[cfg(test)]
mod compose_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod rewrite_tests;
#[cfg(test)]
mod serialize_tests;

pub use blend::{BlendMode, BLEND_MODES_CHUNK};
pub use chunks::{HELPERS_CHUNK, NOISE_CHUNK};
pub use compose::{compose, merge_uniforms, ComposedProgram, BASE_ALPHA_UNIFORM, BASE_COLOR_UNIFORM};
pub use definition::{LayerDefinition, LayerDefinitionBuilder};
pub use functions::{extract_main, find_functions, ExtractedMain, FunctionDecl};
pub use hash::{compute_hash, content_hash};
pub use hooks::{Hook, HookFn, HookRegistry, LayerHooks};
pub use kinds::{builtin_hooks, LayerKind, LayerRegistry};
pub use layer::{Layer, LayerOverrides, ProcessedPart, ProcessedShaders, RebuildNotifier};
pub use lexer::{is_keyword, stringify, tokenize, Token, TokenKind};
pub use loader::{discover_files, load_directory, load_file};
pub use material::{Lighting, Material, MaterialOptions};
pub use property::{Property, PropertyKind, PropertyTable, SchemaEntry, UniformTable};
pub use renamer::{descope, LayerRenamer};
pub use serialize::{
    export_layer, export_material, import_layer, import_material, import_str, Imported,
    LayerFile, MaterialFile, Metadata, SerializedBase, SerializedHooks, SerializedLayer,
    FORMAT_VERSION,
};
pub use transform::{final_assignment, process_final, ShaderStage};
pub use validate::*;
pub use value::{Color, TextureRef, Value};
