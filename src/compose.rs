//! Compose Module for Lamina Compiler
//!
//! Concatenates the processed fragments of visible layers into one vertex and
//! one fragment program. Layer order is blend order: each layer's body reads
//! and rewrites the accumulators left by the layers before it.

use crate::blend::BLEND_MODES_CHUNK;
use crate::chunks::{HELPERS_CHUNK, NOISE_CHUNK};
use crate::layer::Layer;
use crate::property::UniformTable;
use crate::transform::{FINAL_COLOR, FINAL_NORMAL, FINAL_POSITION};

pub const BASE_COLOR_UNIFORM: &str = "u_lamina_color";
pub const BASE_ALPHA_UNIFORM: &str = "u_lamina_alpha";

/// Program text and uniform table handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedProgram {
    pub vertex_source: String,
    pub fragment_source: String,
    pub uniforms: UniformTable,
}

/// Compose `layers` in order. Invisible layers contribute nothing.
pub fn compose(layers: &[Layer], base_uniforms: &UniformTable) -> ComposedProgram {
    let mut vertex_variables = String::new();
    let mut fragment_variables = String::new();
    let mut vertex_body = String::new();
    let mut fragment_body = String::new();

    for layer in layers.iter().filter(|l| l.visible()) {
        let processed = layer.processed();
        push_line(&mut vertex_variables, &processed.vertex_variables);
        push_line(&mut fragment_variables, &processed.fragment_variables);
        push_line(&mut vertex_body, &processed.vertex);
        push_line(&mut fragment_body, &processed.fragment);
    }

    let vertex_source = format!(
        "{helpers}\n{noise}\n{variables}\nvoid main() {{\n  vec3 {position} = position;\n  vec3 {normal} = normal;\n\n{body}\n  csm_Position = {position};\n  csm_Normal = {normal};\n}}\n",
        helpers = HELPERS_CHUNK,
        noise = NOISE_CHUNK,
        variables = vertex_variables,
        position = FINAL_POSITION,
        normal = FINAL_NORMAL,
        body = vertex_body,
    );

    let fragment_source = format!(
        "{helpers}\n{noise}\n{blend}\n{variables}\nuniform vec3 {base_color};\nuniform float {base_alpha};\n\nvoid main() {{\n  vec4 {color} = vec4({base_color}, {base_alpha});\n\n{body}\n  csm_DiffuseColor = {color};\n}}\n",
        helpers = HELPERS_CHUNK,
        noise = NOISE_CHUNK,
        blend = BLEND_MODES_CHUNK,
        variables = fragment_variables,
        base_color = BASE_COLOR_UNIFORM,
        base_alpha = BASE_ALPHA_UNIFORM,
        color = FINAL_COLOR,
        body = fragment_body,
    );

    ComposedProgram {
        vertex_source,
        fragment_source,
        uniforms: merge_uniforms(layers, base_uniforms),
    }
}

/// Union of visible layers' uniform tables, base uniforms merged last.
pub fn merge_uniforms(layers: &[Layer], base_uniforms: &UniformTable) -> UniformTable {
    let mut uniforms = UniformTable::new();
    for layer in layers.iter().filter(|l| l.visible()) {
        uniforms.extend(layer.uniforms().iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    uniforms.extend(base_uniforms.iter().map(|(k, v)| (k.clone(), v.clone())));
    uniforms
}

fn push_line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}
