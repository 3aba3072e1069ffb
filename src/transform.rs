//! Transform Module for Lamina Compiler
//!
//! Return rewriting: a layer's `return <expr>;` becomes an assignment into
//! the shared accumulator. In the fragment pass the assignment goes through
//! the layer's blend function, so every layer blends over whatever the
//! layers before it left in `lamina_finalColor`.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::blend::BlendMode;
use crate::renamer::{LayerRenamer, LOCAL_PREFIX};

pub const FINAL_COLOR: &str = "lamina_finalColor";
pub const FINAL_POSITION: &str = "lamina_finalPosition";
pub const FINAL_NORMAL: &str = "lamina_finalNormal";

lazy_static! {
    static ref RETURN_RE: Regex = Regex::new(r"\breturn\b\s*([^;]*);").unwrap();

    /// Bare `f_` names preceded by whitespace or an open paren.
    static ref LOCAL_NAME_RE: Regex = Regex::new(r"([\s(])f_([A-Za-z0-9_]*)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Rewrite an extracted `main` body for composition.
pub fn process_final(body: &str, stage: ShaderStage, layer_id: &str, mode: BlendMode) -> String {
    let renamer = LayerRenamer::new(layer_id);
    let body = namespace_locals(body, &renamer);

    let mut last_return: Option<String> = None;
    let mut lines: Vec<String> = Vec::new();

    for line in body.split('\n') {
        if !RETURN_RE.is_match(line) {
            lines.push(line.to_string());
            continue;
        }
        for caps in RETURN_RE.captures_iter(line) {
            last_return = Some(caps[1].trim().to_string());
        }
        let remainder = RETURN_RE.replace_all(line, "");
        if !remainder.trim().is_empty() {
            lines.push(remainder.trim_end().to_string());
        }
    }

    let mut out = lines.join("\n");
    if let Some(expr) = last_return {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&final_assignment(stage, &expr, mode));
    }
    out
}

/// The trailing accumulator assignment for a returned expression.
pub fn final_assignment(stage: ShaderStage, expr: &str, mode: BlendMode) -> String {
    match stage {
        ShaderStage::Vertex => format!("{} = {};", FINAL_POSITION, expr),
        ShaderStage::Fragment => format!("{} = {};", FINAL_COLOR, mode.call(FINAL_COLOR, expr)),
    }
}

/// Namespace `f_` names that reached the body as plain text rather than as
/// identifier tokens. Names already carrying this layer's id are left alone.
fn namespace_locals(body: &str, renamer: &LayerRenamer<'_>) -> String {
    LOCAL_NAME_RE
        .replace_all(body, |caps: &Captures<'_>| {
            let name = format!("{}{}", LOCAL_PREFIX, &caps[2]);
            if renamer.is_namespaced(&name) {
                caps[0].to_string()
            } else {
                format!("{}{}", &caps[1], renamer.rename(&name))
            }
        })
        .into_owned()
}
