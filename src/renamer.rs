//! Renamer Module for Lamina Compiler
//!
//! Descoping: rewrites identifier tokens so that names a layer declares stay
//! unique once several layers are concatenated into one program.
//!
//! Rename policy (case-sensitive prefix match on the raw name):
//! - `u_x` → `u_<id>_x` (uniform)
//! - `v_x` → `v_<id>_x` (varying)
//! - `f_x` → `f_<id>_x` (fragment-local helper)
//! - anything else is left alone, which keeps keywords, the shared
//!   accumulators and the `lamina_*` vocabulary intact.

use crate::lexer::{Token, TokenKind};

pub const UNIFORM_PREFIX: &str = "u_";
pub const VARYING_PREFIX: &str = "v_";
pub const LOCAL_PREFIX: &str = "f_";

const NAMESPACED_PREFIXES: [&str; 3] = [UNIFORM_PREFIX, VARYING_PREFIX, LOCAL_PREFIX];

/// Apply `rename` to every identifier token. Other tokens pass through.
pub fn descope<F>(tokens: &[Token], mut rename: F) -> Vec<Token>
where
    F: FnMut(&str) -> String,
{
    tokens
        .iter()
        .map(|token| {
            if token.kind != TokenKind::Identifier {
                return token.clone();
            }
            let renamed = rename(&token.text);
            if renamed == token.text {
                token.clone()
            } else {
                // Span keeps pointing at the original source bytes.
                Token::new(token.kind, renamed, token.span.clone())
            }
        })
        .collect()
}

/// Namespacing policy bound to a single layer id.
#[derive(Debug, Clone, Copy)]
pub struct LayerRenamer<'a> {
    layer_id: &'a str,
}

impl<'a> LayerRenamer<'a> {
    pub fn new(layer_id: &'a str) -> Self {
        LayerRenamer { layer_id }
    }

    pub fn rename(&self, name: &str) -> String {
        for prefix in NAMESPACED_PREFIXES {
            if let Some(rest) = name.strip_prefix(prefix) {
                return format!("{}{}_{}", prefix, self.layer_id, rest);
            }
        }
        name.to_string()
    }

    /// The namespaced uniform key for a short property name.
    pub fn uniform_key(&self, short_name: &str) -> String {
        format!("{}{}_{}", UNIFORM_PREFIX, self.layer_id, short_name)
    }

    /// True when `name` already carries this layer's namespace.
    pub fn is_namespaced(&self, name: &str) -> bool {
        NAMESPACED_PREFIXES.iter().any(|prefix| {
            name.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(self.layer_id))
                .is_some_and(|rest| rest.starts_with('_'))
        })
    }
}
