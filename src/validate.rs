//! Validation Module for Lamina Compiler
//!
//! Error taxonomy and registration-time checks on layer definitions.
//!
//! Malformed GLSL is never an error here: the tokenizer and extractor degrade
//! and the host renderer reports compile failures. Errors are reserved for
//! configuration mistakes a caller can fix.

use std::collections::HashSet;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_DUPLICATE_PROPERTY: &str = "L-ERR-SCHEMA-001";
pub const ERR_UNKNOWN_PROPERTY: &str = "L-ERR-PROP-001";
pub const ERR_INVALID_VALUE: &str = "L-ERR-VALUE-001";
pub const ERR_INVALID_LAYER_ID: &str = "L-ERR-ID-001";
pub const ERR_UNKNOWN_KIND: &str = "L-ERR-KIND-001";
pub const ERR_DUPLICATE_KIND: &str = "L-ERR-KIND-002";
pub const ERR_UNKNOWN_LAYER: &str = "L-ERR-LAYER-001";
pub const ERR_DUPLICATE_LAYER: &str = "L-ERR-LAYER-002";
pub const ERR_UNSUPPORTED_FILE: &str = "L-ERR-FILE-001";
pub const ERR_JSON: &str = "L-ERR-JSON-001";
pub const ERR_IO: &str = "L-ERR-IO-001";

#[derive(Debug, Error)]
pub enum LaminaError {
    #[error("layer kind '{kind}' declares '{key}' more than once (uniform and non-uniform names must be disjoint)")]
    DuplicateProperty { kind: String, key: String },

    #[error("layer '{layer}' has no property '{key}'")]
    UnknownProperty { layer: String, key: String },

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("invalid layer id '{0}': ids must be non-empty ASCII alphanumeric and not of the generated form 'l<hex>'")]
    InvalidLayerId(String),

    #[error("unknown layer kind '{0}'")]
    UnknownKind(String),

    #[error("layer kind '{0}' is already registered")]
    DuplicateKind(String),

    #[error("no layer with id '{0}'")]
    UnknownLayer(String),

    #[error("material already holds a layer with id '{0}'")]
    DuplicateLayer(String),

    #[error("unsupported file type '{0}'")]
    UnsupportedFile(String),

    #[error("malformed lamina file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl LaminaError {
    pub fn code(&self) -> &'static str {
        match self {
            LaminaError::DuplicateProperty { .. } => ERR_DUPLICATE_PROPERTY,
            LaminaError::UnknownProperty { .. } => ERR_UNKNOWN_PROPERTY,
            LaminaError::InvalidValue { .. } => ERR_INVALID_VALUE,
            LaminaError::InvalidLayerId(_) => ERR_INVALID_LAYER_ID,
            LaminaError::UnknownKind(_) => ERR_UNKNOWN_KIND,
            LaminaError::DuplicateKind(_) => ERR_DUPLICATE_KIND,
            LaminaError::UnknownLayer(_) => ERR_UNKNOWN_LAYER,
            LaminaError::DuplicateLayer(_) => ERR_DUPLICATE_LAYER,
            LaminaError::UnsupportedFile(_) => ERR_UNSUPPORTED_FILE,
            LaminaError::Json(_) => ERR_JSON,
            LaminaError::Io(_) => ERR_IO,
        }
    }
}

pub type Result<T, E = LaminaError> = std::result::Result<T, E>;

// ═══════════════════════════════════════════════════════════════════════════════
// DEFINITION CHECKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reject a definition whose uniform and non-uniform short names overlap, or
/// that repeats a name within either set. Reports the first offending key.
pub fn check_disjoint<'a>(
    kind: &str,
    uniforms: impl IntoIterator<Item = &'a str>,
    non_uniforms: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for key in uniforms.into_iter().chain(non_uniforms) {
        if !seen.insert(key) {
            return Err(LaminaError::DuplicateProperty {
                kind: kind.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Generated ids are `l` followed by lowercase hex digits.
pub fn is_generated_layer_id(id: &str) -> bool {
    match id.strip_prefix('l') {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')),
        None => false,
    }
}

/// Layer ids become part of GLSL identifiers. Explicit ids may not take the
/// generated form, so they can never collide with a counter-issued id.
pub fn check_layer_id(id: &str) -> Result<()> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) && !is_generated_layer_id(id) {
        Ok(())
    } else {
        Err(LaminaError::InvalidLayerId(id.to_string()))
    }
}
