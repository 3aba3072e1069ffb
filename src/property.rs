//! Typed property table and editable-parameter schema.

use serde::Serialize;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    /// Pushed to the renderer's constant table. Setting it never rebuilds.
    Uniform,
    /// Changes the generated program text. Setting it rebuilds and notifies.
    NonUniform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    pub value: Value,
}

/// Insertion-ordered property storage. Names are unique across both kinds.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    entries: Vec<Property>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.entries.iter_mut().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns false, leaving the table untouched, when the name is taken.
    pub fn insert(&mut self, name: &str, kind: PropertyKind, value: Value) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(Property {
            name: name.to_string(),
            kind,
            value,
        });
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: PropertyKind) -> impl Iterator<Item = &Property> {
        self.entries.iter().filter(move |p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEMA
// ═══════════════════════════════════════════════════════════════════════════════

/// One editable parameter as seen by external tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    pub label: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// The control edits an image rather than a value.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub image: bool,
}

impl SchemaEntry {
    pub fn new(label: impl Into<String>, value: &Value) -> Self {
        SchemaEntry {
            label: label.into(),
            value: value.to_json(),
            options: None,
            min: None,
            max: None,
            image: false,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Attach the UI hints implied by well-known labels.
    pub fn with_special_parameters(mut self) -> Self {
        match self.label.as_str() {
            "alpha" => {
                self.min = Some(0.0);
                self.max = Some(1.0);
            }
            "scale" => self.min = Some(0.0),
            "map" => self.image = true,
            _ => {}
        }
        self
    }
}

/// Renderer constants keyed by namespaced name (`u_<id>_<short>`).
pub type UniformTable = std::collections::BTreeMap<String, Value>;
