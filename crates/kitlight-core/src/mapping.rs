//! Note-to-light mapping table

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A named light source with the notes that trigger it and its base color.
///
/// Loaded once at startup and immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightMapping {
    /// Display name, used only in logs
    pub name: String,
    /// Trigger note numbers (set semantics)
    pub notes: Vec<u8>,
    /// Base color a triggered flash starts from
    pub color: Color,
}

impl LightMapping {
    /// Create a mapping
    pub fn new(name: impl Into<String>, notes: Vec<u8>, color: Color) -> Self {
        Self {
            name: name.into(),
            notes,
            color,
        }
    }
}

/// Ordered collection of [`LightMapping`]s with first-match lookup.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    mappings: Vec<LightMapping>,
}

impl MappingTable {
    /// Build a table from mappings in priority order.
    ///
    /// A note claimed by more than one mapping is a configuration error;
    /// lookup stays first-match-wins and each overlap is reported once.
    pub fn new(mappings: Vec<LightMapping>) -> Self {
        let mut claimed = HashSet::new();
        for mapping in &mappings {
            for &note in &mapping.notes {
                if !claimed.insert(note) {
                    tracing::warn!(
                        note,
                        mapping = %mapping.name,
                        "note already claimed by an earlier mapping; first match wins"
                    );
                }
            }
        }
        Self { mappings }
    }

    /// First mapping whose trigger set contains `note`, if any.
    pub fn lookup(&self, note: u8) -> Option<&LightMapping> {
        self.mappings
            .iter()
            .find(|mapping| mapping.notes.contains(&note))
    }

    /// Number of mappings in the table
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the table has no mappings
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
