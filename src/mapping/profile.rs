//! Mapping profiles: named, independently activatable sets of mappings

use super::MidiParameterMapping;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A named collection of parameter mappings a performer can switch to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiMapping {
    /// Unique key in the mapping store
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<MidiParameterMapping>,
    #[serde(default)]
    pub is_active: bool,
}

impl MidiMapping {
    /// Create an empty, inactive profile
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mappings: Vec::new(),
            is_active: false,
        }
    }

    /// Add a parameter mapping (builder pattern)
    pub fn with(mut self, mapping: MidiParameterMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Set the active flag (builder pattern)
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Validate the profile and every mapping in it
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::BlankProfileId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankProfileName);
        }
        for mapping in &self.mappings {
            mapping.validate()?;
        }
        Ok(())
    }

    /// Remove the first entry equal to `mapping`. Returns whether one was found.
    pub fn remove_parameter(&mut self, mapping: &MidiParameterMapping) -> bool {
        match self.mappings.iter().position(|m| m == mapping) {
            Some(index) => {
                self.mappings.remove(index);
                true
            }
            None => false,
        }
    }
}
