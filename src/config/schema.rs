//! Configuration schema definitions

use crate::mapping::MidiMapping;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main configuration for padmap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PadmapConfig {
    /// Engine behaviour
    #[serde(default)]
    pub engine: EngineConfig,

    /// Profiles loaded into the store at startup
    #[serde(default)]
    pub profiles: Vec<MidiMapping>,
}

impl PadmapConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile
                .validate()
                .with_context(|| format!("Profile '{}' is invalid", profile.id))?;
            if !seen.insert(profile.id.as_str()) {
                bail!("Profile id '{}' is defined more than once", profile.id);
            }
        }

        if self.engine.activation == ActivationPolicy::Exclusive {
            let active = self.profiles.iter().filter(|p| p.is_active).count();
            if active > 1 {
                bail!(
                    "Exclusive activation allows one active profile, {} are marked active",
                    active
                );
            }
        }

        Ok(())
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How activating a profile affects the others (default: layered)
    #[serde(default)]
    pub activation: ActivationPolicy,

    /// Also report duplicate sources inside a single profile (default: false)
    #[serde(default)]
    pub scan_within_profiles: bool,

    /// Round-trip tolerance for mapping consistency checks, as a fraction
    /// of the 7-bit range (default: 0.01)
    #[serde(default = "default_consistency_tolerance")]
    pub consistency_tolerance: f64,

    /// Buffered snapshot events per subscriber (default: 16)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl EngineConfig {
    /// Validate engine settings
    pub fn validate(&self) -> Result<()> {
        if !(self.consistency_tolerance > 0.0 && self.consistency_tolerance <= 1.0) {
            bail!("Consistency tolerance must be in (0.0, 1.0]");
        }
        if self.event_capacity == 0 {
            bail!("Event capacity must be at least 1");
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation: ActivationPolicy::default(),
            scan_within_profiles: false,
            consistency_tolerance: default_consistency_tolerance(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_consistency_tolerance() -> f64 { 0.01 }
fn default_event_capacity() -> usize { 16 }

/// Profile activation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Any number of profiles may be active. Switching the current profile
    /// deactivates only the previously current one.
    #[default]
    Layered,
    /// At most one active profile. Activating any profile deactivates the rest.
    Exclusive,
}
