use crate::constants::GAS;
use crate::error::VeResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// End of the column that rows, profiles and elevations are counted from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceEnd {
    /// Row 0 is the first cell the topology lists for a column (the top of the stack)
    #[default]
    Top,
    /// Row 0 is the last cell the topology lists for a column
    Bottom,
}

/// Settings for building a [`crate::ve_props::VeProps`].
///
/// Every field has a default, so a partial JSON document such as
/// `{ "reference_end": "bottom" }` is a valid configuration.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VeConfig {
    pub reference_end: ReferenceEnd,
    /// Offset of the CO2 phase inside each per-cell saturation record
    pub gas_phase: usize,
}

impl Default for VeConfig {
    fn default() -> Self {
        Self {
            reference_end: ReferenceEnd::Top,
            gas_phase: GAS,
        }
    }
}

impl VeConfig {
    pub fn from_json_str(json: &str) -> VeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> VeResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::debug!(
            "loaded VE configuration from {}: {:?}",
            path.as_ref().display(),
            config
        );
        Ok(config)
    }

    pub fn to_json(&self) -> VeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
