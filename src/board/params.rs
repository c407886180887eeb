//! Simulation parameters for the base-pairing/stacking energy model.

use serde::{Deserialize, Serialize};

/// Energy-model and proposal parameters.
///
/// Serialized field names are the wire names of the board JSON schema; any
/// field absent from the input falls back to its default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Probability of proposing a split, given that the chosen unit is paired.
    #[serde(rename = "split")]
    pub split_prob: f64,
    /// Stacking contribution per adjacent pair.
    #[serde(rename = "stack")]
    pub stack_energy: f64,
    /// A-U base pair energy.
    #[serde(rename = "au")]
    pub au_energy: f64,
    /// G-C base pair energy.
    #[serde(rename = "gc")]
    pub gc_energy: f64,
    /// G-U wobble pair energy.
    #[serde(rename = "gu")]
    pub gu_energy: f64,
    /// Metropolis temperature.
    pub temp: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            split_prob: 0.5,
            stack_energy: 4.0,
            au_energy: -2.0,
            gc_energy: 2.0,
            gu_energy: -3.0,
            temp: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Params::default();
        assert_eq!(p.split_prob, 0.5);
        assert_eq!(p.stack_energy, 4.0);
        assert_eq!(p.au_energy, -2.0);
        assert_eq!(p.gc_energy, 2.0);
        assert_eq!(p.gu_energy, -3.0);
        assert_eq!(p.temp, 1.0);
    }

    #[test]
    fn test_serde_wire_names() {
        let p = Params::default();
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["split"], 0.5);
        assert_eq!(json["stack"], 4.0);
        assert_eq!(json["au"], -2.0);
        assert_eq!(json["gc"], 2.0);
        assert_eq!(json["gu"], -3.0);
        assert_eq!(json["temp"], 1.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let p: Params = serde_json::from_str(r#"{"split": 0.25, "temp": 2.0}"#).unwrap();
        assert_eq!(p.split_prob, 0.25);
        assert_eq!(p.temp, 2.0);
        assert_eq!(p.stack_energy, 4.0);
        assert_eq!(p.gu_energy, -3.0);
    }
}
