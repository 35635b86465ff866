use crate::SquareGraphError;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Parameters of the square graph and its candidate-pairing pass.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SquareGraphParams {
    /// How much worse (degrees) the neighbouring side pairs may align than
    /// the candidate side pair before the pairing is rejected.
    pub parallel_tolerance_deg: f64,
    /// Number of nearest square centres examined per square.
    pub nearest_neighbors: usize,
    /// Max centre distance, relative to the larger of the two squares'
    /// longest sides, for a pair to be considered.
    pub max_center_distance_ratio: f64,
}

impl Default for SquareGraphParams {
    fn default() -> Self {
        Self {
            parallel_tolerance_deg: 45.0,
            nearest_neighbors: 8,
            max_center_distance_ratio: 1.75,
        }
    }
}

impl SquareGraphParams {
    pub fn parallel_tolerance_rad(&self) -> f64 {
        self.parallel_tolerance_deg.to_radians()
    }

    pub fn validate(&self) -> Result<(), SquareGraphError> {
        if !(0.0..=90.0).contains(&self.parallel_tolerance_deg) {
            return Err(SquareGraphError::InvalidParam {
                name: "parallel_tolerance_deg",
                reason: format!("{} is outside [0, 90]", self.parallel_tolerance_deg),
            });
        }
        if self.nearest_neighbors == 0 {
            return Err(SquareGraphError::InvalidParam {
                name: "nearest_neighbors",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.max_center_distance_ratio.is_finite() || self.max_center_distance_ratio <= 0.0 {
            return Err(SquareGraphError::InvalidParam {
                name: "max_center_distance_ratio",
                reason: format!("{} is not a positive ratio", self.max_center_distance_ratio),
            });
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, SquareGraphError> {
        let params: Self = serde_json::from_str(raw)?;
        params.validate()?;
        Ok(params)
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SquareGraphError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write these parameters to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SquareGraphError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params = SquareGraphParams::from_json_str(r#"{ "nearest_neighbors": 4 }"#).unwrap();
        assert_eq!(params.nearest_neighbors, 4);
        assert_eq!(params.parallel_tolerance_deg, 45.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = SquareGraphParams::from_json_str(r#"{ "parallel_tolerance_deg": 120.0 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SquareGraphError::InvalidParam {
                name: "parallel_tolerance_deg",
                ..
            }
        ));

        let zero_k = SquareGraphParams {
            nearest_neighbors: 0,
            ..Default::default()
        };
        assert!(zero_k.validate().is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = SquareGraphParams::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, SquareGraphError::Json(_)));
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let params = SquareGraphParams {
            max_center_distance_ratio: 1.5,
            ..Default::default()
        };
        params.write_json(&path).unwrap();
        assert_eq!(SquareGraphParams::load_json(&path).unwrap(), params);
    }
}
