/// Overlay configuration, loadable from JSON
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::landmarks::LandmarkTopology;
use crate::obj::{ObjParser, VERTEX_SCALE_XY, VERTEX_SCALE_Z};
use crate::pose::{PoseEstimator, DEFAULT_REFERENCE_WIDTH};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    pub topology: LandmarkTopology,
    pub reference_width: f32,
    pub vertex_scale: [f32; 3],
    /// Mirror x for a front-facing camera
    pub mirror: bool,
}

impl OverlayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.reference_width.is_finite() && self.reference_width > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "reference_width must be positive, got {}",
                self.reference_width
            )));
        }
        if let Some(index) = self
            .topology
            .reference_indices()
            .into_iter()
            .find(|index| *index >= self.topology.point_count)
        {
            return Err(Error::InvalidConfig(format!(
                "reference landmark {} outside topology of {} points",
                index, self.topology.point_count
            )));
        }
        Ok(())
    }

    pub fn parser(&self) -> ObjParser {
        ObjParser::new(Vector3::from(self.vertex_scale))
    }

    pub fn estimator(&self) -> PoseEstimator {
        PoseEstimator::new(self.reference_width)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            topology: LandmarkTopology::FACE_MESH_468,
            reference_width: DEFAULT_REFERENCE_WIDTH,
            vertex_scale: [VERTEX_SCALE_XY, VERTEX_SCALE_XY, VERTEX_SCALE_Z],
            mirror: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = OverlayConfig::from_json("{}").unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.topology.point_count, 468);
        assert_eq!(config.reference_width, 28.0);
    }

    #[test]
    fn test_partial_override() {
        let config =
            OverlayConfig::from_json(r#"{ "reference_width": 30.0, "mirror": false, "topology": { "nose": 1 } }"#)
                .unwrap();
        assert_eq!(config.reference_width, 30.0);
        assert!(!config.mirror);
        assert_eq!(config.topology.nose, 1);
        assert_eq!(config.topology.top, 10);
        assert_eq!(config.estimator().reference_width(), 30.0);
    }

    #[test]
    fn test_validation() {
        let err = OverlayConfig::from_json(r#"{ "reference_width": 0.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = OverlayConfig::from_json(r#"{ "topology": { "point_count": 100 } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = OverlayConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.json");
        std::fs::write(&path, r#"{ "vertex_scale": [1.0, 1.0, 1.0] }"#).unwrap();
        let config = OverlayConfig::load(&path).unwrap();
        assert_eq!(config.vertex_scale, [1.0, 1.0, 1.0]);
        assert_eq!(config.parser().load("v 2 3 4\n").vertices[0].z, 4.0);
    }
}
