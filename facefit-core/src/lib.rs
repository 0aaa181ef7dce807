/// facefit core library - pose estimation and rigid model overlay
///
/// Fits a 3D model (a pair of glasses) onto a detected face: parses the model
/// from an OBJ subset, estimates head pose from five face-mesh landmarks and
/// transforms every model vertex per frame for a drawing sink.

pub mod config;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod mapping;
pub mod obj;
pub mod overlay;
pub mod pose;
pub mod render;
pub mod transform;

// Re-export commonly used types
pub use config::OverlayConfig;
pub use error::{Error, Result};
pub use geometry::Model;
pub use landmarks::{LandmarkProvider, LandmarkSet, LandmarkTopology, ReferenceLandmarks};
pub use mapping::{CoordinateMapping, IdentityMapping, ScreenMapping};
pub use overlay::{FaceOverlay, RenderedFrame};
pub use pose::{Pose, PoseEstimator};
pub use render::{render_frame, DepthRange, FrameStats, RenderedTriangle, TriangleSink};
pub use transform::{transform_point, PoseTransform, RotationState};
