/// Head pose estimation from five reference landmarks
use nalgebra::{Point3, Vector3};

use crate::landmarks::ReferenceLandmarks;
use crate::mapping::CoordinateMapping;
use crate::transform::RotationState;

/// Temple-to-temple width of the model, in model units
pub const DEFAULT_REFERENCE_WIDTH: f32 = 28.0;

/// Per-frame head pose: uniform scale, rotation angles and translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub scale: f32,
    pub rotation: RotationState,
    pub translation: Vector3<f32>,
}

impl Pose {
    pub fn new(scale: f32, rotation: RotationState, translation: Vector3<f32>) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoseEstimator {
    reference_width: f32,
}

impl PoseEstimator {
    pub fn new(reference_width: f32) -> Self {
        Self { reference_width }
    }

    pub fn reference_width(&self) -> f32 {
        self.reference_width
    }

    /// Estimate the pose, mapping the x/y translation into screen space.
    pub fn estimate<M: CoordinateMapping + ?Sized>(
        &self,
        landmarks: &ReferenceLandmarks,
        mapping: &M,
    ) -> Pose {
        let ReferenceLandmarks {
            top,
            bottom,
            left_edge,
            right_edge,
            nose,
        } = *landmarks;

        let scale = (right_edge - left_edge).norm() / self.reference_width;

        let center = centroid(&[left_edge, right_edge, nose]);
        let translation = Vector3::new(mapping.map_x(center.x), mapping.map_y(center.y), center.z);

        let temples = right_edge - left_edge;
        let y = angle(temples.z, temples.x);
        let x = angle(top.z - bottom.z, top.y - bottom.y);
        let z = -angle(bottom.x - top.x, bottom.y - top.y);

        Pose::new(scale, RotationState::new(x, y, z), translation)
    }
}

impl Default for PoseEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_WIDTH)
    }
}

fn centroid(points: &[Point3<f32>; 3]) -> Point3<f32> {
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / 3.0)
}

/// `atan2` with the undefined `(0, 0)` case pinned to 0 regardless of zero signs.
fn angle(y: f32, x: f32) -> f32 {
    if y == 0.0 && x == 0.0 {
        0.0
    } else {
        y.atan2(x)
    }
}
