/// Rigid transform applied to model vertices: scale, yaw, pitch, roll, translate
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::pose::Pose;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// A pose with its sines and cosines evaluated once, for transforming many
/// vertices in the same frame.
///
/// Stages run in a fixed order: uniform scale, rotation about Y, rotation
/// about X, rotation about Z, then translation. Each rotation acts on the
/// output of the previous one.
#[derive(Debug, Clone, Copy)]
pub struct PoseTransform {
    scale: f32,
    yaw: (f32, f32),
    pitch: (f32, f32),
    roll: (f32, f32),
    translation: Vector3<f32>,
}

impl PoseTransform {
    pub fn new(pose: &Pose) -> Self {
        Self {
            scale: pose.scale,
            yaw: pose.rotation.y.sin_cos(),
            pitch: pose.rotation.x.sin_cos(),
            roll: pose.rotation.z.sin_cos(),
            translation: pose.translation,
        }
    }

    pub fn apply(&self, point: &Point3<f32>) -> Point3<f32> {
        let scaled = point.coords * self.scale;

        let (sin, cos) = self.yaw;
        let yawed = Vector3::new(
            scaled.x * cos + scaled.z * sin,
            scaled.y,
            -scaled.x * sin + scaled.z * cos,
        );

        let (sin, cos) = self.pitch;
        let pitched = Vector3::new(
            yawed.x,
            yawed.y * cos + yawed.z * sin,
            -yawed.y * sin + yawed.z * cos,
        );

        let (sin, cos) = self.roll;
        let rolled = Vector3::new(
            pitched.x * cos + pitched.y * sin,
            -pitched.x * sin + pitched.y * cos,
            pitched.z,
        );

        Point3::from(rolled + self.translation)
    }

    /// The same transform as a homogeneous matrix, for sinks that upload
    /// one model matrix instead of transformed vertices.
    #[rustfmt::skip]
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let (sin, cos) = self.yaw;
        let yaw = Matrix3::new(
            cos, 0.0, sin,
            0.0, 1.0, 0.0,
            -sin, 0.0, cos,
        );
        let (sin, cos) = self.pitch;
        let pitch = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, cos, sin,
            0.0, -sin, cos,
        );
        let (sin, cos) = self.roll;
        let roll = Matrix3::new(
            cos, sin, 0.0,
            -sin, cos, 0.0,
            0.0, 0.0, 1.0,
        );

        let linear = roll * pitch * yaw * self.scale;
        Matrix4::new_translation(&self.translation) * linear.to_homogeneous()
    }
}

/// Transform a single model-space point into face space.
pub fn transform_point(point: &Point3<f32>, pose: &Pose) -> Point3<f32> {
    PoseTransform::new(pose).apply(point)
}
