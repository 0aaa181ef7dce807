/// Landmark sources standing in for a face detector
use std::path::Path;

use facefit_core::landmarks::{
    FACE_MESH_BOTTOM, FACE_MESH_LEFT_EDGE, FACE_MESH_NOSE, FACE_MESH_POINT_COUNT,
    FACE_MESH_RIGHT_EDGE, FACE_MESH_TOP,
};
use facefit_core::{LandmarkSet, Result, RotationState};
use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Half the temple-to-temple distance of the synthetic face, in canvas units
const HALF_FACE_WIDTH: f32 = 0.3;
/// Forehead-to-chin distance relative to the temple distance
const FACE_HEIGHT_RATIO: f32 = 1.4;

/// Produces the landmark sets of every face detected in one tick; an empty
/// frame means no face.
pub trait LandmarkSource {
    fn next_frame(&mut self, dt: f32) -> Vec<LandmarkSet>;

    /// Size of the image the landmarks are expressed in
    fn image_size(&self) -> (f32, f32);

    /// Manual head rotation offset, for sources that support it
    fn nudge(&mut self, _dx: f32, _dy: f32, _dz: f32) {}
}

/// A face-mesh-shaped point cloud swaying in front of the camera.
///
/// Every landmark sits on the face ellipsoid so the depth range is
/// realistic; the five reference landmarks sit where the pose estimator
/// expects them.
pub struct SyntheticFace {
    canvas: (f32, f32),
    time: f32,
    offset: RotationState,
    animate: bool,
}

impl SyntheticFace {
    pub fn new(canvas: (f32, f32)) -> Self {
        Self {
            canvas,
            time: 0.0,
            offset: RotationState::zero(),
            animate: true,
        }
    }

    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn rotation(&self) -> RotationState {
        let mut rotation = self.offset;
        if self.animate {
            rotation.rotate(
                0.15 * (self.time * 0.7).sin(),
                0.5 * (self.time * 0.9).sin(),
                0.2 * (self.time * 0.5).sin(),
            );
        }
        rotation
    }

    /// Landmarks for the current time and rotation
    pub fn frame(&self) -> LandmarkSet {
        let (width, height) = self.canvas;
        let half_width = width.min(height) * HALF_FACE_WIDTH;
        let half_height = half_width * FACE_HEIGHT_RATIO;
        let depth = half_width * 0.8;
        let center = Vector3::new(width / 2.0, height / 2.0, 0.0);

        let rotation = self.rotation();
        let head = Rotation3::from_euler_angles(rotation.x, rotation.y, rotation.z);
        let place = |local: Vector3<f32>| Point3::from(head * local + center);

        // Ellipsoid cap facing the camera (-z is toward the camera)
        let mut points: Vec<Point3<f32>> = (0..FACE_MESH_POINT_COUNT)
            .map(|i| {
                let golden = i as f32 * 2.399_963;
                let r = ((i as f32 + 0.5) / FACE_MESH_POINT_COUNT as f32).sqrt();
                let (sin, cos) = golden.sin_cos();
                let x = r * cos;
                let y = r * sin;
                let z = -(1.0 - r * r).max(0.0).sqrt();
                place(Vector3::new(x * half_width, y * half_height, z * depth))
            })
            .collect();

        points[FACE_MESH_TOP] = place(Vector3::new(0.0, -half_height, 0.0));
        points[FACE_MESH_BOTTOM] = place(Vector3::new(0.0, half_height, 0.0));
        points[FACE_MESH_LEFT_EDGE] = place(Vector3::new(-half_width, -0.15 * half_height, 0.0));
        points[FACE_MESH_RIGHT_EDGE] = place(Vector3::new(half_width, -0.15 * half_height, 0.0));
        points[FACE_MESH_NOSE] = place(Vector3::new(0.0, 0.1 * half_height, -depth));

        LandmarkSet::new(points)
    }
}

impl LandmarkSource for SyntheticFace {
    fn next_frame(&mut self, dt: f32) -> Vec<LandmarkSet> {
        self.time += dt;
        vec![self.frame()]
    }

    fn image_size(&self) -> (f32, f32) {
        self.canvas
    }

    fn nudge(&mut self, dx: f32, dy: f32, dz: f32) {
        self.offset.rotate(dx, dy, dz);
    }
}

/// Recorded detector output: per frame, one `[x, y, z]` list per detected
/// face (`[]` where no face was found)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedFile {
    pub image_width: f32,
    pub image_height: f32,
    pub frames: Vec<Vec<Vec<[f32; 3]>>>,
}

/// Plays back a recorded file, looping at the end
pub struct RecordedFrames {
    file: RecordedFile,
    cursor: usize,
}

impl RecordedFrames {
    pub fn new(file: RecordedFile) -> Self {
        Self { file, cursor: 0 }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn len(&self) -> usize {
        self.file.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.frames.is_empty()
    }
}

impl LandmarkSource for RecordedFrames {
    fn next_frame(&mut self, _dt: f32) -> Vec<LandmarkSet> {
        if self.file.frames.is_empty() {
            return Vec::new();
        }
        let faces = &self.file.frames[self.cursor % self.file.frames.len()];
        self.cursor += 1;
        faces
            .iter()
            .map(|triples| LandmarkSet::from_triples(triples))
            .collect()
    }

    fn image_size(&self) -> (f32, f32) {
        (self.file.image_width, self.file.image_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facefit_core::{IdentityMapping, LandmarkProvider, LandmarkTopology, PoseEstimator, ReferenceLandmarks};

    #[test]
    fn test_synthetic_face_matches_topology() {
        let face = SyntheticFace::new((80.0, 48.0)).with_animation(false);
        let frame = face.frame();
        assert_eq!(frame.landmark_count(), FACE_MESH_POINT_COUNT);

        let refs = ReferenceLandmarks::from_provider(&frame, &LandmarkTopology::default()).unwrap();
        let pose = PoseEstimator::default().estimate(&refs, &IdentityMapping);
        // 48 * 0.3 * 2 canvas units between temples
        assert!((pose.scale - 28.8 / 28.0).abs() < 1e-4);
        assert!(pose.rotation.y.abs() < 1e-5);
        assert!((pose.translation.x - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_synthetic_yaw_follows_nudge() {
        let mut face = SyntheticFace::new((80.0, 48.0)).with_animation(false);
        let base = face.frame();
        face.nudge(0.0, 0.3, 0.0);
        let turned = face.frame();

        let estimator = PoseEstimator::default();
        let topology = LandmarkTopology::default();
        let yaw = |set: &LandmarkSet| {
            let refs = ReferenceLandmarks::from_provider(set, &topology).unwrap();
            estimator.estimate(&refs, &IdentityMapping).rotation.y
        };
        assert!((yaw(&turned) - yaw(&base)).abs() > 0.1);
    }

    #[test]
    fn test_recorded_frames_loop_and_gaps() {
        let json = r#"{
            "image_width": 640,
            "image_height": 480,
            "frames": [
                [[[1, 2, 3], [4, 5, 6]]],
                [],
                [[[0, 0, 0]], [[7, 8, 9], [1, 1, 1]]]
            ]
        }"#;
        let mut frames = RecordedFrames::from_json(json).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames.image_size(), (640.0, 480.0));

        let first = frames.next_frame(0.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].points()[1], Point3::new(4.0, 5.0, 6.0));
        assert!(frames.next_frame(0.0).is_empty());

        let two_faces = frames.next_frame(0.0);
        assert_eq!(two_faces.len(), 2);
        assert_eq!(two_faces[0].landmark_count(), 1);
        assert_eq!(two_faces[1].points()[0], Point3::new(7.0, 8.0, 9.0));

        assert_eq!(frames.next_frame(0.0).len(), 1);
    }

    #[test]
    fn test_recorded_file_roundtrip_on_disk() {
        let file = RecordedFile {
            image_width: 320.0,
            image_height: 240.0,
            frames: vec![vec![vec![[0.5, 0.5, 0.0]]]],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.json");
        std::fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();

        let frames = RecordedFrames::load(&path).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(!frames.is_empty());
    }
}
