/// Per-frame triangle emission for a posed model
use log::debug;
use nalgebra::Point3;

use crate::geometry::Model;
use crate::landmarks::LandmarkProvider;
use crate::pose::Pose;
use crate::transform::PoseTransform;

/// Depth extent of the detected landmarks in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub min: f32,
    pub max: f32,
}

impl DepthRange {
    /// Scan every landmark's z; `None` for an empty set.
    pub fn from_provider<P: LandmarkProvider + ?Sized>(provider: &P) -> Option<Self> {
        provider.iter_landmarks().fold(None, |range, point| {
            Some(match range {
                None => Self {
                    min: point.z,
                    max: point.z,
                },
                Some(Self { min, max }) => Self {
                    min: min.min(point.z),
                    max: max.max(point.z),
                },
            })
        })
    }

    /// Position of `z` within the range, clamped to `[0, 1]`.
    pub fn normalize(&self, z: f32) -> f32 {
        let span = self.max - self.min;
        if span <= f32::EPSILON {
            return 0.5;
        }
        ((z - self.min) / span).clamp(0.0, 1.0)
    }
}

/// A model triangle after the pose transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedTriangle {
    pub vertices: [Point3<f32>; 3],
    /// z of the unit face normal; `None` for a zero-area triangle
    pub normal_z: Option<f32>,
}

impl RenderedTriangle {
    pub fn new(vertices: [Point3<f32>; 3]) -> Self {
        let [p1, p2, p3] = vertices;
        let normal = (p1 - p2).cross(&(p1 - p3));
        let normal_z = normal.try_normalize(f32::EPSILON).map(|unit| unit.z);
        Self { vertices, normal_z }
    }

    /// Outline edges in drawing order
    pub fn edges(&self) -> [(Point3<f32>, Point3<f32>); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Receives posed triangles; screen projection and drawing are up to the sink.
pub trait TriangleSink {
    fn draw_triangle(&mut self, triangle: &RenderedTriangle, depth: Option<&DepthRange>);
}

impl TriangleSink for Vec<RenderedTriangle> {
    fn draw_triangle(&mut self, triangle: &RenderedTriangle, _depth: Option<&DepthRange>) {
        self.push(*triangle);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: usize,
    pub skipped: usize,
}

/// Transform every face of `model` with `pose` and hand it to `sink`.
///
/// Faces referencing missing vertices are skipped and counted.
pub fn render_frame<S: TriangleSink + ?Sized>(
    model: &Model,
    pose: &Pose,
    depth: Option<&DepthRange>,
    sink: &mut S,
) -> FrameStats {
    let transform = PoseTransform::new(pose);
    let mut stats = FrameStats::default();

    for face in &model.faces {
        let Some([a, b, c]) = model.face_vertices(face) else {
            stats.skipped += 1;
            continue;
        };
        let triangle = RenderedTriangle::new([
            transform.apply(&a),
            transform.apply(&b),
            transform.apply(&c),
        ]);
        sink.draw_triangle(&triangle, depth);
        stats.triangles += 1;
    }

    if stats.skipped > 0 {
        debug!("skipped {} faces with out-of-range vertices", stats.skipped);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RotationState;
    use nalgebra::Vector3;

    fn unit_quad() -> Model {
        let mut model = Model::new();
        model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        model.add_vertex(Point3::new(1.0, 1.0, 0.0));
        model.add_vertex(Point3::new(0.0, 1.0, 0.0));
        model.add_quad([0, 1, 2, 3]);
        model
    }

    #[test]
    fn test_depth_range() {
        let points: Vec<Point3<f32>> = vec![
            Point3::new(0.0, 0.0, -3.0),
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let range = DepthRange::from_provider(&points).unwrap();
        assert_eq!(range, DepthRange { min: -3.0, max: 5.0 });
        assert!((range.normalize(1.0) - 0.5).abs() < 1e-6);
        assert_eq!(range.normalize(10.0), 1.0);
        assert_eq!(range.normalize(-10.0), 0.0);

        let empty: Vec<Point3<f32>> = Vec::new();
        assert!(DepthRange::from_provider(&empty).is_none());

        let flat = DepthRange { min: 2.0, max: 2.0 };
        assert_eq!(flat.normalize(2.0), 0.5);
    }

    #[test]
    fn test_normal_z() {
        let triangle = RenderedTriangle::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        // (p1 - p2) x (p1 - p3) = (-1,0,0) x (0,-1,0) = (0,0,1)
        assert!((triangle.normal_z.unwrap() - 1.0).abs() < 1e-6);

        let tilted = RenderedTriangle::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        assert!((tilted.normal_z.unwrap() - 1.0 / 2.0f32.sqrt()).abs() < 1e-6);

        let degenerate = RenderedTriangle::new([Point3::new(1.0, 1.0, 1.0); 3]);
        assert!(degenerate.normal_z.is_none());
    }

    #[test]
    fn test_render_frame_emits_transformed_triangles() {
        let model = unit_quad();
        let pose = Pose::new(2.0, RotationState::zero(), Vector3::new(10.0, 20.0, 0.0));
        let mut out: Vec<RenderedTriangle> = Vec::new();
        let stats = render_frame(&model, &pose, None, &mut out);

        assert_eq!(stats, FrameStats { triangles: 2, skipped: 0 });
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].vertices[0], Point3::new(10.0, 20.0, 0.0));
        assert_eq!(out[0].vertices[2], Point3::new(12.0, 22.0, 0.0));
        assert_eq!(out[1].vertices[2], Point3::new(10.0, 22.0, 0.0));
    }

    #[test]
    fn test_render_frame_skips_bad_faces() {
        let mut model = unit_quad();
        model.faces.push([0, 1, 9]);
        let pose = Pose::new(1.0, RotationState::zero(), Vector3::zeros());
        let mut out: Vec<RenderedTriangle> = Vec::new();
        let stats = render_frame(&model, &pose, None, &mut out);
        assert_eq!(stats, FrameStats { triangles: 2, skipped: 1 });
    }

    #[test]
    fn test_zero_scale_collapses_model() {
        let model = unit_quad();
        let pose = Pose::new(0.0, RotationState::new(0.3, 0.2, 0.1), Vector3::new(4.0, 5.0, 6.0));
        let mut out: Vec<RenderedTriangle> = Vec::new();
        render_frame(&model, &pose, None, &mut out);
        for triangle in &out {
            for vertex in &triangle.vertices {
                assert!((vertex - Point3::new(4.0, 5.0, 6.0)).norm() < 1e-6);
            }
            assert!(triangle.normal_z.is_none());
        }
    }
}
