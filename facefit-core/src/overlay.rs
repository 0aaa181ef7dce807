/// Per-frame overlay pipeline: landmarks -> pose -> posed triangles
use std::sync::Arc;

use log::debug;

use crate::config::OverlayConfig;
use crate::error::Result;
use crate::geometry::Model;
use crate::landmarks::{LandmarkProvider, LandmarkTopology, ReferenceLandmarks};
use crate::mapping::CoordinateMapping;
use crate::pose::{Pose, PoseEstimator};
use crate::render::{render_frame, DepthRange, FrameStats, TriangleSink};

/// Result of one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedFrame {
    pub pose: Pose,
    pub depth: Option<DepthRange>,
    pub stats: FrameStats,
}

/// Fits a shared model onto each incoming landmark frame.
#[derive(Debug, Clone)]
pub struct FaceOverlay {
    model: Arc<Model>,
    topology: LandmarkTopology,
    estimator: PoseEstimator,
}

impl FaceOverlay {
    pub fn new(model: Arc<Model>, topology: LandmarkTopology, estimator: PoseEstimator) -> Self {
        Self {
            model,
            topology,
            estimator,
        }
    }

    pub fn from_config(model: Arc<Model>, config: &OverlayConfig) -> Self {
        Self::new(model, config.topology, config.estimator())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn estimate_pose<P, M>(&self, landmarks: &P, mapping: &M) -> Result<Pose>
    where
        P: LandmarkProvider + ?Sized,
        M: CoordinateMapping + ?Sized,
    {
        let references = ReferenceLandmarks::from_provider(landmarks, &self.topology)?;
        Ok(self.estimator.estimate(&references, mapping))
    }

    /// Render one frame. `None` landmarks (no face detected) does no work and
    /// returns `Ok(None)`; a landmark set that doesn't fit the topology is an
    /// error for this frame only.
    pub fn process_frame<P, M, S>(
        &self,
        landmarks: Option<&P>,
        mapping: &M,
        sink: &mut S,
    ) -> Result<Option<RenderedFrame>>
    where
        P: LandmarkProvider + ?Sized,
        M: CoordinateMapping + ?Sized,
        S: TriangleSink + ?Sized,
    {
        match landmarks {
            Some(landmarks) => self.render_face(landmarks, mapping, sink).map(Some),
            None => Ok(None),
        }
    }

    /// Render every detected face of one frame with the shared model.
    ///
    /// Each face succeeds or fails on its own; an empty slice draws nothing.
    pub fn process_faces<P, M, S>(
        &self,
        faces: &[P],
        mapping: &M,
        sink: &mut S,
    ) -> Vec<Result<RenderedFrame>>
    where
        P: LandmarkProvider,
        M: CoordinateMapping + ?Sized,
        S: TriangleSink + ?Sized,
    {
        faces
            .iter()
            .map(|face| self.render_face(face, mapping, sink))
            .collect()
    }

    fn render_face<P, M, S>(&self, landmarks: &P, mapping: &M, sink: &mut S) -> Result<RenderedFrame>
    where
        P: LandmarkProvider + ?Sized,
        M: CoordinateMapping + ?Sized,
        S: TriangleSink + ?Sized,
    {
        let pose = self.estimate_pose(landmarks, mapping)?;
        let depth = DepthRange::from_provider(landmarks);
        let stats = render_frame(&self.model, &pose, depth.as_ref(), sink);
        debug!(
            "frame: scale {:.3}, rotation ({:.3}, {:.3}, {:.3}), {} triangles",
            pose.scale, pose.rotation.x, pose.rotation.y, pose.rotation.z, stats.triangles
        );

        Ok(RenderedFrame { pose, depth, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::landmarks::LandmarkSet;
    use crate::mapping::IdentityMapping;
    use crate::render::RenderedTriangle;
    use nalgebra::Point3;

    fn square_model() -> Arc<Model> {
        let mut model = Model::new();
        model.add_vertex(Point3::new(-1.0, -1.0, 0.0));
        model.add_vertex(Point3::new(1.0, -1.0, 0.0));
        model.add_vertex(Point3::new(1.0, 1.0, 0.0));
        model.add_vertex(Point3::new(-1.0, 1.0, 0.0));
        model.add_quad([0, 1, 2, 3]);
        Arc::new(model)
    }

    #[test]
    fn test_no_face_does_nothing() {
        let overlay = FaceOverlay::new(
            square_model(),
            LandmarkTopology::default(),
            PoseEstimator::default(),
        );
        let mut out: Vec<RenderedTriangle> = Vec::new();
        let frame = overlay
            .process_frame(None::<&LandmarkSet>, &IdentityMapping, &mut out)
            .unwrap();
        assert!(frame.is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn test_wrong_topology_is_frame_error() {
        let overlay = FaceOverlay::from_config(square_model(), &OverlayConfig::default());
        let short = LandmarkSet::new(vec![Point3::origin(); 10]);
        let mut out: Vec<RenderedTriangle> = Vec::new();
        let err = overlay
            .process_frame(Some(&short), &IdentityMapping, &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::TopologyMismatch { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_each_face_rendered_independently() {
        let overlay = FaceOverlay::from_config(square_model(), &OverlayConfig::default());
        let faces = vec![
            LandmarkSet::new(vec![Point3::origin(); 468]),
            LandmarkSet::new(vec![Point3::origin(); 10]),
            LandmarkSet::new(vec![Point3::new(1.0, 2.0, 3.0); 468]),
        ];
        let mut out: Vec<RenderedTriangle> = Vec::new();
        let results = overlay.process_faces(&faces, &IdentityMapping, &mut out);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::TopologyMismatch { found: 10, .. })));
        let third = results[2].as_ref().unwrap();
        assert_eq!(third.stats.triangles, 2);
        assert_eq!(out.len(), 4);

        out.clear();
        let none: Vec<LandmarkSet> = Vec::new();
        assert!(overlay.process_faces(&none, &IdentityMapping, &mut out).is_empty());
        assert!(out.is_empty());
    }
}
