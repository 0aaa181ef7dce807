/// Landmark provider interface and the face-mesh topology it is read with
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// Indices into the 468-point face mesh
pub const FACE_MESH_POINT_COUNT: usize = 468;
pub const FACE_MESH_TOP: usize = 10;
pub const FACE_MESH_BOTTOM: usize = 152;
pub const FACE_MESH_LEFT_EDGE: usize = 3;
pub const FACE_MESH_RIGHT_EDGE: usize = 248;
pub const FACE_MESH_NOSE: usize = 4;

/// Read access to one frame of detected landmarks.
///
/// Implemented by whatever adapts the face detector's output; the pipeline
/// only ever reads positions by index.
pub trait LandmarkProvider {
    fn landmark_count(&self) -> usize;

    fn landmark(&self, index: usize) -> Option<Point3<f32>>;

    fn iter_landmarks(&self) -> LandmarkIter<'_, Self> {
        LandmarkIter {
            provider: self,
            next: 0,
        }
    }
}

/// Iterator over every landmark of a provider in index order
pub struct LandmarkIter<'a, P: ?Sized> {
    provider: &'a P,
    next: usize,
}

impl<P: LandmarkProvider + ?Sized> Iterator for LandmarkIter<'_, P> {
    type Item = Point3<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.provider.landmark_count() {
            return None;
        }
        let point = self.provider.landmark(self.next);
        self.next += 1;
        point
    }
}

impl LandmarkProvider for [Point3<f32>] {
    fn landmark_count(&self) -> usize {
        self.len()
    }

    fn landmark(&self, index: usize) -> Option<Point3<f32>> {
        self.get(index).copied()
    }
}

impl LandmarkProvider for Vec<Point3<f32>> {
    fn landmark_count(&self) -> usize {
        self.len()
    }

    fn landmark(&self, index: usize) -> Option<Point3<f32>> {
        self.get(index).copied()
    }
}

/// An owned landmark frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point3<f32>>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point3<f32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Point3<f32>] {
        &mut self.points
    }

    /// Build from `[x, y, z]` triples as found in recorded frame files.
    pub fn from_triples(triples: &[[f32; 3]]) -> Self {
        Self::new(
            triples
                .iter()
                .map(|[x, y, z]| Point3::new(*x, *y, *z))
                .collect(),
        )
    }

    pub fn to_triples(&self) -> Vec<[f32; 3]> {
        self.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}

impl LandmarkProvider for LandmarkSet {
    fn landmark_count(&self) -> usize {
        self.points.len()
    }

    fn landmark(&self, index: usize) -> Option<Point3<f32>> {
        self.points.get(index).copied()
    }
}

/// Landmark numbering scheme: total point count and the five reference indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkTopology {
    pub point_count: usize,
    pub top: usize,
    pub bottom: usize,
    pub left_edge: usize,
    pub right_edge: usize,
    pub nose: usize,
}

impl LandmarkTopology {
    pub const FACE_MESH_468: Self = Self {
        point_count: FACE_MESH_POINT_COUNT,
        top: FACE_MESH_TOP,
        bottom: FACE_MESH_BOTTOM,
        left_edge: FACE_MESH_LEFT_EDGE,
        right_edge: FACE_MESH_RIGHT_EDGE,
        nose: FACE_MESH_NOSE,
    };

    pub fn reference_indices(&self) -> [usize; 5] {
        [self.top, self.bottom, self.left_edge, self.right_edge, self.nose]
    }

    /// Reject providers whose size doesn't match this numbering scheme.
    pub fn check<P: LandmarkProvider + ?Sized>(&self, provider: &P) -> Result<()> {
        let found = provider.landmark_count();
        if found != self.point_count {
            return Err(Error::TopologyMismatch {
                expected: self.point_count,
                found,
            });
        }
        Ok(())
    }
}

impl Default for LandmarkTopology {
    fn default() -> Self {
        Self::FACE_MESH_468
    }
}

/// The five landmarks pose estimation is derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLandmarks {
    pub top: Point3<f32>,
    pub bottom: Point3<f32>,
    pub left_edge: Point3<f32>,
    pub right_edge: Point3<f32>,
    pub nose: Point3<f32>,
}

impl ReferenceLandmarks {
    pub fn from_provider<P: LandmarkProvider + ?Sized>(
        provider: &P,
        topology: &LandmarkTopology,
    ) -> Result<Self> {
        topology.check(provider)?;
        let fetch = |index: usize| {
            provider
                .landmark(index)
                .ok_or(Error::MissingLandmark { index })
        };
        Ok(Self {
            top: fetch(topology.top)?,
            bottom: fetch(topology.bottom)?,
            left_edge: fetch(topology.left_edge)?,
            right_edge: fetch(topology.right_edge)?,
            nose: fetch(topology.nose)?,
        })
    }

    /// Scale every landmark about the origin.
    pub fn scaled(&self, k: f32) -> Self {
        Self {
            top: self.top * k,
            bottom: self.bottom * k,
            left_edge: self.left_edge * k,
            right_edge: self.right_edge * k,
            nose: self.nose * k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_mesh_with(points: &[(usize, Point3<f32>)]) -> LandmarkSet {
        let mut set = LandmarkSet::new(vec![Point3::origin(); FACE_MESH_POINT_COUNT]);
        for (index, point) in points {
            set.points_mut()[*index] = *point;
        }
        set
    }

    #[test]
    fn test_reference_extraction() {
        let set = face_mesh_with(&[
            (FACE_MESH_TOP, Point3::new(0.0, 10.0, 0.0)),
            (FACE_MESH_BOTTOM, Point3::new(0.0, -10.0, 0.0)),
            (FACE_MESH_LEFT_EDGE, Point3::new(-14.0, 0.0, 0.0)),
            (FACE_MESH_RIGHT_EDGE, Point3::new(14.0, 0.0, 0.0)),
            (FACE_MESH_NOSE, Point3::new(0.0, 0.0, 5.0)),
        ]);
        let refs = ReferenceLandmarks::from_provider(&set, &LandmarkTopology::default()).unwrap();
        assert_eq!(refs.top, Point3::new(0.0, 10.0, 0.0));
        assert_eq!(refs.bottom, Point3::new(0.0, -10.0, 0.0));
        assert_eq!(refs.left_edge, Point3::new(-14.0, 0.0, 0.0));
        assert_eq!(refs.right_edge, Point3::new(14.0, 0.0, 0.0));
        assert_eq!(refs.nose, Point3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_topology_mismatch() {
        let contour_only: Vec<Point3<f32>> = vec![Point3::origin(); 130];
        let err = ReferenceLandmarks::from_provider(&contour_only, &LandmarkTopology::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TopologyMismatch {
                expected: 468,
                found: 130
            }
        ));
    }

    #[test]
    fn test_missing_reference_index() {
        let topology = LandmarkTopology {
            point_count: 5,
            top: 0,
            bottom: 1,
            left_edge: 2,
            right_edge: 3,
            nose: 7,
        };
        let points: Vec<Point3<f32>> = vec![Point3::origin(); 5];
        let err = ReferenceLandmarks::from_provider(points.as_slice(), &topology).unwrap_err();
        assert!(matches!(err, Error::MissingLandmark { index: 7 }));
    }

    #[test]
    fn test_iter_landmarks_and_triples() {
        let set = LandmarkSet::from_triples(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let collected: Vec<_> = set.iter_landmarks().collect();
        assert_eq!(collected, set.points().to_vec());
        assert_eq!(set.to_triples(), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }
}
