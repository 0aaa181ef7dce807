/// Model geometry: vertices plus triangle index triples
use nalgebra::Point3;

/// A rigid 3D model loaded once and shared read-only across frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Point3<f32>) {
        self.vertices.push(vertex);
    }

    /// Split a quad into `(a, b, c)` and `(a, c, d)`.
    pub fn add_quad(&mut self, quad: [usize; 4]) {
        let [a, b, c, d] = quad;
        self.faces.push([a, b, c]);
        self.faces.push([a, c, d]);
    }

    /// Whether anything would be drawn; vertices alone don't count.
    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Resolve a face into its three vertices, `None` if any index is out of range.
    pub fn face_vertices(&self, face: &[usize; 3]) -> Option<[Point3<f32>; 3]> {
        Some([
            *self.vertices.get(face[0])?,
            *self.vertices.get(face[1])?,
            *self.vertices.get(face[2])?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_split_uses_first_vertex_diagonal() {
        let mut model = Model::new();
        model.add_quad([0, 1, 2, 3]);
        assert_eq!(model.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_has_faces_ignores_loose_vertices() {
        let mut model = Model::new();
        assert!(!model.has_faces());
        model.add_vertex(Point3::new(1.0, 2.0, 3.0));
        assert!(!model.has_faces());
        model.add_quad([0, 0, 0, 0]);
        assert!(model.has_faces());
    }

    #[test]
    fn test_face_vertices_out_of_range() {
        let mut model = Model::new();
        model.add_vertex(Point3::new(1.0, 2.0, 3.0));
        model.add_vertex(Point3::new(4.0, 5.0, 6.0));
        assert!(model.face_vertices(&[0, 1, 2]).is_none());

        model.add_vertex(Point3::new(7.0, 8.0, 9.0));
        let [a, _, c] = model.face_vertices(&[0, 1, 2]).unwrap();
        assert_eq!(a, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(c, Point3::new(7.0, 8.0, 9.0));
    }
}
