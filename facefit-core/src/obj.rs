/// Parser for the Wavefront OBJ subset used by overlay models
///
/// Only `v x y z` and quad `f a b c d` lines are recognized; every other line
/// is skipped. Loading stops at the first malformed line and keeps what was
/// parsed before it. Face references are checked once every vertex is read,
/// so a face may name vertices defined further down the file.
use std::path::Path;

use log::{error, info};
use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{i64 as integer, space0, space1},
    combinator::{eof, map, peek},
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::geometry::Model;

/// Model-space scale applied to x and y of every vertex
pub const VERTEX_SCALE_XY: f32 = 200.0;
/// Model-space scale applied to z of every vertex
pub const VERTEX_SCALE_Z: f32 = 100.0;

/// Outcome of parsing an OBJ document: the model built so far and the error
/// that stopped parsing, if any.
#[derive(Debug)]
pub struct ObjLoad {
    pub model: Model,
    pub error: Option<Error>,
}

impl ObjLoad {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// A face line whose references are not yet checked against the vertex list
#[derive(Debug, Clone, Copy)]
struct PendingQuad {
    line: usize,
    refs: [i64; 4],
    /// Vertices defined above this line
    vertices_before: usize,
}

impl PendingQuad {
    fn resolve(&self, defined: usize) -> Result<[usize; 4]> {
        let mut quad = [0usize; 4];
        for (slot, reference) in quad.iter_mut().zip(self.refs) {
            *slot = resolve_index(reference, defined, self.line)?;
        }
        Ok(quad)
    }
}

/// OBJ parser with a per-axis vertex scale
#[derive(Debug, Clone, Copy)]
pub struct ObjParser {
    scale: Vector3<f32>,
}

impl ObjParser {
    pub fn new(scale: Vector3<f32>) -> Self {
        Self { scale }
    }

    /// Parse the document, stopping at the first bad line.
    pub fn parse(&self, input: &str) -> ObjLoad {
        let mut model = Model::new();
        let mut quads = Vec::new();
        let mut error = None;

        for (number, line) in input.lines().enumerate() {
            if let Err(e) = self.parse_line(&mut model, &mut quads, line, number + 1) {
                error = Some(e);
                break;
            }
        }

        let (faces, cut) = resolve_quads(&quads, model.vertices.len());
        if let Some((defined, e)) = cut {
            // A bad face line comes before any line the first pass stopped at
            model.vertices.truncate(defined);
            error = Some(e);
        }
        for quad in faces {
            model.add_quad(quad);
        }

        ObjLoad { model, error }
    }

    /// Parse the document and log any failure, returning the (possibly partial) model.
    pub fn load(&self, input: &str) -> Model {
        let ObjLoad { model, error } = self.parse(input);
        if let Some(e) = error {
            error!(
                "model load stopped early, keeping {} vertices and {} faces: {}",
                model.vertices.len(),
                model.faces.len(),
                e
            );
        } else {
            info!(
                "loaded model with {} vertices and {} faces",
                model.vertices.len(),
                model.faces.len()
            );
        }
        model
    }

    fn parse_line(
        &self,
        model: &mut Model,
        quads: &mut Vec<PendingQuad>,
        line: &str,
        number: usize,
    ) -> Result<()> {
        if let Some(rest) = line.strip_prefix("v ") {
            let (_, (x, y, z)) = parse_vertex(rest).map_err(|e| Error::Parse {
                line: number,
                message: format!("malformed vertex `{}`: {:?}", line, e),
            })?;
            model.add_vertex(Point3::new(
                x * self.scale.x,
                y * self.scale.y,
                z * self.scale.z,
            ));
        } else if let Some(rest) = line.strip_prefix('f') {
            if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                return Ok(());
            }
            let (_, refs) = parse_face(rest).map_err(|e| Error::Parse {
                line: number,
                message: format!("malformed face `{}`: {:?}", line, e),
            })?;
            quads.push(PendingQuad {
                line: number,
                refs,
                vertices_before: model.vertices.len(),
            });
        }
        Ok(())
    }
}

impl Default for ObjParser {
    fn default() -> Self {
        Self::new(Vector3::new(VERTEX_SCALE_XY, VERTEX_SCALE_XY, VERTEX_SCALE_Z))
    }
}

/// Parse with the default vertex scale.
pub fn parse_obj(input: &str) -> ObjLoad {
    ObjParser::default().parse(input)
}

/// Parse with the default vertex scale, logging and discarding any parse error.
pub fn load_obj(input: &str) -> Model {
    ObjParser::default().load(input)
}

/// Read and load a model file. Only I/O and encoding failures are errors;
/// parse failures still yield a partial model.
pub fn load_obj_file(path: impl AsRef<Path>, parser: &ObjParser) -> Result<Model> {
    let text = std::fs::read_to_string(path)?;
    Ok(parser.load(&text))
}

/// Check every face against the final vertex count.
///
/// The first face with a bad reference cuts the model at its line: later faces
/// and the vertices below it are dropped. Dropping those vertices can break an
/// earlier forward reference, so the check repeats until the kept prefix is
/// consistent. Returns the kept quads and, if cut, the kept vertex count with
/// the error of the earliest bad line.
fn resolve_quads(
    quads: &[PendingQuad],
    vertex_count: usize,
) -> (Vec<[usize; 4]>, Option<(usize, Error)>) {
    let mut defined = vertex_count;
    let mut kept = quads.len();
    let mut cut = None;

    while let Some((index, e)) = quads[..kept]
        .iter()
        .enumerate()
        .find_map(|(index, quad)| quad.resolve(defined).err().map(|e| (index, e)))
    {
        kept = index;
        defined = quads[index].vertices_before;
        cut = Some((defined, e));
    }

    let faces = quads[..kept]
        .iter()
        .filter_map(|quad| quad.resolve(defined).ok())
        .collect();
    (faces, cut)
}

/// Convert a 1-based OBJ reference into an index below `defined`.
fn resolve_index(reference: i64, defined: usize, line: usize) -> Result<usize> {
    reference
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < defined)
        .ok_or_else(|| Error::Parse {
            line,
            message: format!(
                "vertex reference {} out of range (1..={})",
                reference, defined
            ),
        })
}

/// A float followed by whitespace or end of line.
fn number(input: &str) -> IResult<&str, f32> {
    terminated(float, peek(alt((space1, eof))))(input)
}

fn parse_vertex(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = space0(input)?;
    let (input, x) = number(input)?;
    let (input, _) = space1(input)?;
    let (input, y) = number(input)?;
    let (input, _) = space1(input)?;
    let (input, z) = number(input)?;
    Ok((input, (x, y, z)))
}

/// `index`, `index/uv` or `index/uv/normal`; only the index is kept.
fn vertex_ref(input: &str) -> IResult<&str, i64> {
    terminated(
        integer,
        alt((
            preceded(tag("/"), take_till(|c: char| c.is_whitespace())),
            peek(alt((space1, eof))),
        )),
    )(input)
}

fn face_ref(input: &str) -> IResult<&str, i64> {
    preceded(space1, vertex_ref)(input)
}

fn parse_face(input: &str) -> IResult<&str, [i64; 4]> {
    map(
        tuple((face_ref, face_ref, face_ref, face_ref)),
        |(a, b, c, d)| [a, b, c, d],
    )(input)
}
