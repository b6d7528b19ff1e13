//! Quad mesh storage and the OBJ-subset loader.
//!
//! Only three record types are read: `v` (point), `vn` (normal) and `f`
//! (face). Faces keep their first four vertex groups; faces with fewer than
//! four groups are skipped and counted in [`LoadStats::skipped_faces`].
//! When the file carries no `vn` records, one normal per face is derived
//! from the face's corner points.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{DegenerateGeometry, FaceIndexError, ParseError, ParseResult};
use crate::math::Vec3;

/// Direction the scene is viewed along. Fixed for the lifetime of a mesh.
pub const CAMERA_DIRECTION: Vec3 = Vec3::UP;

// A quad face: four indices into the mesh's point list (0-based)
// and an optional index into its normal list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub normal: Option<usize>,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self {
            a,
            b,
            c,
            d,
            normal: None,
        }
    }

    pub fn indices(&self) -> [usize; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Check the face against the sizes of the point and normal lists.
    ///
    /// Every corner must name a distinct existing point, and a normal
    /// reference must name an existing normal.
    pub fn validate(
        &self,
        point_count: usize,
        normal_count: usize,
    ) -> Result<(), FaceIndexError> {
        let indices = self.indices();
        for (i, &index) in indices.iter().enumerate() {
            if index >= point_count {
                return Err(FaceIndexError::PointOutOfRange {
                    index,
                    count: point_count,
                });
            }
            if indices[..i].contains(&index) {
                return Err(FaceIndexError::RepeatedPoint { index });
            }
        }
        match self.normal {
            Some(index) if index >= normal_count => Err(FaceIndexError::NormalOutOfRange {
                index,
                count: normal_count,
            }),
            _ => Ok(()),
        }
    }
}

/// Counters collected while loading a model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// `f` records dropped because they had fewer than four vertex groups.
    pub skipped_faces: usize,
    /// Whether the normal list was derived from geometry.
    pub derived_normals: bool,
    /// Faces left without a normal (file has `vn` data but the face does not reference it).
    pub faces_without_normal: usize,
    /// Derived normals that came out zero-length.
    pub degenerate_normals: usize,
}

/// A loaded quad mesh.
///
/// Topology is fixed once loaded. The renderer never writes to `points`;
/// per-frame rotation happens on a working copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    points: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
    camera: Vec3,
    stats: LoadStats,
}

impl Mesh {
    /// Build a mesh from parts. If `normals` is empty, per-face normals are
    /// derived and the faces' own normal references are replaced.
    ///
    /// Faces are checked the same way the loader checks them; the first bad
    /// one is reported as [`ParseError::InvalidFace`].
    pub fn new(points: Vec<Vec3>, normals: Vec<Vec3>, faces: Vec<Face>) -> ParseResult<Self> {
        let derive = normals.is_empty();
        let mut faces_without_normal = 0;
        for (index, face) in faces.iter().enumerate() {
            let checked = if derive {
                Face {
                    normal: None,
                    ..*face
                }
            } else {
                *face
            };
            checked
                .validate(points.len(), normals.len())
                .map_err(|problem| ParseError::InvalidFace {
                    face: index,
                    problem,
                })?;
            if !derive && face.normal.is_none() {
                faces_without_normal += 1;
            }
        }

        let mut mesh = Self {
            points,
            normals,
            faces,
            camera: CAMERA_DIRECTION,
            stats: LoadStats {
                faces_without_normal,
                ..LoadStats::default()
            },
        };
        if derive {
            mesh.derive_normals();
        }
        Ok(mesh)
    }

    /// Load a mesh from an OBJ file on disk.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ParseError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ParseError::Io(e)
            }
        })?;

        let mesh = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            points = mesh.points.len(),
            normals = mesh.normals.len(),
            faces = mesh.faces.len(),
            skipped_faces = mesh.stats.skipped_faces,
            derived_normals = mesh.stats.derived_normals,
            "Loaded model"
        );
        Ok(mesh)
    }

    /// Parse OBJ text held in memory.
    pub fn from_obj_str(text: &str) -> ParseResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse OBJ records from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> ParseResult<Self> {
        let mut points = Vec::new();
        let mut normals = Vec::new();
        let mut pending = Vec::new();
        let mut skipped_faces = 0;

        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some((&record, values)) = tokens.split_first() else {
                continue;
            };

            match record {
                "v" => points.push(parse_vec3(values, "v", line_no)?),
                "vn" => normals.push(parse_vec3(values, "vn", line_no)?),
                "f" => {
                    if values.len() < 4 {
                        debug!(line = line_no, groups = values.len(), "Skipping non-quad face");
                        skipped_faces += 1;
                        continue;
                    }
                    pending.push(parse_face(&values[..4], line_no)?);
                }
                _ => {}
            }
        }

        let has_file_normals = !normals.is_empty();
        let mut faces = Vec::with_capacity(pending.len());
        let mut faces_without_normal = 0;
        for raw in pending {
            let face = raw.resolve(points.len(), normals.len())?;
            if has_file_normals && face.normal.is_none() {
                faces_without_normal += 1;
            }
            faces.push(face);
        }

        let mut mesh = Self {
            points,
            normals,
            faces,
            camera: CAMERA_DIRECTION,
            stats: LoadStats {
                skipped_faces,
                faces_without_normal,
                ..LoadStats::default()
            },
        };

        if has_file_normals {
            if faces_without_normal > 0 {
                warn!(
                    faces = faces_without_normal,
                    "Faces have no normal reference; they will shade as edge-on"
                );
            }
        } else {
            mesh.derive_normals();
        }

        Ok(mesh)
    }

    /// Replace the normal list with one flat normal per face.
    ///
    /// `normal = normalize((D - C) x (D - A))` on the loaded points. Face `i`
    /// gets normal `i`.
    fn derive_normals(&mut self) {
        let mut normals = Vec::with_capacity(self.faces.len());
        let mut degenerate = 0;

        for (index, face) in self.faces.iter_mut().enumerate() {
            let [a, _, c, d] = face.indices().map(|i| self.points[i]);
            let normal = match (d - c).cross(d - a).try_normalize() {
                Some(n) => n,
                None => {
                    degenerate += 1;
                    warn!(
                        "{}, shading it as edge-on",
                        DegenerateGeometry::ZeroNormal { face: index }
                    );
                    Vec3::ZERO
                }
            };
            normals.push(normal);
            face.normal = Some(index);
        }

        self.normals = normals;
        self.stats.derived_normals = true;
        self.stats.degenerate_normals = degenerate;
        self.stats.faces_without_normal = 0;
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn camera(&self) -> Vec3 {
        self.camera
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// The normal of `face`, or `None` if the face has no normal reference.
    pub fn face_normal(&self, face: &Face) -> Option<Vec3> {
        face.normal.and_then(|i| self.normals.get(i).copied())
    }

    /// Axis-aligned bounds of the loaded points as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }

    /// Largest distance of any point from the origin. A spin about any axis
    /// through the origin keeps every point inside this radius.
    pub fn radius(&self) -> f64 {
        self.points
            .iter()
            .map(Vec3::magnitude)
            .fold(0.0, f64::max)
    }
}

/// A face as written in the file: 1-based indices, not yet bounds-checked.
#[derive(Clone, Copy, Debug)]
struct RawFace {
    line: usize,
    vertices: [usize; 4],
    normal: Option<usize>,
}

impl RawFace {
    // Normal references are dropped when the file has no `vn` records.
    fn resolve(&self, point_count: usize, normal_count: usize) -> ParseResult<Face> {
        let [a, b, c, d] = self.vertices.map(|i| i - 1);
        let mut face = Face::new(a, b, c, d);
        if normal_count > 0 {
            face.normal = self.normal.map(|i| i - 1);
        }
        face.validate(point_count, normal_count).map_err(|problem| self.at_line(problem))?;
        Ok(face)
    }

    // Loader errors report indices 1-based, as written in the file.
    fn at_line(&self, problem: FaceIndexError) -> ParseError {
        let line = self.line;
        match problem {
            FaceIndexError::PointOutOfRange { index, count } => ParseError::IndexOutOfRange {
                line,
                index: index + 1,
                count,
            },
            FaceIndexError::RepeatedPoint { index } => ParseError::RepeatedIndex {
                line,
                index: index + 1,
            },
            FaceIndexError::NormalOutOfRange { index, count } => {
                ParseError::NormalIndexOutOfRange {
                    line,
                    index: index + 1,
                    count,
                }
            }
        }
    }
}

fn parse_vec3(values: &[&str], record: &'static str, line: usize) -> ParseResult<Vec3> {
    if values.len() < 3 {
        return Err(ParseError::MissingToken {
            line,
            record,
            expected: 3,
            found: values.len(),
        });
    }
    let mut coords = [0.0; 3];
    for (coord, token) in coords.iter_mut().zip(values) {
        *coord = token.parse().map_err(|_| ParseError::InvalidNumber {
            line,
            token: token.to_string(),
        })?;
    }
    Ok(Vec3::new(coords[0], coords[1], coords[2]))
}

// Each group is `v`, `v/vt`, `v//vn` or `v/vt/vn`. The normal of the first
// group stands in for the whole face.
fn parse_face(groups: &[&str], line: usize) -> ParseResult<RawFace> {
    let mut vertices = [0usize; 4];
    for (slot, group) in vertices.iter_mut().zip(groups) {
        let field = group.split('/').next().unwrap_or_default();
        *slot = parse_index(field, line)?;
    }

    let normal = match groups[0].split('/').nth(2) {
        Some(field) if !field.is_empty() => Some(parse_index(field, line)?),
        _ => None,
    };

    Ok(RawFace {
        line,
        vertices,
        normal,
    })
}

fn parse_index(token: &str, line: usize) -> ParseResult<usize> {
    match token.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(ParseError::InvalidIndex {
            line,
            token: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CUBE_QUADS: &str = "\
# unit cube
o cube
v -1 -1 -1
v -1 1 -1
v 1 1 -1
v 1 -1 -1
v 1 1 1
v 1 -1 1
v -1 1 1
v -1 -1 1
vt 0 0
s off
f 1/1 2/1 3/1 4/1
f 4 3 5 6
f 6 5 7 8
f 8 7 2 1
f 2 7 5 3
f 6 8 1 4
";

    #[test]
    fn test_counts_match_records() {
        let mesh = Mesh::from_obj_str(CUBE_QUADS).unwrap();
        assert_eq!(mesh.points().len(), 8);
        assert_eq!(mesh.faces().len(), 6);
        assert_eq!(mesh.normals().len(), 6);
        assert!(mesh.stats().derived_normals);
    }

    #[test]
    fn test_indices_are_zero_based() {
        let mesh = Mesh::from_obj_str(CUBE_QUADS).unwrap();
        assert_eq!(mesh.faces()[0].indices(), [0, 1, 2, 3]);
        assert_eq!(mesh.faces()[5].indices(), [5, 7, 0, 3]);
    }

    #[test]
    fn test_triangles_are_skipped() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 2 3 4\nf 2 3 4\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_eq!(mesh.faces().len(), 1);
        assert_eq!(mesh.stats().skipped_faces, 2);
    }

    #[test]
    fn test_extra_groups_use_first_four() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\nf 1 2 3 4 5\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_eq!(mesh.faces()[0].indices(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_derived_normals_are_unit_and_indexed_by_face() {
        let mesh = Mesh::from_obj_str(CUBE_QUADS).unwrap();
        for (i, face) in mesh.faces().iter().enumerate() {
            assert_eq!(face.normal, Some(i));
            assert_relative_eq!(mesh.normals()[i].magnitude(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_derived_normal_formula() {
        // (D - C) x (D - A) for a square in the XY plane.
        let text = "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_relative_eq!(mesh.normals()[0], Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_degenerate_face_gets_zero_normal() {
        let text = "v 0 0 0\nv 1 0 0\nv 2 0 0\nv 3 0 0\nf 1 2 3 4\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_eq!(mesh.normals()[0], Vec3::ZERO);
        assert_eq!(mesh.stats().degenerate_normals, 1);
    }

    #[test]
    fn test_file_normals_are_not_derived() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nvn 0 1 0\n\
                    f 1//2 2//2 3//2 4//2\nf 4 3 2 1\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_eq!(mesh.normals().len(), 2);
        assert!(!mesh.stats().derived_normals);
        assert_eq!(mesh.faces()[0].normal, Some(1));
        assert_eq!(mesh.faces()[1].normal, None);
        assert_eq!(mesh.stats().faces_without_normal, 1);
        assert_eq!(mesh.face_normal(&mesh.faces()[1]), None);
    }

    #[test]
    fn test_out_of_range_index_is_error() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 5\n";
        let err = Mesh::from_obj_str(text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::IndexOutOfRange {
                line: 5,
                index: 5,
                count: 4
            }
        ));
    }

    #[test]
    fn test_zero_and_negative_indices_are_errors() {
        let zero = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 0 1 2 3\n";
        assert!(matches!(
            Mesh::from_obj_str(zero),
            Err(ParseError::InvalidIndex { line: 5, .. })
        ));
        let negative = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf -1 -2 -3 -4\n";
        assert!(matches!(
            Mesh::from_obj_str(negative),
            Err(ParseError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_repeated_index_is_error() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3 1\n";
        assert!(matches!(
            Mesh::from_obj_str(text),
            Err(ParseError::RepeatedIndex { index: 1, .. })
        ));
    }

    #[test]
    fn test_bad_number_is_error() {
        let err = Mesh::from_obj_str("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 1, ref token } if token == "zero"));
    }

    #[test]
    fn test_short_vertex_is_error() {
        let err = Mesh::from_obj_str("\nvn 0 1\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingToken {
                line: 2,
                record: "vn",
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_normal_index_out_of_range() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//3 2 3 4\n";
        assert!(matches!(
            Mesh::from_obj_str(text),
            Err(ParseError::NormalIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Mesh::from_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
    }

    #[test]
    fn test_bounds() {
        let mesh = Mesh::from_obj_str(CUBE_QUADS).unwrap();
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(hi, Vec3::ONE);
        assert_eq!(Mesh::from_obj_str("").unwrap().bounds(), None);
    }

    #[test]
    fn test_radius_reaches_farthest_corner() {
        let mesh = Mesh::from_obj_str(CUBE_QUADS).unwrap();
        assert_relative_eq!(mesh.radius(), 3f64.sqrt());
        assert_eq!(Mesh::from_obj_str("").unwrap().radius(), 0.0);
    }

    #[test]
    fn test_new_derives_when_normals_empty() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::new(points, vec![], vec![Face::new(0, 1, 2, 3)]).unwrap();
        assert_eq!(mesh.normals().len(), 1);
        assert_eq!(mesh.camera(), CAMERA_DIRECTION);
    }

    fn unit_square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_new_rejects_bad_faces() {
        let err = Mesh::new(
            unit_square(),
            vec![],
            vec![Face::new(0, 1, 2, 3), Face::new(0, 1, 2, 4)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFace {
                face: 1,
                problem: FaceIndexError::PointOutOfRange { index: 4, count: 4 }
            }
        ));

        let err = Mesh::new(unit_square(), vec![], vec![Face::new(0, 1, 1, 3)]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFace {
                face: 0,
                problem: FaceIndexError::RepeatedPoint { index: 1 }
            }
        ));
    }

    #[test]
    fn test_new_checks_normal_references() {
        let mut face = Face::new(0, 1, 2, 3);
        face.normal = Some(1);
        let err = Mesh::new(unit_square(), vec![Vec3::FORWARD], vec![face]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFace {
                face: 0,
                problem: FaceIndexError::NormalOutOfRange { index: 1, count: 1 }
            }
        ));

        let mesh = Mesh::new(
            unit_square(),
            vec![Vec3::FORWARD],
            vec![Face::new(0, 1, 2, 3)],
        )
        .unwrap();
        assert!(!mesh.stats().derived_normals);
        assert_eq!(mesh.stats().faces_without_normal, 1);
    }

    #[test]
    fn test_new_replaces_stale_normal_references() {
        let mut face = Face::new(0, 1, 2, 3);
        face.normal = Some(7);
        let mesh = Mesh::new(unit_square(), vec![], vec![face]).unwrap();
        assert_eq!(mesh.faces()[0].normal, Some(0));
        assert!(mesh.stats().derived_normals);
    }

    #[test]
    fn test_tiny_quad_has_unit_normal() {
        let text = "v 0 0 0\nv 1e-6 0 0\nv 1e-6 1e-6 0\nv 0 1e-6 0\nf 1 2 3 4\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_eq!(mesh.stats().degenerate_normals, 0);
        assert_relative_eq!(mesh.normals()[0], Vec3::new(0.0, 0.0, -1.0));
    }
}
