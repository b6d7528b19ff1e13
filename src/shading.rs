//! Depth ordering and flat shading of faces.
//!
//! Every frame each face gets a depth key (the smallest z of its four
//! rotated corners) and a grey level built from two terms:
//!
//! - **reflection**: how directly the face normal points at the camera,
//!   `trunc(max(alignment, 0) * 127)`
//! - **absorption**: how far the face sits relative to the farthest face,
//!   `trunc(clamp(|depth| / |farthest| * 127, 0, 127))`
//!
//! Faces are then ordered by ascending depth (painter's algorithm: the most
//! negative z is drawn first, so nearer faces paint over farther ones).

use tracing::warn;

use crate::colors;
use crate::error::DegenerateGeometry;
use crate::math::Vec3;
use crate::mesh::{Face, Mesh};

/// Per-frame shading result for one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedFace {
    /// Index of the face in [`Mesh::faces`].
    pub face: usize,
    /// Smallest z of the face's rotated corners.
    pub depth: f64,
    /// `dot(camera, normal)`; zero for faces without a normal.
    pub alignment: f64,
    /// Grey level in `0..=255`.
    pub shade: u8,
    /// Packed ARGB fill colour.
    pub color: u32,
}

/// Smallest z among the face's four corners in `points`.
#[inline]
pub fn face_depth(points: &[Vec3], face: &Face) -> f64 {
    face.indices()
        .iter()
        .map(|&i| points[i].z)
        .fold(f64::INFINITY, f64::min)
}

/// Grey level for a face.
///
/// Always lands in `0..=255`. A `farthest` of exactly zero makes the
/// absorption ratio undefined; it is taken as zero. NaN terms count as zero.
pub fn shade_value(alignment: f64, depth: f64, farthest: f64) -> u8 {
    let reflection = (alignment.max(0.0) * 127.0).trunc();

    let ratio = if farthest == 0.0 {
        0.0
    } else {
        depth.abs() / farthest.abs()
    };
    let absorption = (ratio * 127.0).clamp(0.0, 127.0).trunc();

    let total = zero_if_nan(reflection) + zero_if_nan(absorption);
    total.clamp(0.0, 255.0) as u8
}

#[inline]
fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Builds the ordered, shaded face list for each frame.
///
/// Holds on to its output buffer so consecutive frames reuse the allocation.
#[derive(Debug, Default)]
pub struct FaceShader {
    faces: Vec<ShadedFace>,
    zero_depth_reported: bool,
}

impl FaceShader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shade every face of `mesh` using the rotated `points` and the given
    /// `normals` (either the mesh's own or a rotated copy), and return them
    /// sorted back to front.
    pub fn shade(&mut self, mesh: &Mesh, points: &[Vec3], normals: &[Vec3]) -> &[ShadedFace] {
        let camera = mesh.camera();
        self.faces.clear();
        self.faces.reserve(mesh.faces().len());

        for (index, face) in mesh.faces().iter().enumerate() {
            let alignment = face
                .normal
                .and_then(|n| normals.get(n))
                .map_or(0.0, |normal| camera.dot(*normal));
            self.faces.push(ShadedFace {
                face: index,
                depth: face_depth(points, face),
                alignment,
                shade: 0,
                color: 0,
            });
        }

        // Stable: equal depths keep load order.
        self.faces.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        let farthest = self
            .faces
            .iter()
            .map(|f| f.depth)
            .fold(f64::INFINITY, f64::min);

        if farthest == 0.0 && !self.zero_depth_reported {
            self.zero_depth_reported = true;
            warn!("{}", DegenerateGeometry::ZeroFarthestDepth);
        }

        for shaded in &mut self.faces {
            shaded.shade = shade_value(shaded.alignment, shaded.depth, farthest);
            shaded.color = colors::grey(shaded.shade);
        }

        &self.faces
    }

    /// The list produced by the last [`FaceShader::shade`] call.
    pub fn faces(&self) -> &[ShadedFace] {
        &self.faces
    }
}

/// One-shot version of [`FaceShader::shade`].
pub fn shade_faces(mesh: &Mesh, points: &[Vec3], normals: &[Vec3]) -> Vec<ShadedFace> {
    let mut shader = FaceShader::new();
    shader.shade(mesh, points, normals);
    shader.faces
}
