//! Per-frame rotation of the mesh points.
//!
//! [`Spin`] keeps a working copy of the points and composes one fixed
//! rotation increment onto it each frame, so the loaded mesh is never
//! written to.

use crate::math::{Mat3, Vec3};

/// Axis the mesh spins around unless configured otherwise.
pub const DEFAULT_AXIS: Vec3 = Vec3::ONE;

/// Rotation per frame, in degrees.
pub const DEFAULT_STEP_DEGREES: f64 = 1.0;

/// Whether face normals follow the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// Normals keep their loaded orientation. Shading then depends only on
    /// the static model, while depth order follows the rotation.
    #[default]
    Fixed,
    /// Normals are rotated with the points every frame.
    Rotated,
}

/// An incremental rigid rotation about a fixed axis.
///
/// ```ignore
/// let mut spin = Spin::new(Vec3::ONE, 1.0);
/// let frame_points = spin.advance(mesh.points());
/// ```
#[derive(Clone, Debug)]
pub struct Spin {
    axis: Vec3,
    step: f64, // radians
    step_matrix: Mat3,
    angle: f64,
    frames: u64,
    points: Vec<Vec3>,
}

impl Default for Spin {
    fn default() -> Self {
        Self::new(DEFAULT_AXIS, DEFAULT_STEP_DEGREES)
    }
}

impl Spin {
    /// Create a spin of `step_degrees` per frame about `axis`.
    pub fn new(axis: Vec3, step_degrees: f64) -> Self {
        let step = step_degrees.to_radians();
        Self {
            axis,
            step,
            step_matrix: Mat3::from_axis_angle(axis, step),
            angle: 0.0,
            frames: 0,
            points: Vec::new(),
        }
    }

    /// Rotate the working copy by one more increment and return it.
    ///
    /// The first call (and the first call after [`Spin::reset`]) copies
    /// `original` before rotating. The result is index-aligned with `original`.
    pub fn advance(&mut self, original: &[Vec3]) -> &[Vec3] {
        if self.points.len() != original.len() {
            self.points.clear();
            self.points.extend_from_slice(original);
        }

        let step = self.step_matrix;
        for point in &mut self.points {
            *point = step * *point;
        }

        self.angle += self.step;
        self.frames += 1;
        &self.points
    }

    /// Forget the accumulated rotation. The next [`Spin::advance`] starts
    /// from the original points again.
    pub fn reset(&mut self) {
        self.points.clear();
        self.angle = 0.0;
        self.frames = 0;
    }

    /// The points as of the last [`Spin::advance`].
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Accumulated rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Number of increments applied since creation or the last reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The accumulated rotation as a single matrix.
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_axis_angle(self.axis, self.angle)
    }
}
