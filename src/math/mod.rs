//! Small linear algebra kit: double-precision 3D vectors, rotation matrices
//! and integer screen points.

pub mod mat3;
pub mod point2;
pub mod vec3;

pub use mat3::Mat3;
pub use point2::Point2;
pub use vec3::Vec3;
