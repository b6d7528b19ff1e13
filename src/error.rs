//! Error types for loading, rendering and exporting.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for mesh loading.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for frame export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors raised while reading a model file. All of them abort startup.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The model file does not exist.
    #[error("model file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Any other failure reading the model.
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    /// A record has fewer tokens than its type requires.
    #[error("line {line}: `{record}` record needs {expected} values, found {found}")]
    MissingToken {
        /// 1-based line number.
        line: usize,
        /// Leading token of the record (`v`, `vn`, `f`).
        record: &'static str,
        /// Number of values the record needs.
        expected: usize,
        /// Number of values present.
        found: usize,
    },

    /// A coordinate failed to parse as a number.
    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A face vertex index is not a positive integer.
    #[error("line {line}: invalid face index `{token}`")]
    InvalidIndex {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A face refers to a point that does not exist.
    #[error("line {line}: face index {index} is out of range ({count} points)")]
    IndexOutOfRange {
        /// 1-based line number.
        line: usize,
        /// The 1-based index as written in the file.
        index: usize,
        /// Number of points in the file.
        count: usize,
    },

    /// A face uses the same point more than once.
    #[error("line {line}: face repeats point index {index}")]
    RepeatedIndex {
        /// 1-based line number.
        line: usize,
        /// The 1-based index as written in the file.
        index: usize,
    },

    /// A face refers to a normal that does not exist.
    #[error("line {line}: normal index {index} is out of range ({count} normals)")]
    NormalIndexOutOfRange {
        /// 1-based line number.
        line: usize,
        /// The 1-based index as written in the file.
        index: usize,
        /// Number of normals in the file.
        count: usize,
    },

    /// A face handed to [`Mesh::new`](crate::mesh::Mesh::new) does not fit
    /// the point or normal lists.
    #[error("face {face}: {problem}")]
    InvalidFace {
        /// Position of the face in the list.
        face: usize,
        /// Which index is wrong.
        problem: FaceIndexError,
    },
}

/// An index of a face that does not fit the mesh. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaceIndexError {
    #[error("point index {index} is out of range ({count} points)")]
    PointOutOfRange { index: usize, count: usize },

    #[error("point index {index} is used twice")]
    RepeatedPoint { index: usize },

    #[error("normal index {index} is out of range ({count} normals)")]
    NormalOutOfRange { index: usize, count: usize },
}

/// Geometry that has no well-defined answer.
///
/// These are never returned as errors: the pipeline substitutes a fallback
/// value and reports the condition through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateGeometry {
    /// A derived face normal had zero length; the zero vector is used.
    ZeroNormal {
        /// Index of the face in load order.
        face: usize,
    },
    /// The farthest depth of a frame was exactly zero; the absorption ratio
    /// is taken as zero.
    ZeroFarthestDepth,
}

impl fmt::Display for DegenerateGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateGeometry::ZeroNormal { face } => {
                write!(f, "face {face} has a zero-length normal")
            }
            DegenerateGeometry::ZeroFarthestDepth => {
                write!(f, "farthest depth is zero, absorption disabled")
            }
        }
    }
}

/// Errors raised when writing captured frames.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing was captured.
    #[error("no frames were captured")]
    NoFrames,

    /// The output file could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The image encoder rejected a frame.
    #[error("failed to encode animation: {0}")]
    Encode(#[from] image::ImageError),
}

/// Anything that ends a run of the `quadspin` binary early.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// The display window failed (SDL reports errors as strings).
    #[error("window error: {0}")]
    Window(String),

    #[error("failed to start render thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("render thread panicked")]
    WorkerPanicked,
}
