//! Error types for tetraviz

use thiserror::Error;

/// Main error type for tetraviz operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Cannot create a slice from plane ({a}, {b}, {c}): normal vector has a magnitude equal to 0")]
    InvalidPlane { a: f32, b: f32, c: f32 },

    #[error("Cannot compute slices or iso-surfaces without tetrahedra")]
    MissingTetrahedra,

    #[error("Not possible to compute a slice on a deformed mesh")]
    TransformedMesh,

    #[error("Iso-surface input is not set: call update_input before create_iso_surface")]
    IsoSurfaceNotInitialized,

    #[error("\"{0}\" is not a known data")]
    UnknownField(String),

    #[error("\"{component}\" is not a component of \"{field}\"")]
    UnknownComponent { field: String, component: String },

    #[error("Support of Magnitude as input component is not implemented")]
    MagnitudeUnsupported,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid bounds: lower bound {lower} is greater than upper bound {upper}")]
    InvalidBound { lower: f32, upper: f32 },

    #[error("Unknown block: {0}")]
    UnknownBlock(usize),

    #[error("{kind} block cannot be added here: {reason}")]
    IncompatibleParent { kind: &'static str, reason: &'static str },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for tetraviz operations
pub type Result<T> = std::result::Result<T, Error>;
