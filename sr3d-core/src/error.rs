/// Error type shared by the whole core crate.
///
/// Everything that can go wrong while configuring cameras, attaching objects
/// or loading meshes. Degenerate geometry during clipping is not an error and
/// never shows up here.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid camera parameter {parameter}: {value}")]
    InvalidCamera { parameter: &'static str, value: f32 },

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("an object cannot be attached to itself")]
    SelfAttach,

    #[error("attachment would create a cycle")]
    AttachmentCycle,

    #[error("object is not attached")]
    NotAttached,

    #[error("unknown object")]
    UnknownObject,

    #[error("unknown camera")]
    UnknownCamera,

    #[error("the last camera cannot be removed")]
    LastCamera,

    #[error("frustum planes do not intersect in a corner point")]
    DegenerateFrustum,

    #[error("face index {index} out of range, mesh has {vertex_count} vertices")]
    MeshIndexOutOfRange { index: i64, vertex_count: usize },

    #[error("OBJ parse error on line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
