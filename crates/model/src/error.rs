/// All errors that can be returned when loading an artifact.
///
/// `NotFound` and `Parse` are fatal to the request that triggered the load;
/// there is no per-record recovery at this layer.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The referenced artifact path does not exist.
    #[error("artifact not found: {path}")]
    NotFound { path: String },

    /// The artifact exists but its content is malformed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The artifact could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
