use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File exceeds the maximum size of {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },

    #[error("Content type is not allowed: {0}")]
    UnsupportedType(String),

    #[error("File storage error: {operation} failed: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    pub fn io(operation: &str, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.to_string(),
            source,
        }
    }
}
