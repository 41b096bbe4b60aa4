//! Error types for SpurC

use thiserror::Error;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Editor error types
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File exceeds {}.", human_size(.limit))]
    FileTooLarge { limit: u64 },

    #[error("Buffer has no file name")]
    NoFileName,

    #[error("Compiler not found: {0}")]
    CompilerNotFound(String),

    #[error("Executable not found: {0}. Compile first.")]
    ExecutableNotFound(String),

    #[error("A job is still running")]
    JobRunning,

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Viewport is not available")]
    ViewportUnavailable,

    #[error("{0}")]
    Message(String),
}

/// `10 MB` for whole mebibytes, a byte count otherwise
fn human_size(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_too_large_message() {
        let err = EditorError::FileTooLarge { limit: 10 * 1024 * 1024 };
        assert_eq!(err.to_string(), "File exceeds 10 MB.");

        let err = EditorError::FileTooLarge { limit: 500 };
        assert_eq!(err.to_string(), "File exceeds 500 bytes.");
    }
}
