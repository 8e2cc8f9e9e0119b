//! Unified error type for repository browsing.

use thiserror::Error;

/// All errors that can occur while browsing repositories.
#[derive(Error, Debug)]
pub enum BrowseError {
    /// I/O error (directory scan, counter file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Project name is not in the registry. Callers render a not-found page.
    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    /// The engine binary could not be started at all (missing binary, bad permissions)
    #[error("Failed to execute '{command}': {source}. Is git installed and in PATH?")]
    EngineSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited unsuccessfully. `output` holds stdout followed by stderr.
    #[error("'{command}' failed ({status}): {output}")]
    EngineExecution {
        command: String,
        status: String,
        output: String,
    },

    /// The engine did not finish before the deadline and was killed
    #[error("'{command}' timed out after {timeout_ms} ms")]
    EngineTimeout { command: String, timeout_ms: u64 },

    /// The caller abandoned the query and the engine was killed
    #[error("'{command}' was cancelled")]
    Cancelled { command: String },

    /// A parameter was rejected before reaching the engine
    #[error("{0}")]
    InvalidArgs(String),

    /// Could not take the exclusive lock on a counter file
    #[error("Failed to lock counter file {path}: {source}")]
    CounterLock {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BrowseError {
    /// True for conditions the presentation layer should render as a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowseError::RepositoryNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = BrowseError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_repository_not_found_display() {
        let err = BrowseError::RepositoryNotFound {
            name: "linux".to_string(),
        };
        assert!(err.to_string().contains("linux"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_engine_execution_display_includes_output() {
        let err = BrowseError::EngineExecution {
            command: "git ls-tree 'nope'".to_string(),
            status: "exit status: 128".to_string(),
            output: "fatal: Not a valid object name nope".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ls-tree"));
        assert!(msg.contains("Not a valid object name"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_timeout_display() {
        let err = BrowseError::EngineTimeout {
            command: "git rev-list --all".to_string(),
            timeout_ms: 1500,
        };
        assert!(err.to_string().contains("1500 ms"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: BrowseError = io_err.into();
        assert!(matches!(err, BrowseError::Io(_)));
    }
}
