/// Category of a replica error. Lets callers decide whether to drop the
/// offending item, degrade the response, or abort startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration: permanent, fail at startup.
    Config,
    /// Network / backend unreachable: transient, log and carry on.
    Transport,
    /// Malformed key, version or missing field: drop the item.
    Validation,
    /// Logical error (unexpected response, invalid state, generic).
    Logic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Transport => f.write_str("transport"),
            ErrorKind::Validation => f.write_str("validation"),
            ErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Unified error type for index backends and collaborator clients.
///
/// Carries an `ErrorKind` for categorization and a human-readable message.
/// `From` impls assign the appropriate kind automatically so `?` works
/// across serde and I/O boundaries.
#[derive(Clone, PartialEq, Eq)]
pub struct ReplicaError {
    kind: ErrorKind,
    message: String,
}

impl ReplicaError {
    /// Generic logic error (default kind).
    pub fn new(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Transport, message: msg.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Validation, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

impl std::fmt::Debug for ReplicaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for ReplicaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ReplicaError {}

impl From<String> for ReplicaError {
    fn from(s: String) -> Self { Self { kind: ErrorKind::Logic, message: s } }
}

impl From<&str> for ReplicaError {
    fn from(s: &str) -> Self { Self { kind: ErrorKind::Logic, message: s.to_string() } }
}

impl From<std::io::Error> for ReplicaError {
    fn from(e: std::io::Error) -> Self { Self { kind: ErrorKind::Transport, message: e.to_string() } }
}

impl From<serde_json::Error> for ReplicaError {
    fn from(e: serde_json::Error) -> Self { Self { kind: ErrorKind::Validation, message: e.to_string() } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_are_validation() {
        let err: ReplicaError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(err.is_validation());
    }

    #[test]
    fn debug_shows_kind() {
        let err = ReplicaError::transport("connection refused");
        assert_eq!(format!("{err:?}"), "[transport] connection refused");
        assert_eq!(err.to_string(), "connection refused");
    }
}
