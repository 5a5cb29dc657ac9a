use thiserror::Error;

/// Errors from shell process operations.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The process could not be started.
    #[error("shell spawn failed: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// A standard stream was not captured as a pipe.
    #[error("shell {0} pipe was not captured")]
    PipeMissing(&'static str),

    /// No passwd record matched the current user.
    #[error("no passwd entry for uid {0}")]
    NoPasswdEntry(u32),

    #[error("shell I/O error: {0}")]
    Io(#[from] std::io::Error),
}
