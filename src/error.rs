use thiserror::Error;

/// Errors detected before any process is created.
///
/// Syntax errors abandon the current command cycle; the interpreter keeps
/// running. The `Display` text is the exact line reported on standard error
/// after the `mysh: ` prefix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    /// The line ended while a single or double quote was still open.
    #[error("syntax error: unterminated quote")]
    UnterminatedQuote,

    /// A `${NAME}` reference whose name is not `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("syntax error: invalid characters for variable {0}")]
    InvalidVariableName(String),

    /// A pipeline stage between two `|` operators was empty or blank.
    #[error("syntax error: expected command after pipe")]
    EmptyPipelineStage,
}

/// Failures of the external-command launcher.
///
/// Resolution errors (`NotFound`, `PermissionDenied`) are detected before any
/// child exists; `Io` covers pipe/fork failures and capture-pipe reads. All of
/// them abandon the cycle without terminating the interpreter.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("failed to execute command: {0}")]
    Io(#[from] std::io::Error),
}
