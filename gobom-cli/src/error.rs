//! CLI-specific error types and exit code mapping

use gobom_core::error::GobomError;
use gobom_resolver::ResolverError;
use gobom_sbom::SbomBuildError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// An external toolchain process could not be invoked or failed.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from gobom-core.
    #[error("{0}")]
    Core(#[from] GobomError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 3    | Toolchain invocation failed      |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Toolchain(_) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<ResolverError> for CliError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::Tool { .. } => Self::Toolchain(e.to_string()),
            ResolverError::Io { source, .. } => Self::Io(source),
            other => Self::Command(other.to_string()),
        }
    }
}

impl From<SbomBuildError> for CliError {
    fn from(e: SbomBuildError) -> Self {
        Self::Command(e.to_string())
    }
}
