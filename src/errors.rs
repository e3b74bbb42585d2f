use thiserror::Error;

/// Coarse classification used by callers that map errors onto responses
/// (e.g. a web layer turning `Validation`/`Domain` into 4xx).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Domain,
    Internal,
    Io,
}

#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("{0}")]
    InvalidShape(String),

    #[error("unsupported operator in OR condition: {0}")]
    UnsupportedOrOperator(String),

    #[error("Internal invariant violated: {0}")]
    Internal(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CriteriaError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Json(_) => ErrorKind::Validation,
            Self::TypeMismatch(_) | Self::InvalidShape(_) | Self::UnsupportedOrOperator(_) => {
                ErrorKind::Domain
            }
            Self::Internal(_) => ErrorKind::Internal,
            Self::Config(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }

    #[must_use]
    pub const fn is_domain(&self) -> bool {
        matches!(self.kind(), ErrorKind::Domain)
    }
}

impl From<std::io::Error> for CriteriaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<toml::de::Error> for CriteriaError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
