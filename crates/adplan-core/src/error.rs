use thiserror::Error;

/// Failure class of a [`PlanError`], without the context payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Division,
    Allocation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Division => write!(f, "division"),
            ErrorKind::Allocation => write!(f, "allocation"),
        }
    }
}

/// Errors raised by the filter, scorer, and allocator stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid {field} for {subject}: {reason}")]
    Validation {
        subject: String,
        field: &'static str,
        reason: String,
    },

    #[error("division by zero computing {quantity} for location '{location}'")]
    Division {
        location: String,
        quantity: &'static str,
    },

    #[error("allocation skipped: {reason}")]
    Allocation { reason: String },
}

impl PlanError {
    pub(crate) fn validation(
        subject: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        PlanError::Validation {
            subject: subject.into(),
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn division(location: impl Into<String>, quantity: &'static str) -> Self {
        PlanError::Division {
            location: location.into(),
            quantity,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::Validation { .. } => ErrorKind::Validation,
            PlanError::Division { .. } => ErrorKind::Division,
            PlanError::Allocation { .. } => ErrorKind::Allocation,
        }
    }

    /// Only allocation failures let the pipeline continue; ranking output is
    /// still valid when they occur.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Allocation
    }
}

/// Errors raised while reading environment configuration or a campaign file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read campaign file {path}: {source}")]
    CampaignFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse campaign file: {0}")]
    CampaignFileParse(#[from] serde_yaml::Error),

    #[error("campaign validation error: {0}")]
    Validation(String),
}

/// Errors raised while loading location records from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported data format for {path}; expected .csv or .json")]
    UnsupportedFormat { path: String },

    #[error("invalid location data in {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: PlanError,
    },
}
