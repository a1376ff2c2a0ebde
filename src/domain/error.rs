use thiserror::Error;

/// Kind of storage constraint that rejected a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    NotNull,
    ForeignKey,
    Check,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unique => "unique",
            Self::NotNull => "not-null",
            Self::ForeignKey => "foreign key",
            Self::Check => "check",
        };
        write!(f, "{}", name)
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Integrity error reported by the store when a commit breaks a constraint
    #[error("Constraint violation: {kind} constraint '{constraint}' failed")]
    ConstraintViolation {
        kind: ConstraintKind,
        constraint: String,
    },

    /// The session saw a failed commit and must be rolled back before reuse
    #[error("Session aborted: {reason}; roll back before issuing further operations")]
    SessionAborted { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn constraint(kind: ConstraintKind, constraint: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            kind,
            constraint: constraint.into(),
        }
    }

    pub fn unique(constraint: impl Into<String>) -> Self {
        Self::constraint(ConstraintKind::Unique, constraint)
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self::constraint(ConstraintKind::NotNull, column)
    }

    pub fn foreign_key(constraint: impl Into<String>) -> Self {
        Self::constraint(ConstraintKind::ForeignKey, constraint)
    }

    pub fn check(constraint: impl Into<String>) -> Self {
        Self::constraint(ConstraintKind::Check, constraint)
    }

    pub fn session_aborted(reason: impl Into<String>) -> Self {
        Self::SessionAborted {
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for integrity errors raised at commit time
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Name of the violated constraint, if this is an integrity error
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            Self::ConstraintViolation { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}
