//! Error types for helpdesk operations.

use helpdesk_runtime::StoreError;
use thiserror::Error;

/// Result type alias for helpdesk operations.
pub type Result<T> = std::result::Result<T, HelpdeskError>;

/// Every way a helpdesk operation can fail.
///
/// A returned error always means nothing was written: operations are
/// all-or-nothing and are never retried by the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HelpdeskError {
    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// No authenticated actor was supplied.
    #[error("Authentication required")]
    Unauthorized,

    /// The actor is authenticated but may not perform the operation.
    #[error("Forbidden: cannot {operation} ({reason})")]
    Forbidden {
        /// Operation that was denied
        operation: &'static str,
        /// Why the Gate denied it
        reason: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// A referenced ticket, equipment or actor record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (`ticket`, `equipment`, `actor`)
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// The actor an assignment targets does not exist.
    #[error("Actor {id} not found")]
    ActorNotFound {
        /// Identifier of the missing actor
        id: i64,
    },

    // ═══════════════════════════════════════════════════════════
    // Conflict Errors
    // ═══════════════════════════════════════════════════════════

    /// Another equipment record already carries this serial number.
    #[error("Serial number '{serial}' is already in use")]
    DuplicateSerial {
        /// The conflicting serial number
        serial: String,
    },

    /// Another actor already uses this username or email.
    #[error("An actor with {field} '{value}' already exists")]
    DuplicateActor {
        /// Conflicting field (`username` or `email`)
        field: &'static str,
        /// The conflicting value
        value: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// A domain rule rejected the input.
    #[error("Invalid {field}: {message}")]
    ValidationFailed {
        /// Field that failed validation
        field: &'static str,
        /// Human-readable explanation
        message: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal invariant broken (poisoned lock, runaway dispatch).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HelpdeskError {
    /// Shorthand for a [`HelpdeskError::ValidationFailed`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if this error was caused by the caller's input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use helpdesk::HelpdeskError;
    /// assert!(HelpdeskError::DuplicateSerial { serial: "SN-1".into() }.is_user_error());
    /// assert!(!HelpdeskError::Storage("connection reset".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::ActorNotFound { .. }
                | Self::DuplicateSerial { .. }
                | Self::DuplicateActor { .. }
                | Self::ValidationFailed { .. }
        )
    }

    /// Returns `true` if the Gate rejected the operation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use helpdesk::HelpdeskError;
    /// assert!(HelpdeskError::Unauthorized.is_permission_error());
    /// assert!(!HelpdeskError::Internal("oops".into()).is_permission_error());
    /// ```
    #[must_use]
    pub const fn is_permission_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden { .. })
    }
}

impl From<StoreError> for HelpdeskError {
    fn from(error: StoreError) -> Self {
        Self::Internal(error.to_string())
    }
}
