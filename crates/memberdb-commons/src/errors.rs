//! Domain error taxonomy.
//!
//! Every failure a handler can surface is one of these variants. Each variant
//! carries a fixed HTTP status and a stable `error_code` string; the api crate
//! renders them as a uniform `{error_msg, error_code}` body. Messages for the
//! credential-failure variants are intentionally identical for "unknown
//! username" and "wrong password" so callers cannot enumerate registered
//! usernames.

use thiserror::Error;

/// Result alias for fallible domain operations.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Credential failure: unknown username or wrong password. One variant,
    /// one body; the distinction must not be observable.
    #[error("email or password mismatch")]
    Unauthorized,

    /// Authenticated membership lacks the permission for the requested action.
    #[error("membership lacks permission for this action")]
    NotAuthorized,

    /// Tenant database missing, or owned by a different membership.
    #[error("membership database not found")]
    MembershipDbNotFound,

    /// Metadata snapshot missing, or owned by a different membership.
    #[error("metadata snapshot not found")]
    MetadataNotFound,

    /// Referenced column id not present in the resolved snapshot.
    #[error("column not found in metadata")]
    ColumnNotFound,

    /// Uniqueness violation while persisting a tenant database registration.
    #[error("duplicate tenant database registration")]
    DuplicateRegistration,

    /// Request payload failed validation before reaching the domain.
    #[error("invalid request payload: {0}")]
    Validation(String),

    /// Ciphertext could not be decoded, decrypted or parsed.
    #[error("credential decryption failed: {0}")]
    Decryption(String),

    /// Tenant database unreachable or a query against it failed.
    #[error("tenant database connection failed: {0}")]
    TenantConnection(String),

    /// Classification oracle invocation failed.
    #[error("classification failed: {0}")]
    Classification(String),

    /// Password hashing or verification infrastructure failure. A wrong
    /// password is NOT this; that is `Unauthorized`.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// System-of-record store failure.
    #[error("store operation failed: {0}")]
    Store(String),

    /// Catch-all for unclassified failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error translates to at the boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Unauthorized => 401,
            AppError::NotAuthorized => 403,
            AppError::MembershipDbNotFound
            | AppError::MetadataNotFound
            | AppError::ColumnNotFound => 404,
            AppError::DuplicateRegistration => 409,
            AppError::Validation(_) | AppError::Decryption(_) => 400,
            AppError::TenantConnection(_) | AppError::Classification(_) => 502,
            AppError::Hashing(_) | AppError::Store(_) | AppError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code reported to clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "exceptions.emailOrPasswordMissmatch",
            AppError::NotAuthorized => "exceptions.notAuthorized",
            AppError::MembershipDbNotFound => "exceptions.membershipDbNotFound",
            AppError::MetadataNotFound => "exceptions.metadataNotFound",
            AppError::ColumnNotFound => "exceptions.columnNotFound",
            AppError::DuplicateRegistration => "errors.uniqueViolation",
            AppError::Validation(_) => "exceptions.validationError",
            AppError::Decryption(_) => "exceptions.decryptionFailed",
            AppError::TenantConnection(_) => "exceptions.tenantConnectionFailed",
            AppError::Classification(_) => "exceptions.classificationFailed",
            AppError::Hashing(_) | AppError::Store(_) | AppError::Internal(_) => {
                "exceptions.internalServerError"
            }
        }
    }

    /// Client-facing message. Internal variants expose only a kind name,
    /// never the underlying detail (that goes to the log instead).
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Email or password missmatch".to_string(),
            AppError::NotAuthorized => {
                "Membership has no permission to take this action".to_string()
            }
            AppError::MembershipDbNotFound => "Membership database not found".to_string(),
            AppError::MetadataNotFound => "Metadata not found".to_string(),
            AppError::ColumnNotFound => "Column not found".to_string(),
            AppError::DuplicateRegistration => {
                "Database already registered for this membership".to_string()
            }
            AppError::Validation(detail) => detail.clone(),
            AppError::Decryption(_) => "Could not decrypt credential payload".to_string(),
            AppError::TenantConnection(_) => "Could not connect to membership database".to_string(),
            AppError::Classification(_) => "Column classification failed".to_string(),
            AppError::Hashing(_) | AppError::Store(_) | AppError::Internal(_) => {
                format!("internal server error {}", self.kind_name())
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Unauthorized",
            AppError::NotAuthorized => "NotAuthorized",
            AppError::MembershipDbNotFound => "MembershipDbNotFound",
            AppError::MetadataNotFound => "MetadataNotFound",
            AppError::ColumnNotFound => "ColumnNotFound",
            AppError::DuplicateRegistration => "DuplicateRegistration",
            AppError::Validation(_) => "Validation",
            AppError::Decryption(_) => "Decryption",
            AppError::TenantConnection(_) => "TenantConnection",
            AppError::Classification(_) => "Classification",
            AppError::Hashing(_) => "Hashing",
            AppError::Store(_) => "Store",
            AppError::Internal(_) => "Internal",
        }
    }
}
