use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};

/// Result type alias for placement operations.
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Every way a placement operation can fail.
///
/// All domain variants are user-facing: the HTTP layer turns them into a
/// status code and a message. `Database` is the only infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("Placement requests are not supported for this pet type")]
    CapabilityDenied,

    #[error("An active placement request of this type already exists for this pet")]
    DuplicateActiveRequest,

    #[error("The pet has an active foster assignment")]
    ActiveFosterConflict,

    #[error("The placement request is not open for responses")]
    RequestNotActive,

    #[error("You cannot respond to your own placement request")]
    SelfResponseForbidden,

    #[error("This helper profile was rejected for this placement request")]
    HelperBlocked,

    #[error("This helper profile already has an active response on this placement request")]
    AlreadyResponded,

    #[error("You are not allowed to perform this action")]
    Forbidden,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("This action is not supported for this placement type")]
    UnsupportedType,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PlacementError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CapabilityDenied => "capability_denied",
            Self::DuplicateActiveRequest => "duplicate_active_request",
            Self::ActiveFosterConflict => "active_foster_conflict",
            Self::RequestNotActive => "request_not_active",
            Self::SelfResponseForbidden => "self_response_forbidden",
            Self::HelperBlocked => "helper_blocked",
            Self::AlreadyResponded => "already_responded",
            Self::Forbidden => "forbidden",
            Self::InvalidState(_) => "invalid_state",
            Self::UnsupportedType => "unsupported_type",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "database",
        }
    }

    /// Map a failed write to a domain error when a unique index rejected it.
    ///
    /// Preconditions are checked under row locks first, so a unique violation
    /// here means a concurrent writer got in between; `on_conflict` names the
    /// kind that describes the lost race.
    pub fn from_write(err: DbErr, on_conflict: PlacementError) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => on_conflict,
            _ => Self::Database(err),
        }
    }
}

impl ResponseError for PlacementError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateActiveRequest
            | Self::ActiveFosterConflict
            | Self::RequestNotActive
            | Self::HelperBlocked
            | Self::AlreadyResponded
            | Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::CapabilityDenied | Self::SelfResponseForbidden | Self::UnsupportedType => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Database(e) = self {
            tracing::error!(error = %e, "placement operation failed");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }))
    }
}
