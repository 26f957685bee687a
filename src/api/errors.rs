use thiserror::Error;

/// Terminal, user-visible failures. None is retried; the operator fixes the
/// condition and re-invokes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Usage(String),
    #[error("group '{0}' not found")]
    GroupNotFound(String),
    #[error("group '{0}' is not defined in the local group database")]
    NotLocalGroup(String),
    #[error("group '{group}' has an invalid GID field '{raw}'")]
    InvalidGid { group: String, raw: String },
    #[error("GID {gid} is already assigned to group '{owner}'")]
    GidCollision { gid: u32, owner: String },
    #[error("account database edit failed: {0}")]
    DatabaseEdit(String),
    #[error("insufficient privileges: {0}")]
    Privilege(String),
    #[error("locking failed: {0}")]
    Locking(String),
    #[error("pending-remap marker: {0}")]
    Marker(String),
    #[error("{0}")]
    Io(String),
}

impl ApiError {
    #[must_use]
    pub const fn id(&self) -> ErrorId {
        match self {
            ApiError::Usage(_) => ErrorId::E_USAGE,
            ApiError::GroupNotFound(_) => ErrorId::E_NOT_FOUND,
            ApiError::NotLocalGroup(_) => ErrorId::E_NOT_LOCAL,
            ApiError::InvalidGid { .. } => ErrorId::E_INVALID_GID,
            ApiError::GidCollision { .. } => ErrorId::E_COLLISION,
            ApiError::DatabaseEdit(_) => ErrorId::E_DB_EDIT,
            ApiError::Privilege(_) => ErrorId::E_PRIVILEGE,
            ApiError::Locking(_) => ErrorId::E_LOCKING,
            ApiError::Marker(_) => ErrorId::E_MARKER,
            ApiError::Io(_) => ErrorId::E_IO,
        }
    }

    /// Every failure exits 1; the error ID in the facts tells them apart.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

pub const EXIT_FAILURE: u8 = 1;

impl From<crate::types::errors::Error> for ApiError {
    fn from(e: crate::types::errors::Error) -> Self {
        use crate::types::errors::ErrorKind::{Command, Io, Parse, Policy};
        match e.kind {
            Io | Parse => ApiError::Io(e.msg),
            Command | Policy => ApiError::DatabaseEdit(e.msg),
        }
    }
}

// Stable identifiers recorded in facts; SCREAMING_SNAKE_CASE matches the emitted IDs.
#[allow(non_camel_case_types, reason = "error IDs are emitted verbatim")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_USAGE,
    E_NOT_FOUND,
    E_NOT_LOCAL,
    E_INVALID_GID,
    E_COLLISION,
    E_DB_EDIT,
    E_PRIVILEGE,
    E_LOCKING,
    E_MARKER,
    E_IO,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_USAGE => "E_USAGE",
        ErrorId::E_NOT_FOUND => "E_NOT_FOUND",
        ErrorId::E_NOT_LOCAL => "E_NOT_LOCAL",
        ErrorId::E_INVALID_GID => "E_INVALID_GID",
        ErrorId::E_COLLISION => "E_COLLISION",
        ErrorId::E_DB_EDIT => "E_DB_EDIT",
        ErrorId::E_PRIVILEGE => "E_PRIVILEGE",
        ErrorId::E_LOCKING => "E_LOCKING",
        ErrorId::E_MARKER => "E_MARKER",
        ErrorId::E_IO => "E_IO",
    }
}
