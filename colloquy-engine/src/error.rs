use colloquy_api::{DocId, Error as ApiError, Operation, Target};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failure of one of the collaborators, passed through as-is
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn not_found(target: Target, principal: &str) -> Error {
        Error::Api(ApiError::not_found(target, principal))
    }

    pub fn permission_denied(principal: &str, operation: Operation, id: DocId) -> Error {
        Error::Api(ApiError::permission_denied(principal, operation, id))
    }

    pub fn invariant_violation(id: DocId, principal: &str, reason: impl Into<String>) -> Error {
        Error::Api(ApiError::invariant_violation(id, principal, reason))
    }

    /// The API-level error, if this is not a collaborator failure
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Anyhow(_) => None,
            Error::Api(err) => Some(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.api(), Some(ApiError::NotFound { .. }))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.api(), Some(ApiError::PermissionDenied { .. }))
    }
}
