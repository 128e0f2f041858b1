use std::fmt;

use crate::{DocId, Feature};

/// What a principal was trying to do when it got denied
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Read,
    Create,
    Edit,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Read => "access the comments of",
            Operation::Create => "create comments on",
            Operation::Edit => "edit comments of",
            Operation::Delete => "delete comments of",
        })
    }
}

/// Way a missing comment or document was looked up
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    Document(DocId),
    External(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Document(id) => write!(f, "document or comment {id}"),
            Target::External(id) => write!(f, "external comment {id}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("The {target} does not exist (requested by {principal})")]
    NotFound { target: Target, principal: String },

    #[error("The user {principal} can not {operation} document {id}")]
    PermissionDenied {
        principal: String,
        operation: Operation,
        id: DocId,
    },

    #[error("This comment manager does not implement {0}")]
    UnsupportedOperation(Feature),

    #[error("Broken comment thread at {id} (requested by {principal}): {reason}")]
    InvariantViolation {
        id: DocId,
        principal: String,
        reason: String,
    },

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

impl Error {
    pub fn not_found(target: Target, principal: &str) -> Error {
        Error::NotFound {
            target,
            principal: String::from(principal),
        }
    }

    pub fn permission_denied(principal: &str, operation: Operation, id: DocId) -> Error {
        Error::PermissionDenied {
            principal: String::from(principal),
            operation,
            id,
        }
    }

    pub fn invariant_violation(id: DocId, principal: &str, reason: impl Into<String>) -> Error {
        Error::InvariantViolation {
            id,
            principal: String::from(principal),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::STUB_UUID;

    #[test]
    fn messages_name_principal_and_ids() {
        let id = DocId(STUB_UUID);
        let msg = Error::permission_denied("bob", Operation::Create, id).to_string();
        assert!(msg.contains("bob"), "{msg}");
        assert!(msg.contains(&id.to_string()), "{msg}");
        assert!(msg.contains("create comments on"), "{msg}");

        let msg = Error::not_found(Target::External(String::from("ext-42")), "carol").to_string();
        assert!(msg.contains("ext-42"), "{msg}");
        assert!(msg.contains("carol"), "{msg}");
    }
}
