use anyhow::Context;
use colloquy_api::{Comment, DocId, Operation, Permission, Principal, Security};

use crate::Error;

/// Authorization rules for comment operations
///
/// Rules are always evaluated for the requesting principal, against the
/// thread root and never against the immediate parent of a comment.
pub struct PermissionGate<'a> {
    security: &'a dyn Security,
}

impl<'a> PermissionGate<'a> {
    pub fn new(security: &'a dyn Security) -> PermissionGate<'a> {
        PermissionGate { security }
    }

    async fn has(&self, principal: &Principal, id: DocId, permission: Permission) -> Result<bool, Error> {
        Ok(self
            .security
            .has_permission(principal, id, permission)
            .await
            .with_context(|| {
                format!("checking {permission:?} permission of {} on {id}", principal.name)
            })?)
    }

    /// Listing, reading and creating comments all require READ on the root
    ///
    /// `target` is the id named in the error, ie. what the caller asked for.
    pub async fn authorize_read(
        &self,
        principal: &Principal,
        root: DocId,
        operation: Operation,
        target: DocId,
    ) -> Result<(), Error> {
        if self.has(principal, root, Permission::Read).await? {
            return Ok(());
        }
        tracing::warn!(principal = %principal.name, ?root, ?target, %operation, "denied");
        Err(Error::permission_denied(&principal.name, operation, target))
    }

    /// Only administrators and the author can edit a comment
    pub fn authorize_update(&self, principal: &Principal, stored: &Comment) -> Result<(), Error> {
        if principal.administrator || principal.is_author_of(stored) {
            return Ok(());
        }
        tracing::warn!(principal = %principal.name, comment = ?stored.id, "denied edit");
        Err(Error::permission_denied(
            &principal.name,
            Operation::Edit,
            stored.parent_id,
        ))
    }

    /// Administrators, the author, and whoever has full control on the root
    /// can delete a comment
    pub async fn authorize_delete(
        &self,
        principal: &Principal,
        stored: &Comment,
        root: DocId,
    ) -> Result<(), Error> {
        if principal.administrator
            || principal.is_author_of(stored)
            || self.has(principal, root, Permission::FullControl).await?
        {
            return Ok(());
        }
        tracing::warn!(principal = %principal.name, comment = ?stored.id, ?root, "denied deletion");
        Err(Error::permission_denied(
            &principal.name,
            Operation::Delete,
            stored.parent_id,
        ))
    }
}
