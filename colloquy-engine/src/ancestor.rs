use std::collections::HashSet;

use anyhow::Context;
use colloquy_api::{
    Comment, DocId, Document, DocumentData, Elevation, Operation, Permission, Principal,
    Repository, Security,
};

use crate::Error;

/// Ids to store as `ancestor_ids` on a new comment whose parent is `parent`
pub fn ancestor_ids_for(parent: &Document) -> Vec<DocId> {
    match parent.as_comment() {
        None => Vec::new(),
        Some(c) => {
            let mut res = c.ancestor_ids.clone();
            res.push(c.id);
            res
        }
    }
}

/// Result of walking up a comment's parent chain
struct Thread {
    root: DocId,

    /// Comment whose parent is `root`
    top: Comment,
}

/// Finds the content item a comment thread hangs off
pub struct AncestorResolver<'a> {
    repo: &'a dyn Repository,
    security: &'a dyn Security,
}

impl<'a> AncestorResolver<'a> {
    pub fn new(repo: &'a dyn Repository, security: &'a dyn Security) -> AncestorResolver<'a> {
        AncestorResolver { repo, security }
    }

    /// Returns the id of the nearest ancestor of `doc` that is not a comment,
    /// or `doc`'s own id if it is not a comment
    ///
    /// When `doc` is a comment, `principal` must be able to read the root.
    pub async fn resolve_root(&self, principal: &Principal, doc: &Document) -> Result<DocId, Error> {
        match doc.as_comment() {
            None => Ok(doc.id),
            Some(comment) => self.resolve_comment_root(principal, comment).await,
        }
    }

    pub async fn resolve_comment_root(
        &self,
        principal: &Principal,
        comment: &Comment,
    ) -> Result<DocId, Error> {
        let root = self.walk(principal, comment).await?.root;
        self.check_read(principal, root).await?;
        Ok(root)
    }

    /// Same as `resolve_root`, without any permission check
    ///
    /// The caller is responsible for authorizing `principal` against the
    /// returned root.
    pub async fn find_root(&self, principal: &Principal, doc: &Document) -> Result<DocId, Error> {
        match doc.as_comment() {
            None => Ok(doc.id),
            Some(comment) => self.find_comment_root(principal, comment).await,
        }
    }

    pub async fn find_comment_root(
        &self,
        principal: &Principal,
        comment: &Comment,
    ) -> Result<DocId, Error> {
        Ok(self.walk(principal, comment).await?.root)
    }

    /// Returns the top-level comment of the thread `comment` is part of
    pub async fn thread_for(&self, principal: &Principal, comment: &Comment) -> Result<Comment, Error> {
        let thread = self.walk(principal, comment).await?;
        self.check_read(principal, thread.root).await?;
        Ok(thread.top)
    }

    async fn check_read(&self, principal: &Principal, root: DocId) -> Result<(), Error> {
        let can_read = self
            .security
            .has_permission(principal, root, Permission::Read)
            .await
            .with_context(|| format!("checking read permission of {} on {root}", principal.name))?;
        if !can_read {
            tracing::warn!(principal = %principal.name, ?root, "denied access to thread root");
            return Err(Error::permission_denied(&principal.name, Operation::Read, root));
        }
        Ok(())
    }

    async fn walk(&self, principal: &Principal, comment: &Comment) -> Result<Thread, Error> {
        let mut visited = HashSet::new();
        visited.insert(comment.id);
        let mut current = comment.clone();
        {
            let elevation = Elevation::acquire(principal);
            let system = elevation.actor();
            loop {
                let parent_id = current.parent_id;
                if !visited.insert(parent_id) {
                    tracing::warn!(comment = ?current.id, ?parent_id, "cycle in comment ancestor chain");
                    return Err(Error::invariant_violation(
                        current.id,
                        &principal.name,
                        format!("parent {parent_id} was already visited"),
                    ));
                }
                let parent_exists = self
                    .repo
                    .exists(system, parent_id)
                    .await
                    .with_context(|| format!("checking existence of parent {parent_id}"))?;
                if !parent_exists {
                    tracing::warn!(comment = ?current.id, ?parent_id, "dangling comment parent");
                    return Err(Error::invariant_violation(
                        current.id,
                        &principal.name,
                        format!("parent {parent_id} does not exist"),
                    ));
                }
                let parent = self
                    .repo
                    .get(system, parent_id)
                    .await
                    .with_context(|| format!("fetching parent {parent_id}"))?;
                match parent.data {
                    DocumentData::Comment(c) => current = c,
                    _ => break,
                }
            }
        }

        let root = current.parent_id;
        tracing::debug!(comment = ?comment.id, ?root, depth = visited.len() - 1, "resolved thread root");
        Ok(Thread { root, top: current })
    }
}
