use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use colloquy_api::{
    Comment, CommentEvent, CommentPatch, DocId, DocPath, Document, DocumentData, Elevation,
    EventNotifier, Feature, NamedQuery, NewComment, NewDocument, Operation, Page, PageRequest,
    Principal, Query, Repository, Security, SortField, SortInfo, Target,
};

use crate::{
    ancestor_ids_for, AncestorResolver, Config, ContainerPathResolver, Error, PermissionGate,
};

/// Storage strategies this comment manager implements
pub const SUPPORTED_FEATURES: &[Feature] = &[Feature::CommentsLinkedWithProperty];

/// Comments stored as documents linked to their parent through a property
///
/// Holds no per-request state: every operation takes the requesting
/// principal, so a single manager can be shared between tasks.
pub struct CommentManager {
    repo: Arc<dyn Repository>,
    security: Arc<dyn Security>,
    query: Arc<dyn Query>,
    events: Arc<dyn EventNotifier>,
    config: Config,
}

impl CommentManager {
    pub fn new(
        repo: Arc<dyn Repository>,
        security: Arc<dyn Security>,
        query: Arc<dyn Query>,
        events: Arc<dyn EventNotifier>,
    ) -> CommentManager {
        CommentManager {
            repo,
            security,
            query,
            events,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> CommentManager {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolver(&self) -> AncestorResolver<'_> {
        AncestorResolver::new(&*self.repo, &*self.security)
    }

    fn gate(&self) -> PermissionGate<'_> {
        PermissionGate::new(&*self.security)
    }

    fn containers(&self) -> ContainerPathResolver<'_> {
        ContainerPathResolver::new(&*self.repo, &self.config)
    }

    pub fn supported_features(&self) -> &'static [Feature] {
        SUPPORTED_FEATURES
    }

    /// Fails with `UnsupportedOperation` for any storage strategy this
    /// manager does not implement
    pub fn has_feature(&self, feature: Feature) -> Result<bool, Error> {
        match SUPPORTED_FEATURES.contains(&feature) {
            true => Ok(true),
            false => Err(Error::Api(colloquy_api::Error::UnsupportedOperation(feature))),
        }
    }

    /// Reads a document as the system, since comments are usually not
    /// readable by the principal itself
    async fn fetch(&self, principal: &Principal, id: DocId) -> Result<Option<Document>, Error> {
        let elevation = Elevation::acquire(principal);
        let system = elevation.actor();
        if !self
            .repo
            .exists(system, id)
            .await
            .with_context(|| format!("checking existence of {id}"))?
        {
            return Ok(None);
        }
        Ok(Some(
            self.repo
                .get(system, id)
                .await
                .with_context(|| format!("fetching {id}"))?,
        ))
    }

    async fn fetch_comment(&self, principal: &Principal, id: DocId) -> Result<Document, Error> {
        match self.fetch(principal, id).await? {
            Some(doc) if doc.is_comment() => Ok(doc),
            _ => Err(Error::not_found(Target::Document(id), &principal.name)),
        }
    }

    async fn fetch_external(&self, principal: &Principal, entity_id: &str) -> Result<Document, Error> {
        let page = {
            let elevation = Elevation::acquire(principal);
            self.query
                .page(
                    elevation.actor(),
                    PageRequest::single(NamedQuery::CommentAsExternalEntity(String::from(
                        entity_id,
                    ))),
                )
                .await
                .with_context(|| format!("looking up external comment {entity_id:?}"))?
        };
        match page.items.into_iter().next() {
            Some(doc) if doc.is_comment() => Ok(doc),
            _ => Err(Error::not_found(
                Target::External(String::from(entity_id)),
                &principal.name,
            )),
        }
    }

    pub async fn create_comment(
        &self,
        principal: &Principal,
        parent_id: DocId,
        payload: NewComment,
    ) -> Result<Comment, Error> {
        self.create_comment_at(principal, parent_id, payload, None).await
    }

    /// Same as `create_comment`, but stores the comment under `location`
    /// instead of the provisioned comment container
    pub async fn create_located_comment(
        &self,
        principal: &Principal,
        parent_id: DocId,
        payload: NewComment,
        location: DocPath,
    ) -> Result<Comment, Error> {
        self.create_comment_at(principal, parent_id, payload, Some(location))
            .await
    }

    async fn create_comment_at(
        &self,
        principal: &Principal,
        parent_id: DocId,
        payload: NewComment,
        location: Option<DocPath>,
    ) -> Result<Comment, Error> {
        payload.validate()?;
        let parent = self
            .fetch(principal, parent_id)
            .await?
            .ok_or_else(|| Error::not_found(Target::Document(parent_id), &principal.name))?;
        let root = self.resolver().find_root(principal, &parent).await?;
        self.gate()
            .authorize_read(principal, root, Operation::Create, parent_id)
            .await?;

        let comment = Comment {
            id: DocId::new(),
            parent_id,
            ancestor_ids: ancestor_ids_for(&parent),
            author: payload.author.unwrap_or_else(|| principal.name.clone()),
            text: payload.text,
            creation_date: payload.creation_date.unwrap_or_else(Utc::now),
            modification_date: None,
            external: payload.external,
        };
        let location = match location {
            Some(location) => location,
            None => self.containers().ensure_container(principal, root).await?.path,
        };
        let model = NewDocument::new(
            location,
            self.config.comment_name.clone(),
            DocumentData::Comment(comment),
        );
        let doc = {
            let elevation = Elevation::acquire(principal);
            self.repo
                .create(elevation.actor(), model)
                .await
                .with_context(|| format!("storing new comment on {parent_id}"))?
        };
        let path = doc.path.clone();
        let comment = doc.into_comment().ok_or_else(|| {
            Error::invariant_violation(parent_id, &principal.name, "stored comment is not a comment")
        })?;
        tracing::info!(principal = %principal.name, id = ?comment.id, ?parent_id, ?root, %path, "created comment");
        self.events
            .notify(CommentEvent::added(root, comment.clone()))
            .await
            .with_context(|| format!("notifying addition of comment {}", comment.id))?;
        Ok(comment)
    }

    pub async fn get_comment(&self, principal: &Principal, id: DocId) -> Result<Comment, Error> {
        let doc = self.fetch_comment(principal, id).await?;
        self.read_comment(principal, doc).await
    }

    pub async fn get_external_comment(
        &self,
        principal: &Principal,
        entity_id: &str,
    ) -> Result<Comment, Error> {
        let doc = self.fetch_external(principal, entity_id).await?;
        self.read_comment(principal, doc).await
    }

    async fn read_comment(&self, principal: &Principal, doc: Document) -> Result<Comment, Error> {
        let root = self.resolver().find_root(principal, &doc).await?;
        self.gate()
            .authorize_read(principal, root, Operation::Read, root)
            .await?;
        let id = doc.id;
        doc.into_comment()
            .ok_or_else(|| Error::not_found(Target::Document(id), &principal.name))
    }

    /// Returns the top-level comment of the thread `id` belongs to
    pub async fn thread_for_comment(&self, principal: &Principal, id: DocId) -> Result<Comment, Error> {
        let doc = self.fetch_comment(principal, id).await?;
        let comment = doc
            .as_comment()
            .ok_or_else(|| Error::not_found(Target::Document(id), &principal.name))?;
        self.resolver().thread_for(principal, comment).await
    }

    /// Lists the direct replies to `target`, sorted by creation date
    ///
    /// Authorization is skipped if `target` does not exist anymore, so that
    /// comments left behind by a just-deleted document can still be listed.
    pub async fn list_comments(
        &self,
        principal: &Principal,
        target: DocId,
        page_size: Option<u64>,
        page_index: u64,
        sort_ascending: bool,
    ) -> Result<Page<Comment>, Error> {
        if let Some(doc) = self.fetch(principal, target).await? {
            let root = self.resolver().find_root(principal, &doc).await?;
            self.gate()
                .authorize_read(principal, root, Operation::Read, target)
                .await?;
        }
        let request = PageRequest {
            query: NamedQuery::CommentsForDocument(target),
            sort: Some(SortInfo {
                field: SortField::CreationDate,
                ascending: sort_ascending,
            }),
            page_size,
            page_index,
        };
        let page = {
            let elevation = Elevation::acquire(principal);
            self.query
                .page(elevation.actor(), request)
                .await
                .with_context(|| format!("listing comments of {target}"))?
        };
        tracing::debug!(principal = %principal.name, ?target, total = page.total_count, "listed comments");
        page.try_map(|doc| {
            let id = doc.id;
            doc.into_comment().ok_or_else(|| {
                Error::invariant_violation(id, &principal.name, "comment query returned a non-comment")
            })
        })
    }

    pub async fn update_comment(
        &self,
        principal: &Principal,
        id: DocId,
        patch: CommentPatch,
    ) -> Result<Comment, Error> {
        patch.validate()?;
        let doc = self.fetch_comment(principal, id).await?;
        self.edit_comment(principal, doc, patch).await
    }

    pub async fn update_external_comment(
        &self,
        principal: &Principal,
        entity_id: &str,
        patch: CommentPatch,
    ) -> Result<Comment, Error> {
        patch.validate()?;
        let doc = self.fetch_external(principal, entity_id).await?;
        self.edit_comment(principal, doc, patch).await
    }

    async fn edit_comment(
        &self,
        principal: &Principal,
        mut doc: Document,
        patch: CommentPatch,
    ) -> Result<Comment, Error> {
        let id = doc.id;
        let comment = doc
            .as_comment_mut()
            .ok_or_else(|| Error::not_found(Target::Document(id), &principal.name))?;
        self.gate().authorize_update(principal, comment)?;
        comment.apply(patch);
        let updated = comment.clone();
        {
            let elevation = Elevation::acquire(principal);
            self.repo
                .save(elevation.actor(), &doc)
                .await
                .with_context(|| format!("saving comment {id}"))?;
        }
        tracing::info!(principal = %principal.name, ?id, "updated comment");
        Ok(updated)
    }

    pub async fn delete_comment(&self, principal: &Principal, id: DocId) -> Result<(), Error> {
        let doc = self.fetch_comment(principal, id).await?;
        self.remove_comment(principal, doc).await
    }

    pub async fn delete_external_comment(
        &self,
        principal: &Principal,
        entity_id: &str,
    ) -> Result<(), Error> {
        let doc = self.fetch_external(principal, entity_id).await?;
        self.remove_comment(principal, doc).await
    }

    async fn remove_comment(&self, principal: &Principal, doc: Document) -> Result<(), Error> {
        let id = doc.id;
        let snapshot = doc
            .into_comment()
            .ok_or_else(|| Error::not_found(Target::Document(id), &principal.name))?;
        let root = self
            .resolver()
            .find_comment_root(principal, &snapshot)
            .await?;
        self.gate()
            .authorize_delete(principal, &snapshot, root)
            .await?;
        {
            let elevation = Elevation::acquire(principal);
            self.repo
                .remove(elevation.actor(), id)
                .await
                .with_context(|| format!("removing comment {id}"))?;
        }
        let parent = snapshot.parent_id;
        tracing::info!(principal = %principal.name, ?id, ?parent, "deleted comment");
        self.events
            .notify(CommentEvent::removed(parent, snapshot))
            .await
            .with_context(|| format!("notifying removal of comment {id}"))?;
        Ok(())
    }
}
