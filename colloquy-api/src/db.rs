use async_trait::async_trait;

use crate::{
    Actor, CommentEvent, DocId, Document, NewDocument, Page, PageRequest, Permission, Principal,
};

/// Document storage
///
/// Every call states who performs it; implementations are expected to
/// enforce their own access rules for `Actor::Principal` and let
/// `Actor::System` through.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn exists(&self, actor: Actor<'_>, id: DocId) -> anyhow::Result<bool>;

    async fn get(&self, actor: Actor<'_>, id: DocId) -> anyhow::Result<Document>;

    /// Stores a new document, renaming it if its path is already taken
    async fn create(&self, actor: Actor<'_>, model: NewDocument) -> anyhow::Result<Document>;

    async fn save(&self, actor: Actor<'_>, doc: &Document) -> anyhow::Result<()>;

    async fn remove(&self, actor: Actor<'_>, id: DocId) -> anyhow::Result<()>;

    /// Returns the document already stored at the model's path, or stores
    /// the model there
    ///
    /// Concurrent callers for the same path must all get the same document.
    async fn get_or_create(&self, actor: Actor<'_>, model: NewDocument)
        -> anyhow::Result<Document>;
}

#[async_trait]
pub trait Security: Send + Sync {
    async fn has_permission(
        &self,
        principal: &Principal,
        id: DocId,
        permission: Permission,
    ) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait Query: Send + Sync {
    async fn page(&self, actor: Actor<'_>, request: PageRequest) -> anyhow::Result<Page<Document>>;
}

#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn notify(&self, event: CommentEvent) -> anyhow::Result<()>;
}
