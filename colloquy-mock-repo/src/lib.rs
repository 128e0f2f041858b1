use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use colloquy_api::{
    Actor, CommentEvent, DocId, DocPath, Document, DocumentData, EventNotifier, NamedQuery,
    NewDocument, Page, PageRequest, Permission, Principal, Query, Repository, Security, SortField,
};
use parking_lot::Mutex;

/// Name that, in an ACL, grants a permission to every principal
pub const EVERYONE: &str = "Everyone";

/// In-memory repository, ACL evaluator, query engine and event sink
///
/// Documents inherit the ACLs of the documents above them in the path
/// hierarchy. Parent folders are not required to exist.
pub struct MockRepo(Mutex<State>);

#[derive(Debug, Default, serde::Serialize)]
struct State {
    docs: BTreeMap<DocId, Document>,
    #[serde(skip)]
    paths: HashMap<DocPath, DocId>,
    acls: HashMap<DocId, HashMap<String, Permission>>,
    events: Vec<CommentEvent>,
}

impl State {
    fn can(&self, principal: &Principal, id: DocId, wanted: Permission) -> bool {
        if principal.administrator {
            return true;
        }
        let mut path = match self.docs.get(&id) {
            Some(doc) => Some(doc.path.clone()),
            None => return false,
        };
        while let Some(p) = path {
            let acl = self.paths.get(&p).and_then(|id| self.acls.get(id));
            if let Some(acl) = acl {
                let granted = [principal.name.as_str(), EVERYONE]
                    .iter()
                    .filter_map(|name| acl.get(*name))
                    .any(|perm| perm.implies(wanted));
                if granted {
                    return true;
                }
            }
            path = p.parent();
        }
        false
    }

    fn check(&self, actor: Actor<'_>, id: DocId, wanted: Permission) -> anyhow::Result<()> {
        match actor {
            Actor::System(_) => Ok(()),
            Actor::Principal(p) if self.can(p, id, wanted) => Ok(()),
            Actor::Principal(p) => Err(anyhow!("{} lacks {wanted:?} on {id}", p.name)),
        }
    }

    fn get(&self, id: DocId) -> anyhow::Result<&Document> {
        self.docs
            .get(&id)
            .ok_or_else(|| anyhow!("document {id} does not exist"))
    }

    fn check_can_create_in(&self, actor: Actor<'_>, parent: &DocPath) -> anyhow::Result<()> {
        match (actor, self.paths.get(parent)) {
            (Actor::System(_), _) => Ok(()),
            (Actor::Principal(p), None) if p.administrator => Ok(()),
            (Actor::Principal(p), None) => Err(anyhow!("{} cannot create documents in {parent}", p.name)),
            (actor, Some(parent_id)) => self.check(actor, *parent_id, Permission::FullControl),
        }
    }

    fn insert(&mut self, path: DocPath, model: NewDocument) -> anyhow::Result<Document> {
        if self.docs.contains_key(&model.id) {
            bail!("document id {} is already used", model.id);
        }
        let doc = Document {
            id: model.id,
            path: path.clone(),
            data: model.data,
        };
        self.paths.insert(path, doc.id);
        self.docs.insert(doc.id, doc.clone());
        Ok(doc)
    }

    /// First path below the model's parent that is not taken yet
    fn free_path(&self, model: &NewDocument) -> DocPath {
        let wanted = model.path();
        if !self.paths.contains_key(&wanted) {
            return wanted;
        }
        (1..)
            .map(|i| model.parent_path.join(&format!("{}.{i}", model.name)))
            .find(|p| !self.paths.contains_key(p))
            .expect("ran out of integers")
    }

    fn matches(doc: &Document, query: &NamedQuery) -> bool {
        let comment = match doc.as_comment() {
            Some(c) => c,
            None => return false,
        };
        match query {
            NamedQuery::CommentsForDocument(parent) => comment.parent_id == *parent,
            NamedQuery::CommentAsExternalEntity(entity_id) => comment
                .external
                .as_ref()
                .map_or(false, |e| e.entity_id == *entity_id),
        }
    }
}

impl MockRepo {
    pub fn new() -> MockRepo {
        MockRepo(Mutex::new(State::default()))
    }

    /// Stores a content item at `path`, that can then be commented upon
    pub fn add_content(&self, path: &str, title: &str) -> DocId {
        let path = DocPath::parse(path);
        let parent = path.parent().unwrap_or_else(DocPath::root);
        let name = path.name().unwrap_or_default().to_string();
        let model = NewDocument::new(
            parent,
            name,
            DocumentData::Content {
                title: String::from(title),
            },
        );
        let mut state = self.0.lock();
        if let Some(id) = state.paths.get(&path) {
            panic!("path {path} is already taken by {id}");
        }
        state
            .insert(path, model)
            .expect("inserting content with a fresh id")
            .id
    }

    pub fn grant(&self, id: DocId, principal: &str, permission: Permission) {
        self.0
            .lock()
            .acls
            .entry(id)
            .or_insert_with(HashMap::new)
            .insert(String::from(principal), permission);
    }

    pub fn revoke(&self, id: DocId, principal: &str) {
        if let Some(acl) = self.0.lock().acls.get_mut(&id) {
            acl.remove(principal);
        }
    }

    /// All the events notified so far, oldest first
    pub fn events(&self) -> Vec<CommentEvent> {
        self.0.lock().events.clone()
    }

    /// Stores `doc` as-is, bypassing every check, to build broken states
    pub fn test_insert_raw(&self, doc: Document) {
        let mut state = self.0.lock();
        state.paths.insert(doc.path.clone(), doc.id);
        state.docs.insert(doc.id, doc);
    }

    pub fn test_num_documents(&self) -> usize {
        self.0.lock().docs.len()
    }

    pub fn test_documents_in(&self, parent: &DocPath) -> Vec<Document> {
        self.0
            .lock()
            .docs
            .values()
            .filter(|d| d.path.parent().as_ref() == Some(parent))
            .cloned()
            .collect()
    }

    pub fn test_dump(&self) -> anyhow::Result<serde_json::Value> {
        serde_json::to_value(&*self.0.lock()).context("serializing mock repository")
    }
}

impl Default for MockRepo {
    fn default() -> MockRepo {
        MockRepo::new()
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn exists(&self, actor: Actor<'_>, id: DocId) -> anyhow::Result<bool> {
        let state = self.0.lock();
        Ok(state.docs.contains_key(&id) && state.check(actor, id, Permission::Read).is_ok())
    }

    async fn get(&self, actor: Actor<'_>, id: DocId) -> anyhow::Result<Document> {
        let state = self.0.lock();
        let doc = state.get(id)?;
        state.check(actor, id, Permission::Read)?;
        Ok(doc.clone())
    }

    async fn create(&self, actor: Actor<'_>, model: NewDocument) -> anyhow::Result<Document> {
        let mut state = self.0.lock();
        state.check_can_create_in(actor, &model.parent_path)?;
        let path = state.free_path(&model);
        tracing::debug!(actor = actor.name(), id = ?model.id, %path, "mock repo: creating document");
        state.insert(path, model)
    }

    async fn save(&self, actor: Actor<'_>, doc: &Document) -> anyhow::Result<()> {
        let mut state = self.0.lock();
        let stored = state.get(doc.id)?;
        if stored.path != doc.path {
            bail!("moving {} from {} to {} is not supported", doc.id, stored.path, doc.path);
        }
        state.check(actor, doc.id, Permission::FullControl)?;
        state.docs.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn remove(&self, actor: Actor<'_>, id: DocId) -> anyhow::Result<()> {
        let mut state = self.0.lock();
        let path = state.get(id)?.path.clone();
        state.check(actor, id, Permission::FullControl)?;
        let removed = state
            .docs
            .values()
            .filter(|d| d.id == id || d.path.starts_with(&path))
            .map(|d| (d.id, d.path.clone()))
            .collect::<Vec<_>>();
        for (id, path) in removed {
            state.docs.remove(&id);
            state.paths.remove(&path);
            state.acls.remove(&id);
        }
        tracing::debug!(actor = actor.name(), ?id, %path, "mock repo: removed document");
        Ok(())
    }

    async fn get_or_create(
        &self,
        actor: Actor<'_>,
        model: NewDocument,
    ) -> anyhow::Result<Document> {
        let mut state = self.0.lock();
        let path = model.path();
        if let Some(id) = state.paths.get(&path).copied() {
            state.check(actor, id, Permission::Read)?;
            return Ok(state.get(id)?.clone());
        }
        state.check_can_create_in(actor, &model.parent_path)?;
        tracing::debug!(actor = actor.name(), id = ?model.id, %path, "mock repo: creating document");
        state.insert(path, model)
    }
}

#[async_trait]
impl Security for MockRepo {
    async fn has_permission(
        &self,
        principal: &Principal,
        id: DocId,
        permission: Permission,
    ) -> anyhow::Result<bool> {
        Ok(self.0.lock().can(principal, id, permission))
    }
}

#[async_trait]
impl Query for MockRepo {
    async fn page(&self, actor: Actor<'_>, request: PageRequest) -> anyhow::Result<Page<Document>> {
        let state = self.0.lock();
        let mut results = state
            .docs
            .values()
            .filter(|d| State::matches(d, &request.query))
            .filter(|d| state.check(actor, d.id, Permission::Read).is_ok())
            .collect::<Vec<_>>();
        if let Some(sort) = request.sort {
            results.sort_by(|a, b| {
                let key = |d: &Document| match sort.field {
                    SortField::CreationDate => d.as_comment().map(|c| c.creation_date),
                };
                let ord = key(a).cmp(&key(b)).then(a.id.cmp(&b.id));
                match sort.ascending {
                    true => ord,
                    false => ord.reverse(),
                }
            });
        }
        let total_count = results.len() as u64;
        let items = match request.page_size {
            None => results.into_iter().cloned().collect(),
            Some(size) => results
                .into_iter()
                .skip(usize::try_from(request.page_index.saturating_mul(size)).unwrap_or(usize::MAX))
                .take(usize::try_from(size).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        };
        Ok(Page { items, total_count })
    }
}

#[async_trait]
impl EventNotifier for MockRepo {
    async fn notify(&self, event: CommentEvent) -> anyhow::Result<()> {
        tracing::debug!(kind = ?event.kind, source = ?event.source, comment = ?event.comment.id, "mock repo: event");
        self.0.lock().events.push(event);
        Ok(())
    }
}
