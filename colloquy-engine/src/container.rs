use anyhow::Context;
use colloquy_api::{
    DocId, DocPath, DocumentData, Elevation, NewDocument, Principal, Repository,
};

use crate::{Config, Error};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerRef {
    pub id: DocId,
    pub path: DocPath,
}

/// Path of the folder holding the comments on a root item stored at `root_path`
///
/// Items below a top-level area (eg. a domain) get their comments stored in
/// that area, anything else at the repository root.
pub fn container_path(root_path: &DocPath, container_name: &str) -> DocPath {
    let mut parent = DocPath::root();
    if root_path.segment_count() > 1 {
        if let Some(area) = root_path.segments().next() {
            parent = parent.join(area);
        }
    }
    parent.join(container_name)
}

pub struct ContainerPathResolver<'a> {
    repo: &'a dyn Repository,
    config: &'a Config,
}

impl<'a> ContainerPathResolver<'a> {
    pub fn new(repo: &'a dyn Repository, config: &'a Config) -> ContainerPathResolver<'a> {
        ContainerPathResolver { repo, config }
    }

    /// Returns the container for comments on `root`, creating it if needed
    pub async fn ensure_container(
        &self,
        principal: &Principal,
        root: DocId,
    ) -> Result<ContainerRef, Error> {
        let elevation = Elevation::acquire(principal);
        let system = elevation.actor();
        let root_doc = self
            .repo
            .get(system, root)
            .await
            .with_context(|| format!("fetching commented document {root}"))?;
        let path = container_path(&root_doc.path, &self.config.container_name);
        let parent_path = path.parent().unwrap_or_else(DocPath::root);
        let model = NewDocument::new(
            parent_path,
            self.config.container_name.clone(),
            DocumentData::HiddenFolder,
        );
        let container = self
            .repo
            .get_or_create(system, model)
            .await
            .with_context(|| format!("getting or creating comment container {path}"))?;
        if container.data != DocumentData::HiddenFolder {
            return Err(Error::invariant_violation(
                container.id,
                &principal.name,
                format!("comment container path {path} holds something else than a folder"),
            ));
        }
        tracing::debug!(?root, container = ?container.id, %path, "comment container ready");
        Ok(ContainerRef {
            id: container.id,
            path: container.path,
        })
    }
}
