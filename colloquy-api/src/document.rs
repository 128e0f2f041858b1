use std::fmt;

use crate::{Comment, Uuid};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct DocId(pub Uuid);

impl DocId {
    pub fn new() -> DocId {
        DocId(Uuid::new_v4())
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Absolute, `/`-separated location of a document in the repository
///
/// Always starts with a `/`, never ends with one (except for the root path
/// itself), and never contains empty segments.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct DocPath(String);

impl DocPath {
    pub fn root() -> DocPath {
        DocPath(String::from("/"))
    }

    pub fn parse(path: &str) -> DocPath {
        let mut res = DocPath::root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            res = res.join(segment);
        }
        res
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn join(&self, name: &str) -> DocPath {
        let name = name.trim_matches('/');
        if name.is_empty() {
            return self.clone();
        }
        match self.is_root() {
            true => DocPath(format!("/{name}")),
            false => DocPath(format!("{}/{name}", self.0)),
        }
    }

    pub fn parent(&self) -> Option<DocPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(DocPath::root()),
            Some(idx) => Some(DocPath(self.0[..idx].to_string())),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Whether `self` is `ancestor` or somewhere below it
    pub fn starts_with(&self, ancestor: &DocPath) -> bool {
        ancestor.is_root()
            || self == ancestor
            || self
                .0
                .strip_prefix(&ancestor.0)
                .map_or(false, |rest| rest.starts_with('/'))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum DocumentData {
    /// Any regular content item, that can be commented upon
    Content { title: String },

    /// Storage location that is not displayed to users, eg. comment containers
    HiddenFolder,

    Comment(Comment),
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Document {
    pub id: DocId,
    pub path: DocPath,
    pub data: DocumentData,
}

impl Document {
    pub fn is_comment(&self) -> bool {
        matches!(self.data, DocumentData::Comment(_))
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match &self.data {
            DocumentData::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match &mut self.data {
            DocumentData::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_comment(self) -> Option<Comment> {
        match self.data {
            DocumentData::Comment(c) => Some(c),
            _ => None,
        }
    }
}

/// A document that is yet to be stored in the repository
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewDocument {
    pub id: DocId,
    pub parent_path: DocPath,
    pub name: String,
    pub data: DocumentData,
}

impl NewDocument {
    /// Comments keep the id they were built with, other documents get a fresh one
    pub fn new(parent_path: DocPath, name: impl Into<String>, data: DocumentData) -> NewDocument {
        let id = match &data {
            DocumentData::Comment(c) => c.id,
            _ => DocId::new(),
        };
        NewDocument {
            id,
            parent_path,
            name: name.into(),
            data,
        }
    }

    pub fn path(&self) -> DocPath {
        self.parent_path.join(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_normalized() {
        assert_eq!(DocPath::parse("").as_str(), "/");
        assert_eq!(DocPath::parse("//").as_str(), "/");
        assert_eq!(DocPath::parse("domain//ws/").as_str(), "/domain/ws");
        assert_eq!(DocPath::parse("/domain/ws/doc").segment_count(), 3);
        assert_eq!(DocPath::root().segment_count(), 0);
    }

    #[test]
    fn path_navigation() {
        let p = DocPath::parse("/domain/ws/doc");
        assert_eq!(p.name(), Some("doc"));
        assert_eq!(p.parent(), Some(DocPath::parse("/domain/ws")));
        assert_eq!(DocPath::parse("/domain").parent(), Some(DocPath::root()));
        assert_eq!(DocPath::root().parent(), None);
        assert_eq!(DocPath::root().join("Comments").as_str(), "/Comments");
        assert_eq!(p.join("child").as_str(), "/domain/ws/doc/child");
        assert!(p.starts_with(&DocPath::parse("/domain")));
        assert!(p.starts_with(&p));
        assert!(!DocPath::parse("/domains/x").starts_with(&DocPath::parse("/domain")));
    }
}
