use crate::{Comment, DocId};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum CommentEventKind {
    CommentAdded,
    CommentRemoved,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentEvent {
    pub kind: CommentEventKind,

    /// Thread root for additions, former parent for removals
    pub source: DocId,

    pub comment: Comment,
}

impl CommentEvent {
    pub fn added(root: DocId, comment: Comment) -> CommentEvent {
        CommentEvent {
            kind: CommentEventKind::CommentAdded,
            source: root,
            comment,
        }
    }

    pub fn removed(parent: DocId, snapshot: Comment) -> CommentEvent {
        CommentEvent {
            kind: CommentEventKind::CommentRemoved,
            source: parent,
            comment: snapshot,
        }
    }
}
