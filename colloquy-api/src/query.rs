use crate::DocId;

/// Queries the Query collaborator knows how to run, with their arguments
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum NamedQuery {
    /// Comments whose parent is the given document or comment
    CommentsForDocument(DocId),

    /// Comment synced from an outside system, by its correlation id
    CommentAsExternalEntity(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum SortField {
    CreationDate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SortInfo {
    pub field: SortField,
    pub ascending: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PageRequest {
    pub query: NamedQuery,
    pub sort: Option<SortInfo>,

    /// None means everything on a single page
    pub page_size: Option<u64>,
    pub page_index: u64,
}

impl PageRequest {
    pub fn single(query: NamedQuery) -> PageRequest {
        PageRequest {
            query,
            sort: None,
            page_size: Some(1),
            page_index: 0,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Number of results across all pages
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total_count: self.total_count,
        })
    }
}
