mod actor;
mod comment;
mod db;
mod document;
mod error;
mod event;
mod feature;
mod query;
mod user;

pub use actor::{Actor, Elevation};
pub use comment::{Comment, CommentPatch, ExternalOrigin, NewComment};
pub use db::{EventNotifier, Query, Repository, Security};
pub use document::{DocId, DocPath, Document, DocumentData, NewDocument};
pub use error::{Error, Operation, Target};
pub use event::{CommentEvent, CommentEventKind};
pub use feature::Feature;
pub use query::{NamedQuery, Page, PageRequest, SortField, SortInfo};
pub use user::{Permission, Principal};

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

// Strings end up in whatever storage backs the Repository, and some of them
// (eg. postgres) reject null bytes, so refuse them as early as possible.
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
