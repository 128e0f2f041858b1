//! Threaded comments on top of a document repository
//!
//! Comments are documents pointing to their parent (another comment or the
//! commented content item) through a property. All permission checks are
//! made against the thread root, ie. the nearest ancestor that is not a
//! comment.

mod ancestor;
mod config;
mod container;
mod error;
mod gate;
mod manager;

#[cfg(test)]
mod fuzz;

pub use ancestor::{ancestor_ids_for, AncestorResolver};
pub use config::Config;
pub use container::{container_path, ContainerPathResolver, ContainerRef};
pub use error::Error;
pub use gate::PermissionGate;
pub use manager::{CommentManager, SUPPORTED_FEATURES};
