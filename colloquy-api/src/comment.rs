use chrono::Utc;

use crate::{DocId, Error, Time};

/// Marks a comment whose authoritative copy lives in an outside system
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ExternalOrigin {
    /// Correlation id of the comment in the outside system
    #[serde(rename = "external_entity_id")]
    pub entity_id: String,

    /// Name of the outside system
    pub origin: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: DocId,

    /// Either another comment, or the content item this thread is attached to
    pub parent_id: DocId,

    /// Ids of the comments between the thread root and this comment, the
    /// top-level comment of the thread first
    pub ancestor_ids: Vec<DocId>,

    pub author: String,
    pub text: String,
    pub creation_date: Time,
    pub modification_date: Option<Time>,

    #[serde(flatten)]
    pub external: Option<ExternalOrigin>,
}

impl Comment {
    /// Merges `patch` into this comment, leaving the identity fields alone
    pub fn apply(&mut self, patch: CommentPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        self.modification_date = Some(patch.modification_date.unwrap_or_else(Utc::now));
        if let Some(external) = patch.external {
            self.external = Some(external);
        }
    }
}

/// Caller-provided contents of a comment to create
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    /// Defaults to the name of the principal creating the comment
    pub author: Option<String>,
    pub text: String,
    /// Defaults to the time of creation
    pub creation_date: Option<Time>,
    pub external: Option<ExternalOrigin>,
}

impl NewComment {
    pub fn new(text: impl Into<String>) -> NewComment {
        NewComment {
            text: text.into(),
            ..NewComment::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(author) = &self.author {
            crate::validate_string(author)?;
        }
        crate::validate_string(&self.text)?;
        validate_external(&self.external)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPatch {
    pub text: Option<String>,
    /// Defaults to the time of the update
    pub modification_date: Option<Time>,
    pub external: Option<ExternalOrigin>,
}

impl CommentPatch {
    pub fn text(text: impl Into<String>) -> CommentPatch {
        CommentPatch {
            text: Some(text.into()),
            ..CommentPatch::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(text) = &self.text {
            crate::validate_string(text)?;
        }
        validate_external(&self.external)
    }
}

fn validate_external(external: &Option<ExternalOrigin>) -> Result<(), Error> {
    match external {
        None => Ok(()),
        Some(e) => {
            crate::validate_string(&e.entity_id)?;
            crate::validate_string(&e.origin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment() -> Comment {
        Comment {
            id: DocId::new(),
            parent_id: DocId::new(),
            ancestor_ids: vec![DocId::new()],
            author: String::from("alice"),
            text: String::from("hi"),
            creation_date: Utc::now(),
            modification_date: None,
            external: None,
        }
    }

    #[test]
    fn apply_keeps_identity() {
        let before = comment();
        let mut after = before.clone();
        after.apply(CommentPatch::text("edited"));
        assert_eq!(after.id, before.id);
        assert_eq!(after.parent_id, before.parent_id);
        assert_eq!(after.ancestor_ids, before.ancestor_ids);
        assert_eq!(after.author, before.author);
        assert_eq!(after.text, "edited");
        assert!(after.modification_date.is_some());
    }

    #[test]
    fn apply_without_text_keeps_text() {
        let mut c = comment();
        let date = Utc::now();
        c.apply(CommentPatch {
            modification_date: Some(date),
            ..CommentPatch::default()
        });
        assert_eq!(c.text, "hi");
        assert_eq!(c.modification_date, Some(date));
    }

    #[test]
    fn external_origin_is_flattened() {
        let mut c = comment();
        c.external = Some(ExternalOrigin {
            entity_id: String::from("ext-1"),
            origin: String::from("tracker"),
        });
        let json = serde_json::to_value(&c).expect("serializing comment");
        assert_eq!(json["external_entity_id"], "ext-1");
        assert_eq!(json["origin"], "tracker");
        let back: Comment = serde_json::from_value(json).expect("deserializing comment");
        assert_eq!(back, c);

        let plain = comment();
        let json = serde_json::to_value(&plain).expect("serializing comment");
        assert!(json.get("external_entity_id").is_none());
        let back: Comment = serde_json::from_value(json).expect("deserializing comment");
        assert_eq!(back.external, None);
    }

    #[test]
    fn validation_catches_null_bytes() {
        assert!(NewComment::new("ok").validate().is_ok());
        assert!(NewComment::new("n\0pe").validate().is_err());
        assert!(CommentPatch::text("n\0pe").validate().is_err());
    }
}
