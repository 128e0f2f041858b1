use std::fmt;

/// Comment storage strategies a comment manager may implement
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Feature {
    /// Comments point to their parent through a parent id property
    CommentsLinkedWithProperty,

    /// Comments are linked to what they comment on through relations
    CommentsLinkedWithRelation,

    /// Comments are stored as children of what they comment on
    CommentsAreSpecialChildren,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Feature::CommentsLinkedWithProperty => "comments linked with property",
            Feature::CommentsLinkedWithRelation => "comments linked with relation",
            Feature::CommentsAreSpecialChildren => "comments are special children",
        })
    }
}
