#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Principal {
    pub name: String,
    pub administrator: bool,
}

impl Principal {
    pub fn user(name: impl Into<String>) -> Principal {
        Principal {
            name: name.into(),
            administrator: false,
        }
    }

    pub fn admin(name: impl Into<String>) -> Principal {
        Principal {
            name: name.into(),
            administrator: true,
        }
    }

    /// Whether the comment was written by this principal
    pub fn is_author_of(&self, comment: &crate::Comment) -> bool {
        comment.author == self.name
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Permission {
    Read,

    /// Everything, including read
    FullControl,
}

impl Permission {
    /// Whether having been granted `self` is enough to be granted `wanted`
    pub fn implies(self, wanted: Permission) -> bool {
        match (self, wanted) {
            (Permission::FullControl, _) => true,
            (Permission::Read, Permission::Read) => true,
            (Permission::Read, Permission::FullControl) => false,
        }
    }
}
