use crate::Principal;

/// Scoped system authority, used to read through documents the requesting
/// principal could not read by itself
///
/// Authority is only ever lent out through [`Elevation::actor`], so the
/// borrow checker guarantees nothing can act as the system once the token
/// is dropped. Authorization decisions must never be taken with it.
#[derive(Debug)]
pub struct Elevation {
    on_behalf_of: String,
}

impl Elevation {
    pub fn acquire(principal: &Principal) -> Elevation {
        tracing::trace!(principal = %principal.name, "acquiring system elevation");
        Elevation {
            on_behalf_of: principal.name.clone(),
        }
    }

    pub fn on_behalf_of(&self) -> &str {
        &self.on_behalf_of
    }

    pub fn actor(&self) -> Actor<'_> {
        Actor::System(self)
    }
}

impl Drop for Elevation {
    fn drop(&mut self) {
        tracing::trace!(principal = %self.on_behalf_of, "releasing system elevation");
    }
}

/// Identity under which a collaborator call is performed
#[derive(Clone, Copy, Debug)]
pub enum Actor<'a> {
    Principal(&'a Principal),
    System(&'a Elevation),
}

impl<'a> Actor<'a> {
    /// Name of the principal on whose behalf the call happens, for logs
    pub fn name(&self) -> &'a str {
        match *self {
            Actor::Principal(p) => &p.name,
            Actor::System(e) => e.on_behalf_of(),
        }
    }
}
