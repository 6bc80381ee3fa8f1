//! Single-owner authorization for blog posts.
//!
//! Reads are public. Mutations are allowed only for the recorded owner, with
//! no administrative override. Callers must check that the resource exists
//! before asking, so a denial always refers to a real resource.

/// What the caller wants to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn is_mutation(self) -> bool {
        !matches!(self, Action::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether `requestor_id` may perform `action` on a resource owned by
/// `owner_id`. An anonymous requestor is `None`.
pub fn authorize(owner_id: &str, requestor_id: Option<&str>, action: Action) -> Decision {
    if !action.is_mutation() {
        return Decision::Allow;
    }

    match requestor_id {
        Some(requestor) if requestor == owner_id => Decision::Allow,
        _ => Decision::Deny,
    }
}
