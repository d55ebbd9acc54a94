use gatekeep_core::UserId;

/// Authenticated caller identity for a request.
///
/// Inserted by the identity middleware; roles and permissions are *not*
/// carried here — the guard resolves them from the store per decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
}

impl CallerContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
