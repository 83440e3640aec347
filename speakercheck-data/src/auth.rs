use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{DataError, Result};
use crate::model::User;

pub use bcrypt::DEFAULT_COST;

/// Hash a password using bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Verify a password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Generate a new bearer token.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// SHA-256 hex digest of a bearer token. Only the digest is stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Operations subject to role checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewPages,
    CreatePage,
    UpdatePage,
    DeletePage,
    ViewSpeakers,
    CreateSpeaker,
    UpdateSpeaker,
    DeleteSpeaker,
    UpdateAvailability,
}

impl Action {
    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            Action::CreatePage
                | Action::UpdatePage
                | Action::DeletePage
                | Action::CreateSpeaker
                | Action::UpdateSpeaker
                | Action::DeleteSpeaker
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::ViewPages => "view pages",
            Action::CreatePage => "create pages",
            Action::UpdatePage => "update pages",
            Action::DeletePage => "delete pages",
            Action::ViewSpeakers => "view speakers",
            Action::CreateSpeaker => "create speakers",
            Action::UpdateSpeaker => "update speakers",
            Action::DeleteSpeaker => "delete speakers",
            Action::UpdateAvailability => "update availability",
        };
        write!(f, "{}", s)
    }
}

/// Check that `user` may perform `action`.
pub fn authorize(user: &User, action: Action) -> Result<()> {
    if action.requires_admin() && !user.is_admin() {
        return Err(DataError::Forbidden(action.to_string()));
    }
    Ok(())
}
