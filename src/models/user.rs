//! User identity models: the persisted profile and JWT claims.

use crate::policy::Role;
use serde::{Deserialize, Serialize};

/// Authenticated user profile, persisted alongside the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub role: Role,
}

/// Claims embedded in the backend's session JWT.
///
/// The client never verifies the signature (the backend owns the secret);
/// it only reads the subject, role, and expiry to derive local state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Role claim; absent tokens default to CITIZEN
    #[serde(default)]
    pub role: Option<Role>,
    /// Expiration time (Unix timestamp); absent means no local expiry check
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// Minimal profile reconstructed from the token when no profile was
    /// persisted next to it.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            email: self.sub.clone(),
            role: self.role.unwrap_or(Role::Citizen),
        }
    }
}
