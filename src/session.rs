// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single source of truth for "who is acting now".
//!
//! Owns the persisted token and the derived user identity. Restores on
//! startup, fails closed on anything suspect, and is the only component
//! allowed to set or clear the credential.

use crate::error::Result;
use crate::models::{Claims, UserProfile};
use crate::policy::Role;
use crate::storage::KeyValueStore;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Mutex;

/// Storage key for the opaque session token.
const TOKEN_KEY: &str = "token";
/// Storage key for the persisted user profile (JSON).
const USER_KEY: &str = "user";

/// Authenticated session state.
///
/// Invariant: the in-memory user is `Some` iff a persisted token exists
/// and was not expired when last checked. `is_authenticated` re-checks
/// both sides to guard against partial clearing.
pub struct Session {
    store: Box<dyn KeyValueStore>,
    user: Mutex<Option<UserProfile>>,
}

impl Session {
    /// Create an unauthenticated session over the given persistence
    /// collaborator. Call [`Session::restore`] to pick up a prior login.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            user: Mutex::new(None),
        }
    }

    /// Restore session state from persisted storage at startup.
    ///
    /// No token leaves the session unauthenticated. A token that fails to
    /// decode, or whose expiry is at or before the current time, fails
    /// closed: everything is cleared. Otherwise the user comes from the
    /// persisted profile when present, else is reconstructed from the
    /// token's claims (role defaulting to CITIZEN).
    pub fn restore(&self) -> Result<()> {
        let token = match self.store.get(TOKEN_KEY) {
            Some(t) => t,
            None => {
                *self.lock_user() = None;
                return Ok(());
            }
        };

        let claims = match decode_claims(&token) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid persisted token, clearing session");
                return self.logout();
            }
        };

        if is_expired(&claims) {
            tracing::info!("Persisted token expired, clearing session");
            return self.logout();
        }

        let profile = self
            .store
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok())
            .unwrap_or_else(|| claims.to_profile());

        tracing::info!(email = %profile.email, role = profile.role.as_str(), "Session restored");
        *self.lock_user() = Some(profile);
        Ok(())
    }

    /// Record a successful authentication exchange. Trusts the caller:
    /// no validation beyond persisting the pair.
    pub fn login(&self, token: &str, profile: UserProfile) -> Result<()> {
        self.store.set(TOKEN_KEY, token)?;
        let raw = serde_json::to_string(&profile)
            .map_err(|e| crate::error::ClientError::Storage(e.to_string()))?;
        self.store.set(USER_KEY, &raw)?;

        tracing::info!(email = %profile.email, role = profile.role.as_str(), "Signed in");
        *self.lock_user() = Some(profile);
        Ok(())
    }

    /// Clear the session: persisted token and profile plus the in-memory
    /// user. Triggered explicitly by the user or forced by any backend
    /// 401. The in-memory user is dropped first so a storage failure can
    /// never leave a usable half-session behind.
    pub fn logout(&self) -> Result<()> {
        *self.lock_user() = None;

        let token_res = self.store.remove(TOKEN_KEY);
        let user_res = self.store.remove(USER_KEY);
        token_res.and(user_res)
    }

    /// True iff both an in-memory user and a persisted token exist.
    pub fn is_authenticated(&self) -> bool {
        self.lock_user().is_some() && self.store.get(TOKEN_KEY).is_some()
    }

    /// Membership test against the current user's role; false when
    /// unauthenticated.
    pub fn has_role(&self, roles: &[Role]) -> bool {
        match self.lock_user().as_ref() {
            Some(user) => roles.contains(&user.role),
            None => false,
        }
    }

    /// Current user's role, if authenticated.
    pub fn role(&self) -> Option<Role> {
        self.lock_user().as_ref().map(|u| u.role)
    }

    /// Current user profile, if authenticated.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.lock_user().clone()
    }

    /// The persisted token, read fresh for every outbound call.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY)
    }

    fn lock_user(&self) -> std::sync::MutexGuard<'_, Option<UserProfile>> {
        self.user.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Decode the claims of a session JWT without verifying its signature.
///
/// The client has no signing secret; the backend is the verifier. Expiry
/// is checked separately by the caller so an expired token can be
/// distinguished from a malformed one.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| crate::error::ClientError::AuthRejected(format!("malformed token: {}", e)))?;

    Ok(data.claims)
}

/// Whether the claims carry an expiry at or before the current time.
/// Tokens without an `exp` claim are accepted.
fn is_expired(claims: &Claims) -> bool {
    match claims.exp {
        Some(exp) => exp <= chrono::Utc::now().timestamp(),
        None => false,
    }
}
