// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with the failure taxonomy shared by every component.

/// Client error type. Nothing here is fatal to the process: every variant
/// degrades to a user-visible notification plus a rollback to the last
/// known-good state.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Session token missing, expired, or refused by the backend (any 401).
    /// Forces a logout before surfacing to the presentation layer.
    #[error("Session expired, please sign in again")]
    AuthExpired,

    /// Bad credentials or an invalid registration. Recoverable, shown
    /// inline on the auth form.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// Status update invalid for the issue's current state or the caller's
    /// role. The registry is left unchanged.
    #[error("Status transition rejected: {0}")]
    TransitionRejected(String),

    /// Backend returned a record outside the expected shape. Logged and
    /// excluded from derived views rather than crashing them.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Draft failed client-side preconditions (empty title/description,
    /// out-of-range coordinates).
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    /// The action is not in the current role's permission table, or no
    /// role is available (unauthenticated).
    #[error("Not permitted: {0}")]
    Forbidden(String),

    /// Persistence collaborator failure (token/profile storage).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Any call failure not covered above: transport error, timeout,
    /// unexpected server status.
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// True for failures the user can retry without losing state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClientError::AuthExpired)
    }

    /// True when the error came from the backend refusing our credential.
    pub fn is_auth_expiry(&self) -> bool {
        matches!(self, ClientError::AuthExpired)
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
