// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account records from the admin user-management endpoints.

use crate::policy::Role;
use serde::{Deserialize, Serialize};

/// Registered account as exposed by `GET /admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub role: Role,
    /// Department, set for officials at registration
    #[serde(default)]
    pub department: Option<String>,
}
