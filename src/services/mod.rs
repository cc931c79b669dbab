// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend collaborator and issue registry.

pub mod backend;
pub mod registry;

pub use backend::{Backend, HttpBackend, RegisterRequest};
pub use registry::{IssueRegistry, StatusCounts};
