// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cross-cutting backend middleware.

pub mod session_guard;

pub use session_guard::SessionGuard;
