//! Request payloads for the portal API.
//!
//! # Design
//! The mock server defines its own copy of these shapes; integration tests
//! catch drift between the two.

use serde::{Deserialize, Serialize};

/// Body of `POST /user/auth/reset-password/request/email`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordResetRequest {
    pub email: String,
}
