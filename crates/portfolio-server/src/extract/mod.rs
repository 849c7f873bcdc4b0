//! Request extractors.
//!
//! - [`SecurityContext`], [`Authenticated`] and [`PendingAuthError`] read the
//!   identity established by the token authentication middleware.
//! - [`Json`] and [`ValidateJson`] deserialize (and validate) request bodies
//!   and turn every rejection into a JSON error response.

pub mod reject;
mod security_context;

pub use crate::extract::reject::{Json, ValidateJson};
pub use crate::extract::security_context::{Authenticated, PendingAuthError, SecurityContext};
