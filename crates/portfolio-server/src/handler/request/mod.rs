//! Request types for HTTP handlers.

mod articles;
mod authentications;
mod validations;

pub use articles::*;
pub use authentications::*;
pub use validations::*;
