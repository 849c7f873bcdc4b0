//! Response types for HTTP handlers.

mod articles;
mod authentications;
mod errors;

pub use articles::*;
pub use authentications::*;
pub use errors::*;
