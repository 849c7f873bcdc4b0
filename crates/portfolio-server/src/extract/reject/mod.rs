//! Enhanced request extractors with improved error handling and validation.
//!
//! These extractors are drop-in replacements for their standard Axum
//! counterparts. Rejections are rendered through the handler error type.

pub mod enhanced_json;
pub mod validated_json;

pub use self::enhanced_json::Json;
pub use self::validated_json::ValidateJson;
