//! Article response types.

use serde::{Deserialize, Serialize};

/// Response returned after an article was created.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCreated {
    pub message: String,
    pub detail: String,
}
