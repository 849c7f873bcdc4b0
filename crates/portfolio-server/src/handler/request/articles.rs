//! Article request types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validations::validate_not_blank;
use crate::service::NewArticle;

/// Request payload to publish an article.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticle {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "Contents must be 1 to 1000 characters."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub contents: String,
}

impl CreateArticle {
    /// Converts this request into a store record written by `writer_id`.
    pub fn into_model(self, writer_id: Uuid) -> NewArticle {
        NewArticle {
            writer_id,
            title: self.title,
            contents: self.contents,
        }
    }
}
