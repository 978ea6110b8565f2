use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Row of the `post_categories` join table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostCategory {
    pub post_id: i64,
    pub category_id: Uuid,
}
