use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Client-side projection of a category owned by the backend.
///
/// Only `id` and `parent_id` carry structure; `depth` and `path` as sent by
/// the backend are informational, the tree model recomputes both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Read-only, computed by the backend. Never touched here.
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub path: Option<String>,
}
