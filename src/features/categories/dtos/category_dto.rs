use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::models::Category;
use crate::features::categories::tree::{CategoryTreeNode, FlatCategory};

/// Category as listed in the admin table and the flat storefront listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FlatCategoryDto {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub product_count: u64,
    pub depth: usize,
    pub path: String,
    /// Name indented by depth, ready for display
    pub label: String,
}

impl From<FlatCategory> for FlatCategoryDto {
    fn from(entry: FlatCategory) -> Self {
        let label = entry.label();
        let c = entry.category;
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            product_count: c.product_count,
            depth: entry.depth,
            path: entry.path,
            label,
        }
    }
}

/// Either shape returned by the category listing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryListDto {
    Flat(Vec<FlatCategoryDto>),
    Tree(Vec<CategoryTreeNode>),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BreadcrumbDto {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for BreadcrumbDto {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

/// Single category with its position in the hierarchy
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryDetailDto {
    pub category: Category,
    /// Root first, ending with the category itself
    pub breadcrumbs: Vec<BreadcrumbDto>,
    pub children: Vec<BreadcrumbDto>,
}

/// One entry of the parent selector
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParentOptionDto {
    pub id: String,
    pub label: String,
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlugPreviewDto {
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteAllDto {
    pub count: u64,
}

/// Query params for listing categories
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParentOptionsQuery {
    /// Category being edited; omit when creating
    pub editing_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugPreviewQuery {
    #[serde(default)]
    pub name: String,
}

/// Request DTO for creating or updating a category
///
/// On create, omitted fields are empty and a missing `slug` is derived from
/// `name`. On update, omitted fields keep their current value while an
/// explicit `null` clears them; `parent_id: null` moves the category to the
/// root.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryFormDto {
    #[validate(length(max = 255, message = "Name must not exceed 255 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Slug must not exceed 255 characters"))]
    #[serde(default)]
    pub slug: Option<String>,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<Option<String>>,

    #[validate(length(max = 64, message = "Icon must not exceed 64 characters"))]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>)]
    pub icon: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_dto_tells_omitted_from_null() {
        let dto: CategoryFormDto =
            serde_json::from_value(json!({ "name": "TV", "parent_id": null })).unwrap();

        assert_eq!(dto.parent_id, Some(None));
        assert_eq!(dto.description, None);
        assert_eq!(dto.icon, None);
    }

    #[test]
    fn test_form_dto_value_is_double_some() {
        let dto: CategoryFormDto =
            serde_json::from_value(json!({ "name": "TV", "icon": "tv", "parent_id": "1" }))
                .unwrap();

        assert_eq!(dto.icon, Some(Some("tv".to_string())));
        assert_eq!(dto.parent_id, Some(Some("1".to_string())));
    }

    #[test]
    fn test_form_dto_length_checked_when_present() {
        let dto = CategoryFormDto {
            name: "TV".to_string(),
            slug: None,
            description: None,
            parent_id: None,
            icon: Some(Some("x".repeat(65))),
        };

        assert!(dto.validate().is_err());
    }
}
