use utoipa::{Modify, OpenApi};

use crate::features::categories::tree::CategoryTreeNode;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::categories::Category;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories (storefront)
        categories_handlers::list_categories,
        categories_handlers::get_category,
        // Categories (admin)
        categories_handlers::parent_options,
        categories_handlers::preview_slug,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::delete_all_categories,
    ),
    components(
        schemas(
            Meta,
            Category,
            CategoryTreeNode,
            categories_dtos::FlatCategoryDto,
            categories_dtos::CategoryListDto,
            categories_dtos::BreadcrumbDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::ParentOptionDto,
            categories_dtos::SlugPreviewDto,
            categories_dtos::DeleteAllDto,
            categories_dtos::CategoryFormDto,
            ApiResponse<categories_dtos::CategoryListDto>,
            ApiResponse<categories_dtos::CategoryDetailDto>,
            ApiResponse<Vec<categories_dtos::ParentOptionDto>>,
            ApiResponse<categories_dtos::SlugPreviewDto>,
            ApiResponse<categories_dtos::DeleteAllDto>,
            ApiResponse<Category>,
        )
    ),
    tags(
        (name = "categories", description = "Marketplace categories (public)"),
        (name = "admin-categories", description = "Category administration"),
    ),
    info(
        title = "Marketplace Admin API",
        version = "0.1.0",
        description = "Category administration for the marketplace",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
