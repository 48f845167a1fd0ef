use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryFormDto, CategoryListDto, DeleteAllDto, FlatCategoryDto,
    ListCategoriesQuery, ParentOptionDto, ParentOptionsQuery, SlugPreviewDto, SlugPreviewQuery,
};
use crate::features::categories::models::Category;
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};

/// List all categories
///
/// Returns categories as an indented pre-order list or as a tree, based on
/// the `tree` query param.
#[utoipa::path(
    get,
    path = "/api/categories",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<CategoryListDto>),
        (status = 502, description = "Backend unreachable")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<CategoryListDto>>> {
    let (data, total) = if query.tree {
        let tree = service.list_tree().await?;
        let total = tree.len();
        (CategoryListDto::Tree(tree), total)
    } else {
        let categories = service.list().await?;
        let total = categories.len();
        (CategoryListDto::Flat(categories), total)
    };

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta {
            total: total as i64,
        }),
    )))
}

/// Get category by slug
#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryDetailDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    let category = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Categories that may be chosen as parent
///
/// Pass `editing_id` when editing so that the category and its descendants
/// are left out.
#[utoipa::path(
    get,
    path = "/api/admin/categories/_/parent-options",
    params(ParentOptionsQuery),
    responses(
        (status = 200, description = "Parent options in display order", body = ApiResponse<Vec<ParentOptionDto>>),
    ),
    tag = "admin-categories"
)]
pub async fn parent_options(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<ParentOptionsQuery>,
) -> Result<Json<ApiResponse<Vec<ParentOptionDto>>>> {
    let options = service.parent_options(query.editing_id.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(options), None, None)))
}

/// Slug that would be derived from a name
#[utoipa::path(
    get,
    path = "/api/admin/categories/_/slug",
    params(SlugPreviewQuery),
    responses(
        (status = 200, description = "Derived slug, empty if nothing usable remains", body = ApiResponse<SlugPreviewDto>),
    ),
    tag = "admin-categories"
)]
pub async fn preview_slug(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<SlugPreviewQuery>,
) -> Json<ApiResponse<SlugPreviewDto>> {
    Json(ApiResponse::success(
        Some(service.preview_slug(&query.name)),
        None,
        None,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryFormDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Validation error"),
        (status = 422, description = "Rejected by backend")
    ),
    tag = "admin-categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CategoryFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    request_body = CategoryFormDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Rejected by backend")
    ),
    tag = "admin-categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<CategoryFormDto>,
) -> Result<Json<ApiResponse<Category>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.update(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated successfully".to_string()),
        None,
    )))
}

/// Delete a category
///
/// Children are not removed; they move to the root level.
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 422, description = "Rejected by backend")
    ),
    tag = "admin-categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "All categories deleted", body = ApiResponse<DeleteAllDto>),
    ),
    tag = "admin-categories"
)]
pub async fn delete_all_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<DeleteAllDto>>> {
    let count = service.delete_all().await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteAllDto { count }),
        Some(format!("Deleted {} categories", count)),
        None,
    )))
}
