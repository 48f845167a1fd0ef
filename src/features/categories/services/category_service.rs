use std::collections::HashSet;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::dtos::{
    BreadcrumbDto, CategoryDetailDto, CategoryFormDto, FlatCategoryDto, ParentOptionDto,
    SlugPreviewDto,
};
use crate::features::categories::form::{CategoryForm, FormAction};
use crate::features::categories::listing::CategoryListing;
use crate::features::categories::models::Category;
use crate::features::categories::slug::derive_slug;
use crate::features::categories::tree::{
    build_tree, flatten_with_depth, legal_reparent_targets, CategoryIndex, CategoryTreeNode,
};

/// Service for category operations
///
/// Holds no state of its own. Every call starts from a fresh listing, the
/// backend stays the only source of truth.
pub struct CategoryService {
    api: Arc<dyn CategoryApi>,
}

impl CategoryService {
    pub fn new(api: Arc<dyn CategoryApi>) -> Self {
        Self { api }
    }

    async fn load(&self) -> Result<CategoryListing> {
        let mut listing = CategoryListing::default();
        listing.reload(self.api.as_ref()).await?;
        Ok(listing)
    }

    /// All categories in indented pre-order
    pub async fn list(&self) -> Result<Vec<FlatCategoryDto>> {
        let listing = self.load().await?;
        Ok(flatten_with_depth(listing.categories())
            .into_iter()
            .map(FlatCategoryDto::from)
            .collect())
    }

    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeNode>> {
        let listing = self.load().await?;
        Ok(build_tree(listing.categories()))
    }

    /// Get category by slug, with breadcrumbs and direct children
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryDetailDto> {
        let listing = self.load().await?;
        let index = CategoryIndex::new(listing.categories());

        let category = listing
            .categories()
            .iter()
            .find(|c| c.slug == slug)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))?;

        let breadcrumbs = index
            .ancestors(&category.id)
            .into_iter()
            .map(BreadcrumbDto::from)
            .collect();
        let children = index
            .children(&category.id)
            .map(BreadcrumbDto::from)
            .collect();

        Ok(CategoryDetailDto {
            category: category.clone(),
            breadcrumbs,
            children,
        })
    }

    /// Options for the parent selector, in display order.
    ///
    /// Excludes the edited category and its descendants. "No parent" is not
    /// part of the list.
    pub async fn parent_options(&self, editing_id: Option<&str>) -> Result<Vec<ParentOptionDto>> {
        let listing = self.load().await?;
        let legal: HashSet<&str> = legal_reparent_targets(listing.categories(), editing_id)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();

        Ok(flatten_with_depth(listing.categories())
            .into_iter()
            .filter(|entry| legal.contains(entry.category.id.as_str()))
            .map(|entry| ParentOptionDto {
                label: entry.label(),
                id: entry.category.id,
                depth: entry.depth,
            })
            .collect())
    }

    pub fn preview_slug(&self, name: &str) -> SlugPreviewDto {
        SlugPreviewDto {
            slug: derive_slug(name),
        }
    }

    /// Create mode validates nothing against the listing, so it is only
    /// fetched after the backend accepted the category.
    pub async fn create(&self, dto: CategoryFormDto) -> Result<Category> {
        let mut listing = CategoryListing::default();
        let mut form = CategoryForm::new();
        form.apply(FormAction::OpenCreate);
        Self::fill(&mut form, dto);

        form.submit(&mut listing, self.api.as_ref()).await
    }

    pub async fn update(&self, id: &str, dto: CategoryFormDto) -> Result<Category> {
        let mut listing = self.load().await?;
        let existing = listing
            .categories()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))?;

        let mut form = CategoryForm::new();
        form.apply(FormAction::OpenEdit(existing));
        Self::fill(&mut form, dto);

        form.submit(&mut listing, self.api.as_ref()).await
    }

    /// Delete one category. Its children are left in place and show up as
    /// roots on the next listing.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete_category(id).await
    }

    pub async fn delete_all(&self) -> Result<u64> {
        self.api.delete_all_categories().await
    }

    /// Apply the fields present in the request; omitted ones keep the
    /// value the form was opened with.
    fn fill(form: &mut CategoryForm, dto: CategoryFormDto) {
        form.apply(FormAction::SetName(dto.name));
        if let Some(slug) = dto.slug {
            form.apply(FormAction::SetSlug(slug));
        }
        if let Some(description) = dto.description {
            form.apply(FormAction::SetDescription(description.unwrap_or_default()));
        }
        if let Some(parent_id) = dto.parent_id {
            form.apply(FormAction::SetParent(parent_id));
        }
        if let Some(icon) = dto.icon {
            form.apply(FormAction::SetIcon(icon.unwrap_or_default()));
        }
    }
}
