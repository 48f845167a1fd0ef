//! Admin form for creating and editing a single category.
//!
//! The form is a small state machine driven by [`FormAction`]s:
//!
//! ```text
//! Closed --OpenCreate--> Creating --submit ok / Close--> Closed
//! Closed --OpenEdit----> Editing(id) --submit ok / Close--> Closed
//! Creating <--OpenCreate / OpenEdit--> Editing(id)
//! ```
//!
//! A failed submit leaves the form open with the draft intact and the error
//! message stored for inline display.

use crate::core::error::{AppError, Result};
use crate::features::categories::clients::{CategoryApi, CategoryPayload};
use crate::features::categories::listing::CategoryListing;
use crate::features::categories::models::Category;
use crate::features::categories::slug::derive_slug;
use crate::features::categories::tree::CategoryIndex;
use crate::shared::constants::{
    INVALID_PARENT_MESSAGE, NAME_REQUIRED_MESSAGE, SLUG_REQUIRED_MESSAGE,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Closed,
    Creating,
    Editing(String),
}

/// Field values as typed by the admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    /// `None` means "no parent" (root level).
    pub parent_id: Option<String>,
    pub icon: String,
}

impl CategoryDraft {
    fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone().unwrap_or_default(),
            parent_id: category.parent_id.clone(),
            icon: category.icon.clone().unwrap_or_default(),
        }
    }

    fn to_payload(&self) -> CategoryPayload {
        CategoryPayload {
            name: self.name.trim().to_string(),
            slug: self.slug.trim().to_string(),
            description: non_empty(&self.description),
            parent_id: self.parent_id.clone(),
            icon: non_empty(&self.icon),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    OpenCreate,
    OpenEdit(Category),
    Close,
    SetName(String),
    SetSlug(String),
    SetDescription(String),
    SetParent(Option<String>),
    SetIcon(String),
}

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    mode: FormMode,
    draft: CategoryDraft,
    slug_touched: bool,
    submitting: bool,
    error: Option<String>,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &CategoryDraft {
        &self.draft
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn slug_touched(&self) -> bool {
        self.slug_touched
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::OpenCreate => {
                self.reset(FormMode::Creating, CategoryDraft::default());
            }
            FormAction::OpenEdit(category) => {
                let draft = CategoryDraft::from_category(&category);
                self.reset(FormMode::Editing(category.id), draft);
                // An existing slug is never overwritten by name edits.
                self.slug_touched = true;
            }
            FormAction::Close => {
                self.reset(FormMode::Closed, CategoryDraft::default());
            }
            _ if !self.is_open() => {
                tracing::debug!("Ignoring {:?} on a closed category form", action);
            }
            FormAction::SetName(name) => {
                if !self.slug_touched {
                    self.draft.slug = derive_slug(&name);
                }
                self.draft.name = name;
            }
            FormAction::SetSlug(slug) => {
                self.draft.slug = slug;
                self.slug_touched = true;
            }
            FormAction::SetDescription(description) => self.draft.description = description,
            FormAction::SetParent(parent_id) => self.draft.parent_id = parent_id,
            FormAction::SetIcon(icon) => self.draft.icon = icon,
        }
    }

    fn reset(&mut self, mode: FormMode, draft: CategoryDraft) {
        self.mode = mode;
        self.draft = draft;
        self.slug_touched = false;
        self.submitting = false;
        self.error = None;
    }

    fn editing_id(&self) -> Result<Option<String>> {
        match &self.mode {
            FormMode::Closed => Err(AppError::BadRequest(
                "Category form is not open".to_string(),
            )),
            FormMode::Creating => Ok(None),
            FormMode::Editing(id) => Ok(Some(id.clone())),
        }
    }

    /// Checks that run before any request is sent.
    fn validate(&self, categories: &[Category], editing_id: Option<&str>) -> Result<()> {
        if self.draft.name.trim().is_empty() {
            return Err(AppError::Validation(NAME_REQUIRED_MESSAGE.to_string()));
        }
        if self.draft.slug.trim().is_empty() {
            return Err(AppError::Validation(SLUG_REQUIRED_MESSAGE.to_string()));
        }
        // Unknown parents are left for the backend to reject.
        if let (Some(parent_id), Some(editing_id)) = (self.draft.parent_id.as_deref(), editing_id)
        {
            let index = CategoryIndex::new(categories);
            if parent_id == editing_id || index.descendant_ids(editing_id).contains(parent_id) {
                return Err(AppError::Validation(INVALID_PARENT_MESSAGE.to_string()));
            }
        }
        Ok(())
    }

    /// Validate and send the draft, then reload the listing and close.
    ///
    /// Returns the saved category as it appears in the refreshed listing.
    /// On failure the draft is kept and the error is stored on the form.
    pub async fn submit(
        &mut self,
        listing: &mut CategoryListing,
        api: &dyn CategoryApi,
    ) -> Result<Category> {
        let editing_id = self.editing_id()?;

        if let Err(e) = self.validate(listing.categories(), editing_id.as_deref()) {
            self.error = Some(e.user_message());
            return Err(e);
        }

        let payload = self.draft.to_payload();
        self.submitting = true;
        self.error = None;

        let result = match &editing_id {
            None => api.create_category(&payload).await,
            Some(id) => api
                .update_category(id, &payload)
                .await
                .map(|_| id.clone()),
        };
        self.submitting = false;

        let id = match result {
            Ok(id) => id,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        // The mutation already went through, so a failed refresh only leaves
        // the listing stale.
        if let Err(e) = listing.reload(api).await {
            tracing::warn!("Category {} saved but listing refresh failed: {}", id, e);
        }

        let saved = listing
            .categories()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| Category {
                id,
                name: payload.name,
                slug: payload.slug,
                parent_id: payload.parent_id,
                description: payload.description,
                icon: payload.icon,
                product_count: 0,
                depth: None,
                path: None,
            });

        self.apply(FormAction::Close);
        Ok(saved)
    }
}
