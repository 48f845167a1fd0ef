use crate::core::error::{AppError, Result};
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::models::Category;

/// Identifies one listing request so that late responses can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// Page-local category collection.
///
/// Replaced wholesale on every successful load. A failed load keeps the
/// previous collection and records the error for display.
#[derive(Debug, Clone, Default)]
pub struct CategoryListing {
    categories: Vec<Category>,
    loading: bool,
    error: Option<AppError>,
    generation: u64,
}

impl CategoryListing {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            ..Default::default()
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// Start a load. Any load begun earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadToken {
        self.generation += 1;
        self.loading = true;
        LoadToken(self.generation)
    }

    /// Apply a load result. Returns `false` if the token was stale and the
    /// result was discarded.
    pub fn finish_load(&mut self, token: LoadToken, result: Result<Vec<Category>>) -> bool {
        if token.0 != self.generation {
            tracing::debug!(
                "Discarding stale category listing (generation {} < {})",
                token.0,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(categories) => {
                self.categories = categories;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Category listing failed: {}", e);
                self.error = Some(e);
            }
        }
        true
    }

    /// Fetch the full listing and apply it.
    pub async fn reload(&mut self, api: &dyn CategoryApi) -> Result<()> {
        let token = self.begin_load();
        let result = api.list_categories().await;
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.clone());
        self.finish_load(token, result);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{catalog, category, InMemoryCategoryApi};

    #[test]
    fn test_success_replaces_collection() {
        let mut listing = CategoryListing::new(vec![category("9", "Staré", None)]);

        let token = listing.begin_load();
        assert!(listing.is_loading());
        assert!(listing.finish_load(token, Ok(catalog())));

        assert!(!listing.is_loading());
        assert_eq!(listing.categories().len(), 5);
        assert!(listing.error().is_none());
    }

    #[test]
    fn test_error_keeps_previous_collection() {
        let mut listing = CategoryListing::new(catalog());

        let token = listing.begin_load();
        listing.finish_load(token, Err(AppError::Network("refused".to_string())));

        assert_eq!(listing.categories().len(), 5);
        assert!(matches!(listing.error(), Some(AppError::Network(_))));
        assert!(!listing.is_loading());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut listing = CategoryListing::default();

        let first = listing.begin_load();
        let second = listing.begin_load();

        assert!(listing.finish_load(second, Ok(catalog())));
        assert!(!listing.finish_load(first, Ok(vec![])));
        assert_eq!(listing.categories().len(), 5);
    }

    #[test]
    fn test_next_success_clears_error() {
        let mut listing = CategoryListing::default();

        let token = listing.begin_load();
        listing.finish_load(token, Err(AppError::Backend(None)));
        let token = listing.begin_load();
        listing.finish_load(token, Ok(catalog()));

        assert!(listing.error().is_none());
    }

    #[tokio::test]
    async fn test_reload_from_api() {
        let api = InMemoryCategoryApi::with(catalog());
        let mut listing = CategoryListing::default();

        listing.reload(&api).await.unwrap();
        assert_eq!(listing.categories().len(), 5);

        api.fail_next(AppError::Network("timeout".to_string()));
        assert!(listing.reload(&api).await.is_err());
        assert_eq!(listing.categories().len(), 5);
    }
}
