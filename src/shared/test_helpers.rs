use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::features::categories::{derive_slug, Category, CategoryApi, CategoryPayload};

pub fn category(id: &str, name: &str, parent_id: Option<&str>) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: derive_slug(name),
        parent_id: parent_id.map(String::from),
        description: None,
        icon: None,
        product_count: 0,
        depth: None,
        path: None,
    }
}

/// A small catalog shaped like the storefront's top navigation.
pub fn catalog() -> Vec<Category> {
    vec![
        category("1", "Elektronika", None),
        category("2", "Notebooky & PC", Some("1")),
        category("3", "Šport a Voľný čas", None),
        category("4", "Herné notebooky", Some("2")),
        category("5", "Bicykle", Some("3")),
    ]
}

/// Backend stand-in holding categories in memory.
#[derive(Default)]
pub struct InMemoryCategoryApi {
    categories: Mutex<Vec<Category>>,
    next_error: Mutex<Option<AppError>>,
    next_id: Mutex<u64>,
    mutations: Mutex<usize>,
    listing_down: Mutex<bool>,
}

impl InMemoryCategoryApi {
    pub fn with(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    /// The next call of any operation fails with `error`.
    pub fn fail_next(&self, error: AppError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Every listing call fails until switched back.
    pub fn set_listing_down(&self, down: bool) {
        *self.listing_down.lock().unwrap() = down;
    }

    pub fn snapshot(&self) -> Vec<Category> {
        self.categories.lock().unwrap().clone()
    }

    /// Number of create, update and delete calls that reached the backend.
    pub fn mutations(&self) -> usize {
        *self.mutations.lock().unwrap()
    }

    fn check(&self) -> Result<()> {
        match self.next_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_mutation(&self) -> Result<()> {
        *self.mutations.lock().unwrap() += 1;
        self.check()
    }

    fn apply(target: &mut Category, payload: &CategoryPayload) {
        target.name = payload.name.clone();
        target.slug = payload.slug.clone();
        target.description = payload.description.clone();
        target.parent_id = payload.parent_id.clone();
        target.icon = payload.icon.clone();
    }
}

#[async_trait]
impl CategoryApi for InMemoryCategoryApi {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        if *self.listing_down.lock().unwrap() {
            return Err(AppError::Network("listing unavailable".to_string()));
        }
        self.check()?;
        Ok(self.snapshot())
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<String> {
        self.record_mutation()?;

        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.slug == payload.slug) {
            return Err(AppError::Backend(Some("Slug už existuje".to_string())));
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = next_id.to_string();

        let mut created = category(&id, &payload.name, None);
        Self::apply(&mut created, payload);
        categories.push(created);
        Ok(id)
    }

    async fn update_category(&self, id: &str, payload: &CategoryPayload) -> Result<()> {
        self.record_mutation()?;

        let mut categories = self.categories.lock().unwrap();
        let target = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::Backend(None))?;
        Self::apply(target, payload);
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        self.record_mutation()?;
        self.categories.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn delete_all_categories(&self) -> Result<u64> {
        self.record_mutation()?;
        let mut categories = self.categories.lock().unwrap();
        let count = categories.len() as u64;
        categories.clear();
        Ok(count)
    }
}
