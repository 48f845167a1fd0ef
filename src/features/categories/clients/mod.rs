mod backend;

pub use backend::{BackendCategoryClient, CategoryApi, CategoryPayload};
