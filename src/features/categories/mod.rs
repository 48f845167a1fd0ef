//! Marketplace category administration.
//!
//! Categories live in the external backend; this feature reads the flat
//! listing, turns it into an indented tree and drives the create/edit form
//! against the backend's admin endpoints.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | Flat indented list, or tree with `?tree=true` |
//! | GET | `/api/categories/{slug}` | Category with breadcrumbs |
//! | GET | `/api/admin/categories/_/parent-options` | Legal parents for the form |
//! | GET | `/api/admin/categories/_/slug` | Slug derived from `?name=` |
//! | POST | `/api/admin/categories` | Create category |
//! | PUT | `/api/admin/categories/{id}` | Update category |
//! | DELETE | `/api/admin/categories/{id}` | Delete category (children become roots) |
//! | DELETE | `/api/admin/categories` | Delete every category |

pub mod clients;
pub mod dtos;
pub mod form;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod routes;
pub mod services;
pub mod slug;
pub mod tree;

pub use clients::{BackendCategoryClient, CategoryApi, CategoryPayload};
pub use models::Category;
pub use services::CategoryService;
pub use slug::derive_slug;
