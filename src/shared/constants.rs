/// Message shown to the admin when a request never completed or the backend
/// failed without telling us why.
pub const GENERIC_ERROR_MESSAGE: &str = "Operácia zlyhala. Skúste to prosím znova.";

/// Shown when a category is submitted without a name.
pub const NAME_REQUIRED_MESSAGE: &str = "Názov kategórie je povinný.";

/// Shown when the slug could not be derived from the name and was not typed in.
pub const SLUG_REQUIRED_MESSAGE: &str = "Zadajte URL identifikátor (slug) kategórie.";

/// Shown when the chosen parent would make the category its own descendant.
pub const INVALID_PARENT_MESSAGE: &str =
    "Kategóriu nie je možné presunúť pod seba ani pod vlastnú podkategóriu.";

/// Prefix repeated once per depth level in indented category labels.
pub const INDENT_PREFIX: &str = "— ";

// =============================================================================
// BACKEND PATHS
// =============================================================================

pub const CATEGORIES_PATH: &str = "/categories";

pub const ADMIN_CATEGORIES_PATH: &str = "/admin/categories";
