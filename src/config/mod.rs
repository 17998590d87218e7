//! Game configuration
//!
//! Loading, validation, and the built-in card catalog. A configuration
//! file is optional: every key falls back to the built-in defaults.

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoaderOptions};
pub use schema::{Catalog, ContextEntry, ContextId, GameConfig, ThemeEntry, ThemeId};
pub use validation::{ValidationResult, Validator};
