mod json_file;
pub mod media;
mod sheets;

pub use json_file::JsonFileStore;
pub use sheets::SheetsStore;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::error::ImportError;
use crate::model::Recipe;

/// Durable backend for recipe records.
///
/// The store exclusively owns the persisted set; everything else holds
/// transient copies. The only field that ever changes after a save is the
/// image, so the contract exposes that one typed update.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Recipe>, ImportError>;
    async fn append(&self, recipe: &Recipe) -> Result<(), ImportError>;
    async fn update_image(&self, id: &str, image: &str) -> Result<(), ImportError>;
    /// Remove the record and its locally mirrored thumbnail (if any).
    async fn delete(&self, id: &str) -> Result<(), ImportError>;
}

impl std::fmt::Debug for dyn RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecipeStore")
    }
}

/// Build the configured backend.
pub fn open(config: &StoreConfig) -> Result<Box<dyn RecipeStore>, ImportError> {
    match config.backend.as_str() {
        "json" => Ok(Box::new(JsonFileStore::new(config))),
        "sheets" => Ok(Box::new(SheetsStore::new(config)?)),
        other => Err(ImportError::Store(format!(
            "Unknown store backend: {other}"
        ))),
    }
}
