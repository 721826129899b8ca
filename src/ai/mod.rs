pub mod files;
mod gemini;
pub mod parse;
pub mod prompt;

pub use gemini::GeminiClient;

use std::path::Path;

use async_trait::async_trait;

use crate::error::ImportError;
use crate::model::RecipeDraft;

/// Recipe-extraction surface of the generative model.
///
/// The extraction pipeline only depends on this trait so tests can substitute
/// stubs (and count invocations) without touching the network.
#[async_trait]
pub trait RecipeModel: Send + Sync {
    /// Extract a recipe from a downloaded media file, using the video title
    /// as a hint.
    async fn recipe_from_video(
        &self,
        video: &Path,
        title_hint: &str,
    ) -> Result<RecipeDraft, ImportError>;

    /// Infer a plausible recipe from textual metadata alone.
    async fn recipe_from_text(&self, description: &str) -> Result<RecipeDraft, ImportError>;
}
