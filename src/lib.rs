pub mod ai;
pub mod cli;
pub mod coach;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod ingredient;
pub mod model;
pub mod pipeline;
pub mod store;

pub use ai::{GeminiClient, RecipeModel};
pub use config::AppConfig;
pub use error::ImportError;
pub use fetcher::{FetchOutcome, VideoFetcher, VideoSource};
pub use model::{Recipe, RecipeDraft};
pub use pipeline::{Extraction, ExtractionPipeline};
pub use store::{JsonFileStore, RecipeStore, SheetsStore};

use std::path::Path;

/// Run the full import pipeline for one URL with the default fetcher and
/// model built from configuration.
pub async fn import_recipe(url: &str, config: &AppConfig) -> Result<Extraction, ImportError> {
    let fetcher = VideoFetcher::new(&config.download).await?;
    let model = GeminiClient::new(config)?;
    ExtractionPipeline::new(&fetcher, &model)
        .extract(url)
        .await
}

/// Persist an extracted draft: assign the record id, mirror the thumbnail
/// next to the store, fall back to a generated dish photo when there is no
/// thumbnail at all, and append.
pub async fn save_recipe(
    store: &dyn RecipeStore,
    media_dir: &Path,
    draft: RecipeDraft,
    url: &str,
    thumbnail: Option<&str>,
) -> Result<Recipe, ImportError> {
    let mut recipe = Recipe::from_draft(draft, url, None);

    let mirrored = store::media::mirror_image(thumbnail, media_dir, &recipe.id).await;
    recipe.image = mirrored
        .or_else(|| thumbnail.map(String::from))
        .or_else(|| Some(store::media::generated_image_url(&recipe.name)));

    store.append(&recipe).await?;
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_recipe_falls_back_to_generated_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::at(dir.path().join("db.json"), dir.path().join("media"));

        let draft = RecipeDraft {
            name: "Tarte".to_string(),
            ..Default::default()
        };
        let saved = save_recipe(
            &store,
            &dir.path().join("media"),
            draft,
            "https://example.com/v/1",
            None,
        )
        .await
        .unwrap();

        let image = saved.image.unwrap();
        assert!(store::media::is_generated(&image));

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Tarte");
    }

    #[tokio::test]
    async fn test_save_recipe_keeps_remote_url_when_mirror_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::at(dir.path().join("db.json"), dir.path().join("media"));

        // Unreachable host: mirroring fails, the URL is kept as-is
        let saved = save_recipe(
            &store,
            &dir.path().join("media"),
            RecipeDraft::default(),
            "https://example.com/v/2",
            Some("http://127.0.0.1:1/thumb.jpg"),
        )
        .await
        .unwrap();

        assert_eq!(saved.image.as_deref(), Some("http://127.0.0.1:1/thumb.jpg"));
    }
}
