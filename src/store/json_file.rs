use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::warn;

use crate::config::StoreConfig;
use crate::error::ImportError;
use crate::model::Recipe;
use crate::store::{media, RecipeStore};

/// Store backed by a single JSON array file.
///
/// Reads are forgiving: a missing or corrupt file yields an empty library
/// (logged) instead of an error, so a damaged database never bricks the app.
/// Writes replace the file atomically through a temp file + rename.
pub struct JsonFileStore {
    path: PathBuf,
    media_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self::at(&config.db_file, &config.media_dir)
    }

    pub fn at(path: impl AsRef<Path>, media_dir: impl AsRef<Path>) -> Self {
        JsonFileStore {
            path: path.as_ref().to_path_buf(),
            media_dir: media_dir.as_ref().to_path_buf(),
        }
    }

    async fn read_all(&self) -> Vec<Recipe> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not read {}: {}", self.path.display(), e);
                }
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(recipes) => recipes,
            Err(e) => {
                warn!("Corrupt database {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    async fn write_all(&self, recipes: &[Recipe]) -> Result<(), ImportError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let payload = serde_json::to_string_pretty(recipes)?;
        let temp = self.path.with_extension("tmp");
        tokio::fs::write(&temp, payload).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Recipe>, ImportError> {
        Ok(self.read_all().await)
    }

    async fn append(&self, recipe: &Recipe) -> Result<(), ImportError> {
        let mut recipes = self.read_all().await;
        recipes.push(recipe.clone());
        self.write_all(&recipes).await
    }

    async fn update_image(&self, id: &str, image: &str) -> Result<(), ImportError> {
        let mut recipes = self.read_all().await;
        let recipe = recipes
            .iter_mut()
            .find(|recipe| recipe.id == id)
            .ok_or_else(|| ImportError::NotFound(id.to_string()))?;
        recipe.image = Some(image.to_string());
        self.write_all(&recipes).await
    }

    async fn delete(&self, id: &str) -> Result<(), ImportError> {
        let mut recipes = self.read_all().await;
        let before = recipes.len();
        recipes.retain(|recipe| recipe.id != id);
        if recipes.len() == before {
            return Err(ImportError::NotFound(id.to_string()));
        }
        self.write_all(&recipes).await?;

        media::remove_mirrored(&self.media_dir, id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecipeDraft;

    fn store_in(dir: &Path) -> JsonFileStore {
        JsonFileStore::at(dir.join("database.json"), dir.join("media"))
    }

    fn sample(id: &str, name: &str) -> Recipe {
        Recipe::with_id(
            RecipeDraft {
                name: name.to_string(),
                ingredients: vec!["2 oeufs".to_string()],
                steps: vec!["cuire".to_string()],
                ..Default::default()
            },
            "https://example.com/v/1",
            None,
            id.to_string(),
            "01/01/2024".to_string(),
        )
    }

    #[tokio::test]
    async fn test_missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("database.json"), "{not json]").unwrap();
        let store = store_in(dir.path());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_list_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let recipe = sample("20240101_120000", "Omelette");
        store.append(&recipe).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![recipe]);
    }

    #[tokio::test]
    async fn test_legacy_entries_backfilled_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("database.json"),
            r#"[{
                "id": "20230101_000000",
                "date": "01/01/2023",
                "nom": "Vieux gratin",
                "temps": "40 min",
                "url": "https://example.com/v/old",
                "ingredients": [],
                "etapes": []
            }]"#,
        )
        .unwrap();

        let store = store_in(dir.path());
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].tags.is_empty());
        assert_eq!(listed[0].score, 50);
        assert_eq!(listed[0].portion, "Non spécifié");
    }

    #[tokio::test]
    async fn test_update_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.append(&sample("20240101_120000", "Tarte")).await.unwrap();

        store
            .update_image("20240101_120000", "media/new.jpg")
            .await
            .unwrap();
        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].image.as_deref(), Some("media/new.jpg"));

        let err = store.update_image("nope", "x").await.unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_mirrored_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let kept = sample("20240101_120000", "Gardée");
        let removed = sample("20240202_120000", "Supprimée");
        store.append(&kept).await.unwrap();
        store.append(&removed).await.unwrap();

        // Mirrored image for the record being deleted, plus one belonging
        // to the surviving record
        let media_dir = dir.path().join("media");
        std::fs::create_dir_all(&media_dir).unwrap();
        let removed_img = media_dir.join("20240202_120000.jpg");
        let kept_img = media_dir.join("20240101_120000.jpg");
        std::fs::write(&removed_img, b"img").unwrap();
        std::fs::write(&kept_img, b"img").unwrap();

        store.delete("20240202_120000").await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "20240101_120000");
        assert!(!removed_img.exists());
        assert!(kept_img.exists());
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.delete("missing").await.unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.append(&sample("20240101_120000", "A")).await.unwrap();
        assert!(!dir.path().join("database.tmp").exists());
    }
}
