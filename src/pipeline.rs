use std::path::Path;

use log::{info, warn};

use crate::ai::RecipeModel;
use crate::error::ImportError;
use crate::fetcher::{FetchOutcome, VideoSource};
use crate::model::RecipeDraft;

/// Result of a successful extraction, tagged with the branch that produced
/// it. Both branches carry the same draft contract.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// The recipe was extracted from the downloaded video
    Video {
        draft: RecipeDraft,
        title: String,
        thumbnail: Option<String>,
    },
    /// The recipe was inferred from page text after a blocked download
    TextOnly {
        draft: RecipeDraft,
        thumbnail: Option<String>,
    },
}

impl Extraction {
    pub fn draft(&self) -> &RecipeDraft {
        match self {
            Extraction::Video { draft, .. } | Extraction::TextOnly { draft, .. } => draft,
        }
    }

    pub fn thumbnail(&self) -> Option<&str> {
        match self {
            Extraction::Video { thumbnail, .. } | Extraction::TextOnly { thumbnail, .. } => {
                thumbnail.as_deref()
            }
        }
    }
}

/// The download → describe → extract sequence.
///
/// Dispatches on the fetch outcome: media goes down the video-grounded
/// branch, scraped page text down the text-only branch, and a blocked fetch
/// terminates before the model is ever invoked.
pub struct ExtractionPipeline<'a> {
    fetcher: &'a dyn VideoSource,
    model: &'a dyn RecipeModel,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(fetcher: &'a dyn VideoSource, model: &'a dyn RecipeModel) -> Self {
        ExtractionPipeline { fetcher, model }
    }

    pub async fn extract(&self, url: &str) -> Result<Extraction, ImportError> {
        match self.fetcher.fetch(url).await {
            FetchOutcome::Media {
                path,
                title,
                thumbnail,
            } => {
                info!("Video retrieved for {}, analysing media", url);
                let result = self.model.recipe_from_video(&path, &title).await;
                remove_temp_file(&path).await;
                Ok(Extraction::Video {
                    draft: result?,
                    title,
                    thumbnail,
                })
            }
            FetchOutcome::MetadataOnly {
                title,
                description,
                thumbnail,
            } => {
                let text = combine(&title, &description);
                if text.is_empty() {
                    return Err(ImportError::Blocked(
                        "page metadata is empty".to_string(),
                    ));
                }
                info!("Download blocked for {}, falling back to page text", url);
                let draft = self.model.recipe_from_text(&text).await?;
                Ok(Extraction::TextOnly { draft, thumbnail })
            }
            FetchOutcome::Blocked { reason } => Err(ImportError::Blocked(reason)),
        }
    }
}

fn combine(title: &str, description: &str) -> String {
    match (title.trim(), description.trim()) {
        (title, "") => title.to_string(),
        ("", description) => description.to_string(),
        (title, description) => format!("{title}\n{description}"),
    }
}

async fn remove_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}
