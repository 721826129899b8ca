use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::ai::files;
use crate::ai::parse::parse_model_output;
use crate::ai::prompt::{self, ChefConstraint};
use crate::ai::RecipeModel;
use crate::config::{AppConfig, PollConfig};
use crate::error::ImportError;
use crate::model::{ProductVerdict, Proposal, RecipeDraft, WorkoutPlan};

/// Requests above this size go through the Files API instead of inline
/// base64 (the API caps the whole request at 20MB).
const INLINE_LIMIT_BYTES: u64 = 19 * 1024 * 1024;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    poll: PollConfig,
}

impl GeminiClient {
    /// Create a client from configuration, falling back to the
    /// GOOGLE_API_KEY environment variable for the key.
    pub fn new(config: &AppConfig) -> Result<Self, ImportError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or(ImportError::MissingApiKey)?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(GeminiClient {
            client,
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            poll: config.poll.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        GeminiClient {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 4096,
            poll: PollConfig::default(),
        }
    }

    /// One generation call; returns the text of the first candidate.
    async fn generate(&self, parts: Vec<Value>) -> Result<String, ImportError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{ "parts": parts }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens
                },
                // Cooking content (knives, alcohol, raw meat) trips the
                // default filters often enough to disable them outright.
                "safetySettings": [
                    { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
                    { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
                    { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE" },
                    { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE" }
                ]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::Api { status, body });
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ImportError::ModelOutput {
                message: "no text candidate in response".to_string(),
                raw: response_body.to_string(),
            })
    }

    /// Build the media part for a generation request, uploading through the
    /// Files API when the file is too large to inline. Returns the part and
    /// the remote file name to delete afterwards, if any.
    async fn media_part(&self, path: &Path) -> Result<(Value, Option<String>), ImportError> {
        let mime_type = mime_for(path);
        let size = tokio::fs::metadata(path).await?.len();

        if size <= INLINE_LIMIT_BYTES {
            let bytes = tokio::fs::read(path).await?;
            let part = json!({
                "inline_data": { "mime_type": mime_type, "data": STANDARD.encode(bytes) }
            });
            return Ok((part, None));
        }

        let uploaded = files::upload(&self.client, &self.base_url, &self.api_key, path, mime_type)
            .await?;
        let active = files::wait_until_active(
            &self.client,
            &self.base_url,
            &self.api_key,
            uploaded,
            &self.poll,
        )
        .await?;

        let part = json!({
            "file_data": { "file_uri": active.uri, "mime_type": mime_type }
        });
        Ok((part, Some(active.name)))
    }

    /// Propose recipes for a craving, optionally constrained and biased
    /// towards fridge contents.
    pub async fn chef_proposals(
        &self,
        craving: &str,
        fridge: Option<&str>,
        constraints: &[ChefConstraint],
        people: u32,
    ) -> Result<Vec<Proposal>, ImportError> {
        let text = self
            .generate(vec![json!({
                "text": prompt::chef_prompt(craving, fridge, constraints, people)
            })])
            .await?;
        proposals_from(&text)
    }

    /// Propose simple recipes from only the listed ingredients.
    pub async fn fridge_suggestions(
        &self,
        ingredients: &str,
        people: u32,
    ) -> Result<Vec<Proposal>, ImportError> {
        let text = self
            .generate(vec![json!({
                "text": prompt::fridge_prompt(ingredients, people)
            })])
            .await?;
        proposals_from(&text)
    }

    /// Generate a workout session.
    pub async fn workout_plan(
        &self,
        minutes: u32,
        intensity: &str,
        place: &str,
        gear: &str,
    ) -> Result<WorkoutPlan, ImportError> {
        let text = self
            .generate(vec![json!({
                "text": prompt::workout_prompt(minutes, intensity, place, gear)
            })])
            .await?;
        let value = parse_model_output(&text)?;
        Ok(WorkoutPlan::from_model_value(&value))
    }

    /// Analyse a food product and suggest a better alternative.
    pub async fn product_review(&self, product: &str) -> Result<ProductVerdict, ImportError> {
        let text = self
            .generate(vec![json!({ "text": prompt::product_prompt(product) })])
            .await?;
        let value = parse_model_output(&text)?;
        Ok(ProductVerdict::from_model_value(&value))
    }
}

#[async_trait]
impl RecipeModel for GeminiClient {
    async fn recipe_from_video(
        &self,
        video: &Path,
        title_hint: &str,
    ) -> Result<RecipeDraft, ImportError> {
        let (media, remote_name) = self.media_part(video).await?;
        let result = self
            .generate(vec![
                media,
                json!({ "text": prompt::video_prompt(title_hint) }),
            ])
            .await;

        // Remote cleanup is best-effort; a stale file expires on its own
        if let Some(name) = remote_name {
            if let Err(e) =
                files::delete(&self.client, &self.base_url, &self.api_key, &name).await
            {
                warn!("Failed to delete remote file {}: {}", name, e);
            }
        }

        let value = parse_model_output(&result?)?;
        Ok(RecipeDraft::from_model_value(&value))
    }

    async fn recipe_from_text(&self, description: &str) -> Result<RecipeDraft, ImportError> {
        let text = self
            .generate(vec![json!({ "text": prompt::text_prompt(description) })])
            .await?;
        let value = parse_model_output(&text)?;
        Ok(RecipeDraft::from_model_value(&value))
    }
}

fn proposals_from(text: &str) -> Result<Vec<Proposal>, ImportError> {
    let value = parse_model_output(text)?;
    let items = value.as_array().ok_or_else(|| ImportError::ModelOutput {
        message: "expected a JSON list of proposals".to_string(),
        raw: text.to_string(),
    })?;
    Ok(items.iter().map(Proposal::from_model_value).collect())
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("3gp") => "video/3gpp",
        _ => "video/mp4",
    }
}
