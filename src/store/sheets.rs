use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::StoreConfig;
use crate::error::ImportError;
use crate::model::{Nutrition, Recipe};
use crate::store::{media, RecipeStore};

/// Store backed by a Google Sheets spreadsheet.
///
/// One row per record, columns (Date, Nom, Url, Temps, Ingredients, Etapes,
/// Miniature); multi-line lists live newline-joined inside their cell. The
/// sheet has no id column, so record ids are row numbers assigned at read
/// time. Fields without a column (tags, nutrition, score, portion) read back
/// as their load defaults.
///
/// Appends go through `values:append`, which inserts a row server-side
/// instead of rewriting the sheet; there is still no locking or versioning.
#[derive(Debug)]
pub struct SheetsStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    access_token: String,
    media_dir: PathBuf,
}

impl SheetsStore {
    pub fn new(config: &StoreConfig) -> Result<Self, ImportError> {
        let spreadsheet_id = config.spreadsheet_id.clone().ok_or_else(|| {
            ImportError::Store("sheets backend requires store.spreadsheet_id".to_string())
        })?;
        let access_token = config.access_token.clone().ok_or_else(|| {
            ImportError::Store("sheets backend requires store.access_token".to_string())
        })?;

        Ok(SheetsStore {
            client: Client::new(),
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id,
            sheet_name: config.sheet_name.clone(),
            access_token,
            media_dir: PathBuf::from(&config.media_dir),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, suffix
        )
    }

    /// Numeric sheet id of the configured tab (row deletion addresses
    /// sheets by id, not by name).
    async fn sheet_gid(&self) -> Result<i64, ImportError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties",
            self.base_url, self.spreadsheet_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = check(response).await?;

        body["sheets"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|sheet| sheet["properties"]["title"].as_str() == Some(self.sheet_name.as_str()))
            .and_then(|sheet| sheet["properties"]["sheetId"].as_i64())
            .ok_or_else(|| {
                ImportError::Store(format!("No sheet named '{}'", self.sheet_name))
            })
    }
}

#[async_trait]
impl RecipeStore for SheetsStore {
    async fn list(&self) -> Result<Vec<Recipe>, ImportError> {
        let url = self.values_url(&format!("{}!A:G", self.sheet_name));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = check(response).await?;

        let rows = body["values"].as_array().cloned().unwrap_or_default();
        debug!("Sheet returned {} rows", rows.len());

        let mut recipes = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            let cells = row.as_array().cloned().unwrap_or_default();
            if row_number == 1 && is_header(&cells) {
                continue;
            }
            recipes.push(recipe_from_row(&cells, row_number));
        }
        Ok(recipes)
    }

    async fn append(&self, recipe: &Recipe) -> Result<(), ImportError> {
        let url = format!(
            "{}:append?valueInputOption=RAW",
            self.values_url(&format!("{}!A:G", self.sheet_name))
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [row_values(recipe)] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_image(&self, id: &str, image: &str) -> Result<(), ImportError> {
        let row = row_number(id)?;
        let url = format!(
            "{}?valueInputOption=RAW",
            self.values_url(&format!("{}!G{}", self.sheet_name, row))
        );
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [[image]] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ImportError> {
        let row = row_number(id)?;
        let gid = self.sheet_gid().await?;

        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base_url, self.spreadsheet_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {
                            "sheetId": gid,
                            "dimension": "ROWS",
                            "startIndex": row - 1,
                            "endIndex": row
                        }
                    }
                }]
            }))
            .send()
            .await?;
        check(response).await?;

        media::remove_mirrored(&self.media_dir, id).await;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<Value, ImportError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ImportError::Api { status, body });
    }
    Ok(response.json().await?)
}

fn row_number(id: &str) -> Result<usize, ImportError> {
    id.parse::<usize>()
        .ok()
        .filter(|row| *row >= 1)
        .ok_or_else(|| ImportError::NotFound(id.to_string()))
}

fn is_header(cells: &[Value]) -> bool {
    cells
        .first()
        .and_then(Value::as_str)
        .map(|cell| cell.eq_ignore_ascii_case("date"))
        .unwrap_or(false)
}

fn row_values(recipe: &Recipe) -> Value {
    json!([
        recipe.date,
        recipe.name,
        recipe.url,
        recipe.time,
        recipe.ingredients.join("\n"),
        recipe.steps.join("\n"),
        recipe.image.clone().unwrap_or_default(),
    ])
}

fn recipe_from_row(cells: &[Value], row_number: usize) -> Recipe {
    let cell = |index: usize| {
        cells
            .get(index)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    let or_default = |value: String, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value
        }
    };

    Recipe {
        id: row_number.to_string(),
        date: cell(0),
        name: or_default(cell(1), "Sans nom"),
        url: cell(2),
        time: or_default(cell(3), "?"),
        tags: Vec::new(),
        nutrition: Nutrition::default(),
        score: 50,
        portion: "Non spécifié".to_string(),
        ingredients: split_cell(&cell(4)),
        steps: split_cell(&cell(5)),
        image: Some(cell(6)).filter(|image| !image.is_empty()),
    }
}

fn split_cell(cell: &str) -> Vec<String> {
    cell.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_store(base_url: String) -> SheetsStore {
        SheetsStore::new(&StoreConfig {
            backend: "sheets".to_string(),
            spreadsheet_id: Some("sheet1".to_string()),
            access_token: Some("token".to_string()),
            ..Default::default()
        })
        .unwrap()
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_list_skips_header_and_backfills() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/spreadsheets/sheet1/values/Recettes!A:G")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "range": "Recettes!A1:G2",
                    "values": [
                        ["Date", "Nom", "Url", "Temps", "Ingredients", "Etapes", "Miniature"],
                        ["05/08/2026", "Tarte", "https://example.com/v/1", "30 min",
                         "3 pommes\n1 pâte", "étaler\ngarnir\ncuire", "media/2.jpg"]
                    ]
                })
                .to_string(),
            )
            .create();

        let store = test_store(server.url());
        let recipes = store.list().await.unwrap();

        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.id, "2");
        assert_eq!(recipe.name, "Tarte");
        assert_eq!(recipe.ingredients, vec!["3 pommes", "1 pâte"]);
        assert_eq!(recipe.steps.len(), 3);
        assert_eq!(recipe.image.as_deref(), Some("media/2.jpg"));
        // Columns the sheet does not carry read back as load defaults
        assert_eq!(recipe.score, 50);
        assert_eq!(recipe.portion, "Non spécifié");
        mock.assert();
    }

    #[tokio::test]
    async fn test_append_posts_one_row() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v4/spreadsheets/sheet1/values/Recettes!A:G:append?valueInputOption=RAW",
            )
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"values": [["01/01/2024", "Omelette", "https://example.com/v/9", "5 min", "2 oeufs", "battre\ncuire", ""]]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create();

        let recipe = Recipe::with_id(
            crate::model::RecipeDraft {
                name: "Omelette".to_string(),
                time: "5 min".to_string(),
                ingredients: vec!["2 oeufs".to_string()],
                steps: vec!["battre".to_string(), "cuire".to_string()],
                ..Default::default()
            },
            "https://example.com/v/9",
            None,
            "20240101_000000".to_string(),
            "01/01/2024".to_string(),
        );

        let store = test_store(server.url());
        store.append(&recipe).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_update_image_targets_miniature_column() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "PUT",
                "/v4/spreadsheets/sheet1/values/Recettes!G3?valueInputOption=RAW",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create();

        let store = test_store(server.url());
        store.update_image("3", "media/new.jpg").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_delete_resolves_gid_then_drops_row() {
        let mut server = Server::new_async().await;
        let meta = server
            .mock("GET", "/v4/spreadsheets/sheet1?fields=sheets.properties")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "sheets": [{ "properties": { "sheetId": 77, "title": "Recettes" } }]
                })
                .to_string(),
            )
            .create();
        let update = server
            .mock("POST", "/v4/spreadsheets/sheet1:batchUpdate")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"requests": [{"deleteDimension": {"range": {"sheetId": 77, "dimension": "ROWS", "startIndex": 1, "endIndex": 2}}}]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create();

        let store = test_store(server.url());
        store.delete("2").await.unwrap();
        meta.assert();
        update.assert();
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let store = test_store("http://localhost:1".to_string());
        let err = store.update_image("20240101_000000", "x").await.unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[test]
    fn test_missing_credentials() {
        let err = SheetsStore::new(&StoreConfig {
            backend: "sheets".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("spreadsheet_id"));
    }
}
