use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-text nutrition breakdown for one portion.
///
/// Values come straight from the model ("350 kcal", "12g", ...) and are never
/// interpreted numerically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
}

impl Nutrition {
    fn from_value(value: &Value) -> Self {
        Nutrition {
            cal: text_value(&value["cal"]),
            prot: text_value(&value["prot"]),
            carb: text_value(&value["carb"]),
            fat: text_value(&value["fat"]),
        }
    }
}

/// A persisted recipe record.
///
/// The wire format (JSON file, spreadsheet columns, model prompts) uses the
/// French field names of the product; legacy records missing the newer fields
/// are back-filled with defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub date: String,
    #[serde(rename = "nom", default = "default_name")]
    pub name: String,
    #[serde(rename = "temps", default = "default_time")]
    pub time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default = "default_score")]
    pub score: i64,
    #[serde(rename = "portion_text", default = "default_portion_loaded")]
    pub portion: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(rename = "etapes", default)]
    pub steps: Vec<String>,
    #[serde(rename = "image_path", default)]
    pub image: Option<String>,
}

impl Recipe {
    /// Build a persisted record from a freshly extracted draft.
    ///
    /// The identifier is timestamp-derived, which also names the mirrored
    /// thumbnail file.
    pub fn from_draft(draft: RecipeDraft, url: &str, image: Option<String>) -> Self {
        let now = Local::now();
        Self::with_id(
            draft,
            url,
            image,
            now.format("%Y%m%d_%H%M%S").to_string(),
            now.format("%d/%m/%Y").to_string(),
        )
    }

    /// Like [`Recipe::from_draft`] but with an explicit id and date.
    pub fn with_id(
        draft: RecipeDraft,
        url: &str,
        image: Option<String>,
        id: String,
        date: String,
    ) -> Self {
        Recipe {
            id,
            date,
            name: draft.name,
            time: draft.time,
            tags: draft.tags,
            nutrition: draft.nutrition,
            score: draft.score,
            portion: draft.portion,
            url: url.to_string(),
            ingredients: draft.ingredients,
            steps: draft.steps,
            image,
        }
    }
}

/// Recipe fields as extracted by the model, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(rename = "nom", default = "default_name")]
    pub name: String,
    #[serde(rename = "temps", default = "default_time")]
    pub time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default = "default_score")]
    pub score: i64,
    #[serde(rename = "portion_text", default = "default_portion_draft")]
    pub portion: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(rename = "etapes", default)]
    pub steps: Vec<String>,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        RecipeDraft {
            name: default_name(),
            time: default_time(),
            tags: Vec::new(),
            nutrition: Nutrition::default(),
            score: default_score(),
            portion: default_portion_draft(),
            ingredients: Vec::new(),
            steps: Vec::new(),
        }
    }
}

impl RecipeDraft {
    /// Build a draft from decoded model output, tolerating the shapes the
    /// model actually emits: string scores, numeric nutrition values, and
    /// ingredient lists nested under category objects.
    pub fn from_model_value(value: &Value) -> Self {
        RecipeDraft {
            name: text_value(&value["nom"]).unwrap_or_else(default_name),
            time: text_value(&value["temps"]).unwrap_or_else(default_time),
            tags: collect_strings(&value["tags"]),
            nutrition: Nutrition::from_value(&value["nutrition"]),
            score: score_value(&value["score"]),
            portion: text_value(&value["portion_text"]).unwrap_or_else(default_portion_draft),
            ingredients: flatten_ingredients(&value["ingredients"]),
            steps: collect_strings(&value["etapes"]),
        }
    }
}

/// One proposal from the chef or fridge generators.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub name: String,
    /// Proposal label ("Rapide", ...) when the generator provides one
    pub kind: Option<String>,
    pub time: String,
    pub score: i64,
    pub portion: String,
    pub nutrition: Nutrition,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    /// Condensed one-line steps used by the fridge generator
    pub short_steps: Option<String>,
}

impl Proposal {
    pub fn from_model_value(value: &Value) -> Self {
        Proposal {
            name: text_value(&value["nom"]).unwrap_or_else(default_name),
            kind: text_value(&value["type"]),
            time: text_value(&value["temps"]).unwrap_or_else(default_time),
            score: score_value(&value["score"]),
            portion: text_value(&value["portion_text"]).unwrap_or_else(default_portion_draft),
            nutrition: Nutrition::from_value(&value["nutrition"]),
            ingredients: flatten_ingredients(&value["ingredients"]),
            steps: collect_strings(&value["etapes"]),
            short_steps: text_value(&value["etapes_courtes"]),
        }
    }

    /// Promote a proposal to a draft so it can be saved like any extraction.
    pub fn into_draft(self) -> RecipeDraft {
        let steps = if self.steps.is_empty() {
            self.short_steps.into_iter().collect()
        } else {
            self.steps
        };
        RecipeDraft {
            name: self.name,
            time: self.time,
            tags: Vec::new(),
            nutrition: self.nutrition,
            score: self.score,
            portion: self.portion,
            ingredients: self.ingredients,
            steps,
        }
    }
}

/// One exercise of a generated workout circuit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub reps: String,
    pub rest: String,
}

/// A generated workout session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutPlan {
    pub title: String,
    pub summary: String,
    pub warmup: Vec<String>,
    pub circuit: Vec<Exercise>,
    pub cooldown: Vec<String>,
}

impl WorkoutPlan {
    pub fn from_model_value(value: &Value) -> Self {
        let circuit = value["circuit"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| Exercise {
                        name: text_value(&item["exo"]).unwrap_or_default(),
                        reps: text_value(&item["rep"]).unwrap_or_default(),
                        rest: text_value(&item["repos"]).unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        WorkoutPlan {
            title: text_value(&value["titre"]).unwrap_or_default(),
            summary: text_value(&value["resume"]).unwrap_or_default(),
            warmup: collect_strings(&value["echauffement"]),
            circuit,
            cooldown: collect_strings(&value["cooldown"]),
        }
    }
}

/// Verdict of the product-alternative analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductVerdict {
    pub verdict: String,
    pub analysis: String,
    pub alternative: String,
    pub quick_recipe: String,
}

impl ProductVerdict {
    pub fn from_model_value(value: &Value) -> Self {
        ProductVerdict {
            verdict: text_value(&value["verdict"]).unwrap_or_default(),
            analysis: text_value(&value["analyse"]).unwrap_or_default(),
            alternative: text_value(&value["alternative"]).unwrap_or_default(),
            quick_recipe: text_value(&value["recette_rapide"]).unwrap_or_default(),
        }
    }
}

/// Flatten an ingredient value into a flat list of strings.
///
/// The prompt pins a flat shape, but the model sometimes answers with
/// category objects (`[{"categorie": "Sauce", "items": [...]}]`) or a
/// category map (`{"Sauce": [...]}`). Records must never hold nested
/// structures, so every shape collapses here.
pub fn flatten_ingredients(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    Value::Object(map) => {
                        // Category object: take every array-valued field
                        for nested in map.values() {
                            if nested.is_array() {
                                out.extend(collect_strings(nested));
                            }
                        }
                    }
                    _ => {}
                }
            }
            out
        }
        Value::Object(map) => {
            // Category map: keys are labels, values are the lists
            let mut out = Vec::new();
            for nested in map.values() {
                out.extend(collect_strings(nested));
            }
            out
        }
        _ => Vec::new(),
    }
}

/// Collect the string elements of an array value, dropping anything else.
pub fn collect_strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Read a free-text field, accepting numbers the model forgot to quote.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a score, accepting both numbers and numeric strings.
fn score_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_else(default_score),
        Value::String(s) => s.trim().parse().unwrap_or_else(|_| default_score()),
        _ => default_score(),
    }
}

fn default_name() -> String {
    "Sans nom".to_string()
}

fn default_time() -> String {
    "?".to_string()
}

fn default_score() -> i64 {
    50
}

// Insertion and load paths historically used different placeholders; both
// are kept so existing stores read back unchanged.
fn default_portion_draft() -> String {
    "Standard".to_string()
}

fn default_portion_loaded() -> String {
    "Non spécifié".to_string()
}
