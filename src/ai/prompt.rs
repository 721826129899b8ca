//! Prompt templates for the generation endpoints.
//!
//! Every extraction prompt pins the exact JSON schema of the wire format
//! (French keys) and repeats the flat-ingredient-list rule; the model still
//! violates both often enough that the answers go through
//! [`crate::ai::parse::parse_model_output`] and the ingredient flattener.

/// Schema fragment shared by the single-recipe prompts.
const RECIPE_SCHEMA: &str = r#"{ "nom": "...", "temps": "...", "tags": [], "score": 85, "portion_text": "...", "nutrition": { "cal": "...", "prot": "...", "carb": "...", "fat": "..." }, "ingredients": ["..."], "etapes": ["..."] }"#;

const FLAT_LIST_RULE: &str = "IMPORTANT: 'ingredients' must be a flat list of plain strings \
     (e.g. [\"2 oeufs\", \"100g farine\"]). No categories, no nested objects.";

/// Prompt for the video-grounded extraction.
pub fn video_prompt(title: &str) -> String {
    format!(
        "Analyse this cooking video titled \"{title}\".\n\
         1. Reconstruct the complete recipe.\n\
         2. Give the nutrition breakdown for ONE portion.\n\
         3. Give a severe health score out of 100.\n\
         {FLAT_LIST_RULE}\n\
         Answer with STRICT JSON only, exactly this shape: {RECIPE_SCHEMA}"
    )
}

/// Prompt for the text-only fallback, fed with whatever title/description
/// metadata survived the blocked download.
pub fn text_prompt(description: &str) -> String {
    format!(
        "Create a plausible healthy recipe based on this text: \"{description}\".\n\
         Complete recipe, severe health score, precise nutrition for one portion.\n\
         {FLAT_LIST_RULE}\n\
         Answer with STRICT JSON only, exactly this shape: {RECIPE_SCHEMA}"
    )
}

/// Constraints the chef generator can be asked to honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChefConstraint {
    Healthy,
    Budget,
    Quick,
    FewIngredients,
}

impl ChefConstraint {
    fn as_instruction(&self) -> &'static str {
        match self {
            ChefConstraint::Healthy => "Very healthy recipes.",
            ChefConstraint::Budget => "Inexpensive ingredients.",
            ChefConstraint::Quick => "Ready in 15 minutes.",
            ChefConstraint::FewIngredients => "At most 5 ingredients.",
        }
    }
}

/// Prompt for the chef generator: three proposals for a craving, optionally
/// biased towards what is already in the fridge.
pub fn chef_prompt(
    craving: &str,
    fridge: Option<&str>,
    constraints: &[ChefConstraint],
    people: u32,
) -> String {
    let constraint_text = constraints
        .iter()
        .map(ChefConstraint::as_instruction)
        .collect::<Vec<_>>()
        .join(" ");
    let fridge_text = fridge
        .filter(|items| !items.trim().is_empty())
        .map(|items| format!(" Use these first: {items}."))
        .unwrap_or_default();

    format!(
        "Propose 3 recipes for: \"{craving}\".{fridge_text} Constraints: {constraint_text}\n\
         Quantities for {people} people, nutrition for 1 person.\n\
         {FLAT_LIST_RULE}\n\
         Answer with a STRICT JSON list, exactly this shape: \
         [ {{ \"nom\": \"...\", \"type\": \"Rapide\", \"temps\": \"...\", \"score\": 80, \
         \"portion_text\": \"Pour {people} p.\", \"nutrition\": {{ \"cal\": \"...\", \"prot\": \"...\", \
         \"carb\": \"...\", \"fat\": \"...\" }}, \"ingredients\": [\"...\"], \"etapes\": [\"...\"] }} ]"
    )
}

/// Prompt for the fridge generator: simple recipes from only what is on hand.
pub fn fridge_prompt(ingredients: &str, people: u32) -> String {
    format!(
        "I ONLY have: \"{ingredients}\".\n\
         Propose 3 simple recipes. Ingredient quantities for {people} PEOPLE.\n\
         {FLAT_LIST_RULE}\n\
         Answer with a STRICT JSON list, exactly this shape: \
         [ {{ \"nom\": \"...\", \"temps\": \"...\", \"score\": 75, \"portion_text\": \"Pour {people} p.\", \
         \"nutrition\": {{ \"cal\": \"...\", \"prot\": \"...\", \"carb\": \"...\", \"fat\": \"...\" }}, \
         \"ingredients\": [\"...\"], \"etapes_courtes\": \"...\" }} ]"
    )
}

/// Prompt for the workout generator.
pub fn workout_prompt(minutes: u32, intensity: &str, place: &str, gear: &str) -> String {
    format!(
        "Workout session. Duration: {minutes} min. Intensity: {intensity}. \
         Place: {place}. Equipment: {gear}.\n\
         Answer with STRICT JSON only, exactly this shape: \
         {{ \"titre\": \"...\", \"resume\": \"...\", \"echauffement\": [], \
         \"circuit\": [ {{\"exo\": \"...\", \"rep\": \"...\", \"repos\": \"...\"}} ], \"cooldown\": [] }}"
    )
}

/// Prompt for the product-alternative analysis.
pub fn product_prompt(product: &str) -> String {
    format!(
        "Analyse the food product \"{product}\".\n\
         Answer with STRICT JSON only, exactly this shape: \
         {{ \"verdict\": \"Bon/Mauvais/Moyen\", \"analyse\": \"...\", \
         \"alternative\": \"...\", \"recette_rapide\": \"...\" }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_prompt_pins_schema() {
        let prompt = video_prompt("Pasta in 30 seconds");
        assert!(prompt.contains("Pasta in 30 seconds"));
        assert!(prompt.contains("\"nom\""));
        assert!(prompt.contains("\"etapes\""));
        assert!(prompt.contains("flat list"));
    }

    #[test]
    fn test_chef_prompt_constraints_and_fridge() {
        let prompt = chef_prompt(
            "comfort food",
            Some("2 courgettes, des oeufs"),
            &[ChefConstraint::Healthy, ChefConstraint::Quick],
            4,
        );
        assert!(prompt.contains("Very healthy recipes."));
        assert!(prompt.contains("Ready in 15 minutes."));
        assert!(prompt.contains("2 courgettes"));
        assert!(prompt.contains("Pour 4 p."));
    }

    #[test]
    fn test_chef_prompt_empty_fridge_omitted() {
        let prompt = chef_prompt("pasta", Some("   "), &[], 2);
        assert!(!prompt.contains("Use these first"));
    }

    #[test]
    fn test_fridge_prompt_uses_short_steps_key() {
        let prompt = fridge_prompt("riz, thon", 2);
        assert!(prompt.contains("etapes_courtes"));
    }
}
