//! Ingredient-line cleaning and the session shopping list.

use std::sync::OnceLock;

use regex::Regex;

static PAREN_RE: OnceLock<Regex> = OnceLock::new();
static QUANTITY_RE: OnceLock<Regex> = OnceLock::new();

/// Reduce an ingredient line to the product name.
///
/// Strips parenthesized notes ("riz (cuit)"), then leading quantities with
/// their French units ("100g de", "2 c.à.s de", "1/2 tasse"), then
/// capitalizes: `"100g de farine"` → `"Farine"`, `"2 oeufs"` → `"Oeufs"`.
pub fn clean_ingredient_name(text: &str) -> String {
    let paren = PAREN_RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap());
    let without_notes = paren.replace_all(text, "");

    // Digits (incl. fractions/ranges) → optional unit → optional
    // "à soupe/café/dessert" → optional partitive ("de", "d'", "du", "des")
    let quantity = QUANTITY_RE.get_or_init(|| {
        Regex::new(
            r"(?i)^[\d/\-.,\s]+(?:g|kg|ml|cl|l|oz|lb|cuillères?|c\.à\.s|c\.à\.c|tasses?|verres?|pincées?|tranches?|bottes?|poignées?|gousses?|filets?)?\s*(?:à\s*(?:soupe|café|dessert))?\s*(?:de\s+|d'|d’|du\s+|des\s+)?",
        )
        .unwrap()
    });
    let cleaned = quantity.replace(without_notes.trim(), "");

    capitalize(cleaned.trim())
}

/// First letter uppercase, rest lowercase.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// De-duplicated, per-session list of cleaned ingredient names.
///
/// Lives only in memory: the list is rebuilt from saved recipes on demand
/// and is never persisted.
#[derive(Debug, Default)]
pub struct ShoppingList {
    items: Vec<String>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clean and add one ingredient line; returns false on duplicates and
    /// lines that clean down to nothing.
    pub fn add(&mut self, raw: &str) -> bool {
        let name = clean_ingredient_name(raw);
        if name.is_empty() || self.items.contains(&name) {
            return false;
        }
        self.items.push(name);
        true
    }

    pub fn add_all<'a>(&mut self, raws: impl IntoIterator<Item = &'a str>) {
        for raw in raws {
            self.add(raw);
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.items.iter().position(|item| item == name) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Plain-text export ("- Farine" lines), ready to paste in a message.
    pub fn to_text(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
