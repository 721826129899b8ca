use clap::{Parser, Subcommand, ValueEnum};

use crate::ai::prompt::ChefConstraint;
use crate::coach;
use crate::model::{ProductVerdict, Proposal, Recipe, RecipeDraft, WorkoutPlan};

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn short-form cooking videos into structured recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a recipe from a short-form video URL
    Import {
        url: String,
        /// Netscape-format cookie file for platforms that block anonymous downloads
        #[arg(long)]
        cookies: Option<String>,
        /// Analyse without saving to the library
        #[arg(long)]
        no_save: bool,
    },
    /// Generate a recipe from a pasted description (manual fallback)
    Text {
        description: String,
        /// The source URL to record, if any
        #[arg(long, default_value = "Import manuel")]
        url: String,
        #[arg(long)]
        no_save: bool,
    },
    /// Ask the chef for three recipe proposals
    Chef {
        /// What you feel like eating
        craving: String,
        /// What is already in the fridge
        #[arg(long)]
        fridge: Option<String>,
        #[arg(long, default_value_t = 2)]
        people: u32,
        #[arg(long)]
        healthy: bool,
        #[arg(long)]
        budget: bool,
        #[arg(long)]
        quick: bool,
        #[arg(long)]
        few_ingredients: bool,
    },
    /// Suggest simple recipes from only what is on hand
    Fridge {
        ingredients: String,
        #[arg(long, default_value_t = 2)]
        people: u32,
    },
    /// Generate a workout session
    Workout {
        #[arg(long, default_value_t = 30)]
        minutes: u32,
        #[arg(long, default_value = "Moyenne")]
        intensity: String,
        #[arg(long, default_value = "Maison (Poids corps)")]
        place: String,
        /// Available equipment, comma separated
        #[arg(long, default_value = "")]
        gear: String,
    },
    /// Analyse a food product and suggest a better alternative
    Compare { product: String },
    /// Browse the saved recipe library
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Build a de-duplicated shopping list from saved recipes
    Shopping {
        /// Recipe ids to shop for; all saved recipes when omitted
        ids: Vec<String>,
    },
    /// Body metrics
    Coach {
        #[command(subcommand)]
        action: CoachAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum LibraryAction {
    /// List saved recipes
    List,
    /// Show one recipe in full
    Show { id: String },
    /// Delete a recipe and its mirrored thumbnail
    Delete { id: String },
    /// Replace a recipe's image (URL or local path)
    SetImage { id: String, image: String },
}

#[derive(Subcommand, Debug)]
pub enum CoachAction {
    /// Body mass index
    Bmi {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
    },
    /// Daily calorie needs (Mifflin-St Jeor)
    Tdee {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        age: u32,
        #[arg(long, value_enum, default_value = "male")]
        sex: SexArg,
        #[arg(long, value_enum, default_value = "sedentary")]
        activity: ActivityArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SexArg {
    Male,
    Female,
}

impl From<SexArg> for coach::Sex {
    fn from(value: SexArg) -> Self {
        match value {
            SexArg::Male => coach::Sex::Male,
            SexArg::Female => coach::Sex::Female,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ActivityArg {
    Sedentary,
    Light,
    Moderate,
    Intense,
}

impl From<ActivityArg> for coach::Activity {
    fn from(value: ActivityArg) -> Self {
        match value {
            ActivityArg::Sedentary => coach::Activity::Sedentary,
            ActivityArg::Light => coach::Activity::Light,
            ActivityArg::Moderate => coach::Activity::Moderate,
            ActivityArg::Intense => coach::Activity::Intense,
        }
    }
}

/// Collect the chef constraint flags into prompt constraints.
pub fn chef_constraints(
    healthy: bool,
    budget: bool,
    quick: bool,
    few_ingredients: bool,
) -> Vec<ChefConstraint> {
    let mut constraints = Vec::new();
    if healthy {
        constraints.push(ChefConstraint::Healthy);
    }
    if budget {
        constraints.push(ChefConstraint::Budget);
    }
    if quick {
        constraints.push(ChefConstraint::Quick);
    }
    if few_ingredients {
        constraints.push(ChefConstraint::FewIngredients);
    }
    constraints
}

pub fn print_draft(draft: &RecipeDraft) {
    println!("{}", draft.name);
    println!("  Temps: {}   Score: {}/100   Portions: {}", draft.time, draft.score, draft.portion);
    if !draft.tags.is_empty() {
        println!("  Tags: {}", draft.tags.join(", "));
    }
    print_nutrition_line(&draft.nutrition);
    println!("  Ingrédients:");
    for ingredient in &draft.ingredients {
        println!("    - {ingredient}");
    }
    println!("  Étapes:");
    for (index, step) in draft.steps.iter().enumerate() {
        println!("    {}. {step}", index + 1);
    }
}

pub fn print_recipe(recipe: &Recipe) {
    println!("[{}] {} ({})", recipe.id, recipe.name, recipe.date);
    println!("  Temps: {}   Score: {}/100   Portions: {}", recipe.time, recipe.score, recipe.portion);
    if !recipe.url.is_empty() {
        println!("  Source: {}", recipe.url);
    }
    if let Some(image) = &recipe.image {
        println!("  Image: {image}");
    }
    print_nutrition_line(&recipe.nutrition);
    println!("  Ingrédients:");
    for ingredient in &recipe.ingredients {
        println!("    - {ingredient}");
    }
    println!("  Étapes:");
    for (index, step) in recipe.steps.iter().enumerate() {
        println!("    {}. {step}", index + 1);
    }
}

pub fn print_library_line(recipe: &Recipe) {
    println!(
        "[{}] {}  ({}, score {}/100)",
        recipe.id, recipe.name, recipe.time, recipe.score
    );
}

pub fn print_proposals(proposals: &[Proposal]) {
    for (index, proposal) in proposals.iter().enumerate() {
        match &proposal.kind {
            Some(kind) => println!("{}. {} [{}]", index + 1, proposal.name, kind),
            None => println!("{}. {}", index + 1, proposal.name),
        }
        println!(
            "   Temps: {}   Score: {}/100   {}",
            proposal.time, proposal.score, proposal.portion
        );
        for ingredient in &proposal.ingredients {
            println!("   - {ingredient}");
        }
        if let Some(short) = &proposal.short_steps {
            println!("   → {short}");
        }
        for step in &proposal.steps {
            println!("   → {step}");
        }
        println!();
    }
}

pub fn print_workout(plan: &WorkoutPlan) {
    println!("{}", plan.title);
    println!("{}", plan.summary);
    println!("1. Échauffement");
    for warmup in &plan.warmup {
        println!("   - {warmup}");
    }
    println!("2. Circuit");
    for exercise in &plan.circuit {
        println!(
            "   - {} | {} | repos {}",
            exercise.name, exercise.reps, exercise.rest
        );
    }
    println!("3. Retour au calme");
    for cooldown in &plan.cooldown {
        println!("   - {cooldown}");
    }
}

pub fn print_verdict(verdict: &ProductVerdict) {
    println!("Verdict: {}", verdict.verdict);
    println!("{}", verdict.analysis);
    println!("Mieux: {}", verdict.alternative);
    println!("Recette rapide: {}", verdict.quick_recipe);
}

fn print_nutrition_line(nutrition: &crate::model::Nutrition) {
    let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| "?".to_string());
    println!(
        "  Nutrition (1 part): {} kcal | prot {} | gluc {} | lip {}",
        cell(&nutrition.cal),
        cell(&nutrition.prot),
        cell(&nutrition.carb),
        cell(&nutrition.fat)
    );
}
