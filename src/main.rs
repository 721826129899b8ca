use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use recipe_reel::cli::{self, Cli, CoachAction, Command, LibraryAction};
use recipe_reel::ingredient::ShoppingList;
use recipe_reel::store::{self, RecipeStore};
use recipe_reel::{
    coach, save_recipe, AppConfig, ExtractionPipeline, GeminiClient, ImportError, RecipeModel,
    VideoFetcher,
};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Erreur: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ImportError> {
    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Import {
            url,
            cookies,
            no_save,
        } => {
            if cookies.is_some() {
                config.download.cookies_file = cookies;
            }

            let fetcher = VideoFetcher::new(&config.download).await?;
            let model = GeminiClient::new(&config)?;
            let pipeline = ExtractionPipeline::new(&fetcher, &model);

            let extraction = match pipeline.extract(&url).await {
                Ok(extraction) => extraction,
                Err(ImportError::Blocked(reason)) => {
                    eprintln!("La plateforme a bloqué le téléchargement ({reason}).");
                    eprintln!(
                        "Colle la description de la vidéo à la place : recipe-reel text \"...\""
                    );
                    return Err(ImportError::Blocked(reason));
                }
                Err(e) => return Err(e),
            };

            cli::print_draft(extraction.draft());
            if !no_save {
                let store = store::open(&config.store)?;
                let saved = save_recipe(
                    store.as_ref(),
                    Path::new(&config.store.media_dir),
                    extraction.draft().clone(),
                    &url,
                    extraction.thumbnail(),
                )
                .await?;
                println!("\nEnregistrée sous l'id {}", saved.id);
            }
        }

        Command::Text {
            description,
            url,
            no_save,
        } => {
            let model = GeminiClient::new(&config)?;
            let draft = model.recipe_from_text(&description).await?;
            cli::print_draft(&draft);
            if !no_save {
                let store = store::open(&config.store)?;
                let saved = save_recipe(
                    store.as_ref(),
                    Path::new(&config.store.media_dir),
                    draft,
                    &url,
                    None,
                )
                .await?;
                println!("\nEnregistrée sous l'id {}", saved.id);
            }
        }

        Command::Chef {
            craving,
            fridge,
            people,
            healthy,
            budget,
            quick,
            few_ingredients,
        } => {
            let model = GeminiClient::new(&config)?;
            let constraints = cli::chef_constraints(healthy, budget, quick, few_ingredients);
            let proposals = model
                .chef_proposals(&craving, fridge.as_deref(), &constraints, people)
                .await?;
            cli::print_proposals(&proposals);
        }

        Command::Fridge {
            ingredients,
            people,
        } => {
            let model = GeminiClient::new(&config)?;
            let proposals = model.fridge_suggestions(&ingredients, people).await?;
            cli::print_proposals(&proposals);
        }

        Command::Workout {
            minutes,
            intensity,
            place,
            gear,
        } => {
            let model = GeminiClient::new(&config)?;
            let gear = if gear.trim().is_empty() {
                "aucun"
            } else {
                gear.as_str()
            };
            let plan = model.workout_plan(minutes, &intensity, &place, gear).await?;
            cli::print_workout(&plan);
        }

        Command::Compare { product } => {
            let model = GeminiClient::new(&config)?;
            let verdict = model.product_review(&product).await?;
            cli::print_verdict(&verdict);
        }

        Command::Library { action } => {
            let store = store::open(&config.store)?;
            run_library(store.as_ref(), action).await?;
        }

        Command::Shopping { ids } => {
            let store = store::open(&config.store)?;
            let recipes = store.list().await?;

            let mut list = ShoppingList::new();
            for recipe in &recipes {
                if ids.is_empty() || ids.contains(&recipe.id) {
                    list.add_all(recipe.ingredients.iter().map(String::as_str));
                }
            }

            if list.is_empty() {
                println!("Liste vide.");
            } else {
                println!("{}", list.to_text());
            }
        }

        Command::Coach { action } => run_coach(action),
    }

    Ok(())
}

async fn run_library(store: &dyn RecipeStore, action: LibraryAction) -> Result<(), ImportError> {
    match action {
        LibraryAction::List => {
            let recipes = store.list().await?;
            if recipes.is_empty() {
                println!("La bibliothèque est vide.");
            }
            // Newest first, like the library grid
            for recipe in recipes.iter().rev() {
                cli::print_library_line(recipe);
            }
        }
        LibraryAction::Show { id } => {
            let recipes = store.list().await?;
            let recipe = recipes
                .iter()
                .find(|recipe| recipe.id == id)
                .ok_or(ImportError::NotFound(id))?;
            cli::print_recipe(recipe);
        }
        LibraryAction::Delete { id } => {
            store.delete(&id).await?;
            println!("Recette {id} supprimée.");
        }
        LibraryAction::SetImage { id, image } => {
            store.update_image(&id, &image).await?;
            println!("Image mise à jour.");
        }
    }
    Ok(())
}

fn run_coach(action: CoachAction) {
    match action {
        CoachAction::Bmi { weight, height } => {
            let value = coach::bmi(weight, height);
            let verdict = match coach::bmi_band(value) {
                coach::BmiBand::Underweight => "Maigreur",
                coach::BmiBand::Normal => "Normal",
                coach::BmiBand::Overweight => "Surpoids",
            };
            println!("IMC: {value:.1} ({verdict})");
        }
        CoachAction::Tdee {
            weight,
            height,
            age,
            sex,
            activity,
        } => {
            let maintenance =
                coach::maintenance_calories(weight, height, age, sex.into(), activity.into());
            println!("Maintenance: {maintenance} kcal");
            println!(
                "Sèche: {} kcal | Masse: {} kcal",
                coach::cutting_calories(maintenance),
                coach::bulking_calories(maintenance)
            );
        }
    }
}
