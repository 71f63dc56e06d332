//! VoxChef entrypoint: catalog queries, favorites upkeep, and the voice session.
//!
//! Catalog and favorites modes print one recipe per line (`id<TAB>title`) and
//! exit. `--show-recipe <id>` prints one recipe in full. `--recipe <id>` hands
//! stdin/stdout to the JSON-lines session protocol until the host sends `quit`
//! or closes stdin.

use anyhow::{bail, Context, Result};
use std::panic;
use std::path::Path;
use voxchef::config::{AppConfig, RunMode};
use voxchef::ipc::run_ipc_mode;
use voxchef::{
    init_logging, log_debug, log_file_path, log_panic, Favorites, Recipe, RecipeCatalog,
};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    install_panic_hook();
    log_debug("=== VoxChef Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let catalog = RecipeCatalog::load(&config.recipes).with_context(|| {
        format!(
            "failed to load recipe catalog {}",
            config.recipes.display()
        )
    })?;

    match config.run_mode() {
        RunMode::Session { recipe_id } => run_ipc_mode(&config, &catalog, &recipe_id)?,
        RunMode::ShowRecipe { recipe_id } => match catalog.get(&recipe_id) {
            Some(recipe) => println!("{}", recipe.describe()),
            None => bail!("unknown recipe id '{recipe_id}'"),
        },
        RunMode::ListRecipes => print_recipes(catalog.list()),
        RunMode::Search { query, tags } => {
            let hits = catalog.search(&query, &tags);
            if hits.is_empty() {
                eprintln!("No recipes match \"{query}\"");
            }
            print_recipes(hits);
        }
        RunMode::SaveFavorite { recipe_id } => {
            if catalog.get(&recipe_id).is_none() {
                bail!("unknown recipe id '{recipe_id}'");
            }
            let path = favorites_file(&config)?;
            let mut favorites = Favorites::load(path)?;
            if favorites.add(&recipe_id) {
                favorites.save(path)?;
                println!("Saved {recipe_id} to favorites");
            } else {
                println!("{recipe_id} is already a favorite");
            }
        }
        RunMode::RemoveFavorite { recipe_id } => {
            let path = favorites_file(&config)?;
            let mut favorites = Favorites::load(path)?;
            if favorites.remove(&recipe_id) {
                favorites.save(path)?;
                println!("Removed {recipe_id} from favorites");
            } else {
                println!("{recipe_id} is not a favorite");
            }
        }
        RunMode::ShowFavorites => {
            let favorites = Favorites::load(favorites_file(&config)?)?;
            print_recipes(favorites.resolve(&catalog));
        }
    }
    log_debug("=== VoxChef Exiting ===");
    Ok(())
}

fn favorites_file(config: &AppConfig) -> Result<&Path> {
    match config.favorites_path() {
        Some(path) => Ok(path.as_path()),
        None => bail!("--favorites <FILE> is required"),
    }
}

fn print_recipes<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) {
    for recipe in recipes {
        println!("{}\t{}", recipe.id, recipe.title.trim());
    }
}

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        log_debug(&format!("panic at {location}"));
        previous(info);
    }));
}
