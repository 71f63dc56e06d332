//! Command-line parsing and validation helpers.

mod validation;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Default catalog file looked up in the working directory.
pub const DEFAULT_RECIPES_FILE: &str = "recipes.json";

/// Bounded stdin command queue between the reader thread and the session loop.
pub const DEFAULT_COMMAND_CHANNEL_CAPACITY: usize = 64;

/// CLI options for VoxChef.
#[derive(Debug, Parser, Clone)]
#[command(about = "VoxChef voice-guided recipe walkthrough", author, version)]
pub struct AppConfig {
    /// JSON recipe catalog (array of recipe documents with an `id` field)
    #[arg(long, env = "VOXCHEF_RECIPES", default_value = DEFAULT_RECIPES_FILE)]
    pub recipes: PathBuf,

    /// Start a voice session for the recipe with this id (JSON-lines on stdin/stdout)
    #[arg(long, value_name = "ID")]
    pub recipe: Option<String>,

    /// Print one recipe's details (ingredients, equipment, steps, tips) and exit
    #[arg(long = "show-recipe", value_name = "ID")]
    pub show_recipe: Option<String>,

    /// Print every recipe in the catalog and exit
    #[arg(long = "list-recipes", default_value_t = false)]
    pub list_recipes: bool,

    /// Search recipe titles (case-insensitive substring) and exit
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Require this tag on search results (repeatable)
    #[arg(long = "tag", action = ArgAction::Append, value_name = "TAG")]
    pub tags: Vec<String>,

    /// JSON file holding the favorites list (array of recipe ids)
    #[arg(long, env = "VOXCHEF_FAVORITES", value_name = "FILE")]
    pub favorites: Option<PathBuf>,

    /// Add a recipe id to the favorites file
    #[arg(long = "save-favorite", value_name = "ID")]
    pub save_favorite: Option<String>,

    /// Remove a recipe id from the favorites file
    #[arg(long = "remove-favorite", value_name = "ID")]
    pub remove_favorite: Option<String>,

    /// Print the saved favorites and exit
    #[arg(long = "show-favorites", default_value_t = false)]
    pub show_favorites: bool,

    /// Language tag reported to the speech host
    #[arg(long, default_value = "en-US")]
    pub lang: String,

    /// Stdin command queue capacity
    #[arg(
        long = "command-channel-capacity",
        default_value_t = DEFAULT_COMMAND_CHANNEL_CAPACITY
    )]
    pub command_channel_capacity: usize,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "VOXCHEF_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VOXCHEF_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging recognized utterances (debug log only)
    #[arg(
        long = "log-content",
        env = "VOXCHEF_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

/// What the binary should do with a validated config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Session { recipe_id: String },
    ShowRecipe { recipe_id: String },
    Search { query: String, tags: Vec<String> },
    ListRecipes,
    SaveFavorite { recipe_id: String },
    RemoveFavorite { recipe_id: String },
    ShowFavorites,
}
