use super::{AppConfig, RunMode};
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

const MAX_QUERY_CHARS: usize = 200;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize ids and queries.
    pub fn validate(&mut self) -> Result<()> {
        if self.lang.trim().is_empty() {
            bail!("--lang must not be empty");
        }
        if !self
            .lang
            .chars()
            .all(|ch| ch.is_ascii_alphabetic() || ch == '-' || ch == '_')
        {
            bail!("--lang must contain only alphabetic characters or '-'/'_' separators");
        }
        let primary_len = self.lang.split(['-', '_']).next().unwrap_or("").len();
        if !(2..=3).contains(&primary_len) {
            bail!(
                "--lang must start with a two or three letter language code, got '{}'",
                self.lang
            );
        }

        if !(1..=4096).contains(&self.command_channel_capacity) {
            bail!(
                "--command-channel-capacity must be between 1 and 4096, got {}",
                self.command_channel_capacity
            );
        }

        self.recipe = normalize_id(self.recipe.take(), "--recipe")?;
        self.show_recipe = normalize_id(self.show_recipe.take(), "--show-recipe")?;
        self.save_favorite = normalize_id(self.save_favorite.take(), "--save-favorite")?;
        self.remove_favorite = normalize_id(self.remove_favorite.take(), "--remove-favorite")?;

        if let Some(query) = self.search.as_mut() {
            let trimmed = query.trim();
            if trimmed.is_empty() {
                bail!("--search must not be empty");
            }
            if trimmed.chars().count() > MAX_QUERY_CHARS {
                bail!("--search is limited to {MAX_QUERY_CHARS} characters");
            }
            *query = trimmed.to_string();
        }
        if !self.tags.is_empty() && self.search.is_none() {
            bail!("--tag only applies together with --search");
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            bail!("--tag must not be empty");
        }

        let needs_favorites =
            self.save_favorite.is_some() || self.remove_favorite.is_some() || self.show_favorites;
        if needs_favorites && self.favorites.is_none() {
            bail!("--save-favorite, --remove-favorite and --show-favorites require --favorites <FILE>");
        }

        let selected = [
            self.recipe.is_some(),
            self.show_recipe.is_some(),
            self.search.is_some(),
            self.list_recipes,
            self.save_favorite.is_some(),
            self.remove_favorite.is_some(),
            self.show_favorites,
        ]
        .iter()
        .filter(|flag| **flag)
        .count();
        if selected > 1 {
            bail!(
                "choose one of --recipe, --show-recipe, --search, --list-recipes, --save-favorite, --remove-favorite, --show-favorites"
            );
        }

        Ok(())
    }

    /// Resolve the action for a validated config. Defaults to listing recipes.
    pub fn run_mode(&self) -> RunMode {
        if let Some(recipe_id) = &self.recipe {
            return RunMode::Session {
                recipe_id: recipe_id.clone(),
            };
        }
        if let Some(recipe_id) = &self.show_recipe {
            return RunMode::ShowRecipe {
                recipe_id: recipe_id.clone(),
            };
        }
        if let Some(query) = &self.search {
            return RunMode::Search {
                query: query.clone(),
                tags: self.tags.clone(),
            };
        }
        if let Some(recipe_id) = &self.save_favorite {
            return RunMode::SaveFavorite {
                recipe_id: recipe_id.clone(),
            };
        }
        if let Some(recipe_id) = &self.remove_favorite {
            return RunMode::RemoveFavorite {
                recipe_id: recipe_id.clone(),
            };
        }
        if self.show_favorites {
            return RunMode::ShowFavorites;
        }
        RunMode::ListRecipes
    }

    /// Favorites file when one was configured.
    pub fn favorites_path(&self) -> Option<&PathBuf> {
        self.favorites.as_ref()
    }
}

/// Document ids are opaque tokens: trimmed, non-empty, no whitespace or path separators.
pub(super) fn normalize_id(value: Option<String>, flag: &str) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} must not be empty");
    }
    if trimmed
        .chars()
        .any(|ch| ch.is_whitespace() || ch == '/' || ch == '\\' || ch.is_control())
    {
        bail!("{flag} must not contain whitespace or path separators, got '{trimmed}'");
    }
    Ok(Some(trimmed.to_string()))
}
