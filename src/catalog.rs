//! Session-scoped recipe catalog and favorites list.
//!
//! Both are plain values loaded from JSON files and handed to whoever needs
//! them; nothing here is global.

use crate::recipe::{Recipe, RecipeScript, RecipeStore, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Parse a JSON array of recipe documents. `origin` is only used in errors.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, StoreError> {
        let recipes: Vec<Recipe> =
            serde_json::from_str(json).map_err(|source| StoreError::Malformed {
                path: origin.to_path_buf(),
                source,
            })?;
        Ok(Self::new(recipes))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json, path)?;
        crate::log_debug(&format!(
            "loaded {} recipes from {}",
            catalog.recipes.len(),
            path.display()
        ));
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes with a non-blank title, in file order.
    pub fn list(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().filter(|recipe| recipe.has_title())
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Titles containing `query` (case-insensitive) that carry every tag in `tags`.
    /// A blank query matches nothing.
    pub fn search(&self, query: &str, tags: &[String]) -> Vec<&Recipe> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.list()
            .filter(|recipe| recipe.title.to_lowercase().contains(&needle))
            .filter(|recipe| tags.iter().all(|tag| recipe.has_tag(tag)))
            .collect()
    }
}

impl RecipeStore for RecipeCatalog {
    fn fetch_recipe(&self, id: &str) -> Result<RecipeScript, StoreError> {
        self.get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .script()
    }
}

/// Saved recipe ids. Adding an id that is already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: Vec<String>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON array of ids. A missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let ids: Vec<String> =
            serde_json::from_str(&json).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        let mut favorites = Self::new();
        for id in ids {
            favorites.add(&id);
        }
        Ok(favorites)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.ids).map_err(|source| {
            StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, format!("{json}\n")).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|saved| saved == id)
    }

    /// Returns false when `id` was already saved.
    pub fn add(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Returns false when `id` was not saved.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|saved| saved != id);
        self.ids.len() != before
    }

    /// Saved recipes that still exist in `catalog`, in catalog order.
    pub fn resolve<'a>(&self, catalog: &'a RecipeCatalog) -> Vec<&'a Recipe> {
        catalog.list().filter(|recipe| self.contains(&recipe.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Instruction;
    use std::env;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const CATALOG_JSON: &str = r#"[
        {"id": "k1", "title": "Kachori", "tags": ["Snack", "Fried"],
         "instructions": ["Knead the dough", {"text": "Fry", "timer": "8 min"}]},
        {"id": "p1", "title": "Pink Sauce Pasta (Vegetarian)", "tags": ["vegetarian"],
         "instructions": ["Boil pasta"]},
        {"id": "z1", "title": "Keema Pizza", "tags": ["Dinner"], "instructions": ["Bake"]},
        {"id": "blank", "title": "  ", "instructions": ["Nothing"]},
        {"id": "empty", "title": "Empty Steps"}
    ]"#;

    fn catalog() -> RecipeCatalog {
        RecipeCatalog::from_json_str(CATALOG_JSON, Path::new("test.json")).expect("catalog")
    }

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        env::temp_dir().join(format!("voxchef_{name}_{nanos}.json"))
    }

    #[test]
    fn list_skips_untitled_recipes() {
        let catalog = catalog();
        let ids: Vec<&str> = catalog.list().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "p1", "z1", "empty"]);
    }

    #[test]
    fn search_matches_title_substring_case_insensitively() {
        let catalog = catalog();
        let hits: Vec<&str> = catalog.search("PI", &[]).into_iter().map(|r| r.id.as_str()).collect();
        assert_eq!(hits, vec!["p1", "z1"]);
        assert!(catalog.search("   ", &[]).is_empty());
        assert!(catalog.search("nothing", &[]).is_empty());
    }

    #[test]
    fn search_requires_every_tag() {
        let catalog = catalog();
        let tags = vec!["snack".to_string(), "FRIED".to_string()];
        let hits = catalog.search("kachori", &tags);
        assert_eq!(hits.len(), 1);
        let tags = vec!["snack".to_string(), "dinner".to_string()];
        assert!(catalog.search("k", &tags).is_empty());
    }

    #[test]
    fn fetch_recipe_reports_missing_and_empty() {
        let catalog = catalog();
        let script = catalog.fetch_recipe("k1").expect("script");
        assert_eq!(script.len(), 2);
        assert_eq!(
            script.get(1),
            Some(&Instruction::Timed {
                text: "Fry".to_string(),
                timer: Some("8 min".to_string())
            })
        );
        assert!(catalog.fetch_recipe("nope").expect_err("missing").is_not_found());
        assert!(matches!(
            catalog.fetch_recipe("empty"),
            Err(StoreError::EmptyScript(_))
        ));
    }

    #[test]
    fn malformed_catalog_is_reported_with_path() {
        let err = RecipeCatalog::from_json_str("{not json", Path::new("broken.json"))
            .expect_err("malformed");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn favorites_add_is_idempotent_and_remove_reports_change() {
        let mut favorites = Favorites::new();
        assert!(favorites.add("k1"));
        assert!(!favorites.add("k1"));
        assert!(favorites.add("z1"));
        assert_eq!(favorites.ids(), ["k1".to_string(), "z1".to_string()]);
        assert!(favorites.remove("k1"));
        assert!(!favorites.remove("k1"));
        assert!(!favorites.contains("k1"));
    }

    #[test]
    fn favorites_resolve_against_catalog() {
        let catalog = catalog();
        let mut favorites = Favorites::new();
        favorites.add("z1");
        favorites.add("gone");
        favorites.add("k1");
        let ids: Vec<&str> = favorites
            .resolve(&catalog)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["k1", "z1"]);
    }

    #[test]
    fn favorites_round_trip_through_file() {
        let path = temp_path("favorites");
        assert_eq!(Favorites::load(&path).expect("missing file"), Favorites::new());

        let mut favorites = Favorites::new();
        favorites.add("p1");
        favorites.save(&path).expect("save");
        let loaded = Favorites::load(&path).expect("load");
        assert!(loaded.contains("p1"));
        let _ = fs::remove_file(&path);
    }
}
