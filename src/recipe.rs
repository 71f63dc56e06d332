//! Recipe documents and the read-only store seam the voice session loads from.
//!
//! Instructions arrive either as bare strings or as `{ "text", "timer" }`
//! objects; both shapes deserialize into [`Instruction`].

use crate::timer::parse_duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One recipe step, optionally carrying a free-text timer such as `"10 min"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Plain(String),
    Timed {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timer: Option<String>,
    },
}

impl Instruction {
    pub fn text(&self) -> &str {
        match self {
            Instruction::Plain(text) => text,
            Instruction::Timed { text, .. } => text,
        }
    }

    pub fn timer_text(&self) -> Option<&str> {
        match self {
            Instruction::Plain(_) => None,
            Instruction::Timed { timer, .. } => timer.as_deref(),
        }
    }

    /// Timer length in seconds, or 0 when the step has no usable timer.
    pub fn timer_seconds(&self) -> u64 {
        self.timer_text().map(parse_duration).unwrap_or(0)
    }
}

/// Ordered, non-empty instruction list for one recipe, fixed for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeScript {
    recipe_id: String,
    title: String,
    steps: Vec<Instruction>,
}

impl RecipeScript {
    pub fn new(
        recipe_id: impl Into<String>,
        title: impl Into<String>,
        steps: Vec<Instruction>,
    ) -> Result<Self, StoreError> {
        let recipe_id = recipe_id.into();
        if steps.is_empty() {
            return Err(StoreError::EmptyScript(recipe_id));
        }
        Ok(Self {
            recipe_id,
            title: title.into(),
            steps,
        })
    }

    pub fn recipe_id(&self) -> &str {
        &self.recipe_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a constructed script.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[Instruction] {
        &self.steps
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

/// A catalog document. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yields: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientSection>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub tips_and_variations: Vec<String>,
}

impl Recipe {
    /// Titles that are missing or whitespace-only keep a recipe out of listings.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == wanted)
    }

    pub fn script(&self) -> Result<RecipeScript, StoreError> {
        RecipeScript::new(&self.id, &self.title, self.instructions.clone())
    }

    /// Plain-text detail view. Empty fields and sections are left out.
    pub fn describe(&self) -> String {
        let mut lines = vec![self.title.trim().to_string()];

        let facts: Vec<String> = [
            ("Category", &self.category),
            ("Yields", &self.yields),
            ("Prep", &self.prep_time),
            ("Cook", &self.cook_time),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|value| format!("{label}: {value}")))
        .collect();
        if !facts.is_empty() {
            lines.push(facts.join(" | "));
        }
        if !self.tags.is_empty() {
            lines.push(format!("Tags: {}", self.tags.join(", ")));
        }
        if let Some(description) = self.description.as_deref() {
            lines.push(String::new());
            lines.push(description.to_string());
        }

        if !self.ingredients.is_empty() {
            lines.push(String::new());
            lines.push("Ingredients".to_string());
            for section in &self.ingredients {
                if let Some(name) = section.section.as_deref() {
                    lines.push(format!("  {name}"));
                }
                lines.extend(section.items.iter().map(|item| format!("  - {item}")));
            }
        }
        push_list(&mut lines, "Equipment", &self.equipment);

        if !self.instructions.is_empty() {
            lines.push(String::new());
            lines.push("Instructions".to_string());
            for (index, step) in self.instructions.iter().enumerate() {
                match step.timer_text() {
                    Some(timer) => lines.push(format!("  {}. {} [{timer}]", index + 1, step.text())),
                    None => lines.push(format!("  {}. {}", index + 1, step.text())),
                }
            }
        }
        push_list(&mut lines, "Tips & Variations", &self.tips_and_variations);

        lines.join("\n")
    }
}

fn push_list(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(heading.to_string());
    lines.extend(items.iter().map(|item| format!("  - {item}")));
}

/// Failures surfaced by a [`RecipeStore`] or catalog file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("recipe not found: {0}")]
    NotFound(String),

    #[error("recipe {0} has no instructions")]
    EmptyScript(String),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Read-only recipe lookup used once at session start.
pub trait RecipeStore {
    fn fetch_recipe(&self, id: &str) -> Result<RecipeScript, StoreError>;
}
