pub mod catalog;
pub mod config;
pub mod ipc;
pub mod listening;
mod lock;
pub mod navigator;
pub mod recipe;
pub mod session;
pub mod speech;
mod telemetry;
pub mod timer;

mod app;

pub(crate) use lock::lock_or_recover;
pub use app::*;
pub use catalog::{Favorites, RecipeCatalog};
pub use recipe::{Instruction, Recipe, RecipeScript, RecipeStore, StoreError};
pub use session::{SessionSnapshot, VoiceSession};
