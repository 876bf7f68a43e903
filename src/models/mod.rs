mod collection;
mod recipe;
mod taxonomy;
mod user;

pub use collection::RecipeCollection;
pub use recipe::{Difficulty, NutritionalInfo, Rating, Recipe, RecipeInput};
pub use taxonomy::Taxon;
pub use user::{User, UserProfile};
