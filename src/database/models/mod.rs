pub mod label;
pub mod recipe;
pub mod user;

pub use label::{Label, LabelKind};
pub use recipe::{NewRecipe, Recipe, RecipeChanges};
pub use user::{NewUser, User, UserChanges};
