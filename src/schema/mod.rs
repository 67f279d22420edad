//! Request validation and response representations for the HTTP API.

pub mod fields;
pub mod image;
pub mod label;
pub mod recipe;
pub mod user;

pub use fields::WriteMode;
pub use image::RecipeImageRepr;
pub use label::{LabelRepr, LabelWrite};
pub use recipe::{RecipeBase, RecipeDetail, RecipeSummary, RecipeWrite};
pub use user::{TokenRepr, TokenRequest, UserCreate, UserRepr, UserUpdate};
