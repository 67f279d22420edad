// handlers/protected/mod.rs - Endpoints behind `require_auth`
//
// Every handler receives `Extension<AuthUser>` and passes the user id to the
// store, so rows owned by someone else are never visible.

pub mod label;
pub mod recipe;
pub mod recipe_image;
pub mod user;

pub use label::{ingredients, tags};
pub use recipe_image::upload_image_post;
pub use user::{me_get, me_patch};
