// handlers/public/mod.rs - Endpoints reachable without a token
//
// Service banner, health check, registration and token acquisition.

pub mod root;
pub mod user;

pub use root::{health_get, root_get};
pub use user::{create_post as user_create_post, token_post as user_token_post};
