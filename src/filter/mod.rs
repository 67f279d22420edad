pub mod types;
pub mod recipe_filter;
pub mod error;

pub use types::*;
pub use error::FilterError;
