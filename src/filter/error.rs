use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid id in '{param}': {value}")]
    InvalidId { param: String, value: String },

    #[error("Invalid flag in '{param}': {value}")]
    InvalidFlag { param: String, value: String },
}
