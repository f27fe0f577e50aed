//! Errors for the fallible edges of the crate: JSON input, filter expressions
//! and sort specs. The pipeline itself never fails.

/// Error type for parsing and loading operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level JSON value was not an array of rows.
    #[error("expected a JSON array of rows")]
    NotAnArray,

    #[error("invalid filter expression: {message}")]
    Parse { message: String },

    /// A filter term mixes several columns, which a per-column filter
    /// mapping cannot express.
    #[error("filter term references more than one column: {}", columns.join(", "))]
    CrossColumn { columns: Vec<String> },

    #[error("invalid sort spec '{spec}', expected `column[:asc|:desc]`")]
    InvalidSort { spec: String },

    #[error("configuration error in {name}: {message}")]
    Config { name: String, message: String },
}

impl ViewError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn config(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            name: name.into(),
            message: message.into(),
        }
    }
}
