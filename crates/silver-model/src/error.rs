use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("record for {category} has {actual} cells, schema declares {expected}")]
    RecordWidth {
        category: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
