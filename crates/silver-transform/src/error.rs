use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{category} source table has no column '{column}'")]
    MissingColumn { category: String, column: String },
    #[error("{category} source table has an empty header")]
    EmptyHeader { category: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
