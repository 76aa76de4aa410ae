use arrow_schema::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Invalid fandom config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Row {row}: unknown gender {value:?} (expected f, m or other)")]
    InvalidGender { row: usize, value: String },

    #[error("Missing column {0:?}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
