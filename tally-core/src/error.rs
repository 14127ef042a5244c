use serde::Serialize;
use thiserror::Error;

/// The transaction file as a whole could not be loaded.
#[derive(Debug, Error)]
pub enum FileFormatError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),
    #[error("could not read transactions: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Csv { line: Option<u64>, message: String },
}

/// Why a single row was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RowErrorKind {
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("empty description")]
    EmptyDescription,
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("row is not valid UTF-8")]
    InvalidEncoding,
}

/// A row that could not be parsed. Recoverable: the loader may skip it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("line {line}: {kind}")]
pub struct RowParseError {
    pub line: u64,
    #[source]
    pub kind: RowErrorKind,
}

impl RowParseError {
    pub fn new(line: u64, kind: RowErrorKind) -> Self {
        Self { line, kind }
    }
}

/// The category mapping document is malformed.
#[derive(Debug, Error)]
pub enum MappingLoadError {
    #[error("could not read category mapping: {0}")]
    Io(#[from] std::io::Error),
    #[error("category mapping is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("category mapping must be a JSON object")]
    NotAnObject,
    #[error("mapping entry `{key}` must be a string or an array of strings")]
    InvalidEntry { key: String },
}

/// Any failure that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    FileFormat(#[from] FileFormatError),
    #[error("row rejected: {0}")]
    Row(#[from] RowParseError),
    #[error(transparent)]
    Mapping(#[from] MappingLoadError),
}

pub type Result<T, E = TallyError> = std::result::Result<T, E>;
