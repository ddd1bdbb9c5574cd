use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Schemat kunde inte skapas (korrupt lagring). Fatalt vid start.
    #[error("Schemafel ({entity}): {message}")]
    Schema { entity: String, message: String },

    /// Enskild läsning/skrivning misslyckades
    #[error("Lagringsfel: {0}")]
    Persistence(String),

    /// Transaktionen avbröts, inga rader skrevs
    #[error("Batchfel ({rows} rader): {message}")]
    Batch { rows: usize, message: String },

    #[error("Hittades inte: {0}")]
    NotFound(String),

    #[error("Valideringsfel: {0}")]
    Validation(String),

    #[error("IO-fel: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("serialisering: {}", err))
    }
}

impl AppError {
    pub fn schema(entity: impl Into<String>, msg: impl ToString) -> Self {
        Self::Schema {
            entity: entity.into(),
            message: msg.to_string(),
        }
    }

    pub fn batch(rows: usize, msg: impl ToString) -> Self {
        Self::Batch {
            rows,
            message: msg.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
