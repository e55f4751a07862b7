use serenity::model::id::UserId;
use thiserror::Error;

/// Failures the benchmark commands know how to explain to a user.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("missing a staff role")]
    PermissionDenied,
    #[error("user {0} has no recorded benchmark")]
    NotFound(UserId),
    #[error("the GPU model catalog is empty")]
    EmptyCatalog,
    #[error("{0}")]
    Malformed(String),
    #[error("no score was submitted in time")]
    TimedOut,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("database connection lock was poisoned")]
    StorePoisoned,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// The text shown in chat, or `None` for failures only operators should see.
    pub fn user_message(&self) -> Option<String> {
        match self {
            BenchError::PermissionDenied => Some("⛔ You need a staff role to use this command.".to_string()),
            BenchError::NotFound(user) => Some(format!("⚠️ <@{}> has not submitted any benchmark yet.", user.get())),
            BenchError::EmptyCatalog => Some("⚠️ No GPU models available. Please add GPU models using `benchset gpumodels add <model>`.".to_string()),
            BenchError::Malformed(reason) => Some(format!("⚠️ {reason}")),
            BenchError::TimedOut => Some("⏳ You didn't submit a score in time. Try again.".to_string()),
            BenchError::Database(_) | BenchError::StorePoisoned | BenchError::Io(_) => None,
        }
    }
}
