use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(noteplane::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(noteplane::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(noteplane::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(noteplane::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("Bad request: {0}")]
    #[diagnostic(code(noteplane::bad_request))]
    BadRequest(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(noteplane::not_found))]
    NotFound(String),

    #[error("{0}")]
    #[diagnostic(code(noteplane::other))]
    Other(String),
}
