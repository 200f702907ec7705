use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Wrong password!")]
    Authentication,

    #[error("Stored secret is corrupt: {0}")]
    CorruptSecret(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// An expected form, field or select option is missing from a remote page.
    #[error("{0} not found!")]
    Protocol(String),

    #[error("Not logged in, call login() before using the session")]
    NotAuthenticated,

    #[error("An entry was already submitted with this session")]
    AlreadySubmitted,

    #[error("Request failed with code: {code} and message {body}")]
    Remote { code: u16, body: String },

    #[error("Invalid {label} selection '{position}' (expected 1..={len})")]
    Selection {
        label: String,
        position: String,
        len: usize,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
