use thiserror::Error;

/// All errors produced by the payments dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The HTTP request failed before a response was received, or the body
    /// could not be read.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a non-success HTTP status.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// The API answered, but the payload did not have the expected shape.
    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    /// No bundled user matched the supplied email and password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// An operation needs a logged-in operator but none is stored.
    #[error("Not logged in; run `payments-dashboard login` first")]
    NotAuthenticated,

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
