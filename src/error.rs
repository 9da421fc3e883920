use thiserror::Error;

/// Error types for Spotify OAuth authentication
#[derive(Error, Debug)]
pub enum SpotifyAuthError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid authorization code")]
    InvalidAuthorizationCode,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("State mismatch in authorization response")]
    StateMismatch,

    #[error("Token response did not contain a refresh token")]
    MissingRefreshToken,

    #[error("OAuth error: {error}{}", describe(.description))]
    OAuth {
        error: String,
        description: Option<String>,
    },

    #[error("HTTP error: {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "browser")]
    #[error("Failed to open browser: {0}")]
    BrowserLaunch(String),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Result type alias for Spotify authentication operations
pub type Result<T> = std::result::Result<T, SpotifyAuthError>;
