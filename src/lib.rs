//! # spotify-auth
//!
//! Interactive Spotify OAuth 2.0 authorization code flow.
//!
//! The library builds the authorization URL and exchanges the pasted code
//! for a token set. It also appends the refresh token to a dotenv-style
//! file. The `spotify-auth` binary wires these together for a one-time
//! credential bootstrap.
//!
//! ## Features
//!
//! - **Blocking API**: no async runtime required
//! - **Manual code entry**: accepts the bare code or the full redirect URL
//! - **Env file persistence**: append-only `SPOTIFY_REFRESH_TOKEN=...` lines
//! - **Browser Integration** (`browser`, default): opt-in browser launch
//!
//! ## Quick Start
//!
//! ```no_run
//! use spotify_auth::{OAuthClient, OAuthConfig, REFRESH_TOKEN_KEY, append_entry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OAuthConfig::new("client-id", "client-secret", "http://localhost:8888/callback");
//!     let client = OAuthClient::new(config)?;
//!     let flow = client.start_flow()?;
//!
//!     println!("Visit: {}", flow.authorization_url);
//!     // Get code from user...
//!
//!     let tokens = client.exchange_code("code")?;
//!     append_entry(".env", REFRESH_TOKEN_KEY, tokens.refresh_token()?)?;
//!     Ok(())
//! }
//! ```

mod client;
mod env_file;
mod error;
mod types;

#[cfg(feature = "browser")]
mod browser;

// Public API exports
pub use client::OAuthClient;
pub use env_file::{REFRESH_TOKEN_KEY, append_entry, find_entries};
pub use error::{Result, SpotifyAuthError};
pub use types::{
    DEFAULT_SCOPES, OAuthConfig, OAuthConfigBuilder, OAuthFlow, SPOTIFY_AUTH_URL,
    SPOTIFY_TOKEN_URL, TokenSet, mask_token,
};

#[cfg(feature = "browser")]
pub use browser::open_browser;
