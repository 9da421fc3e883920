use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{Result, SpotifyAuthError};

/// Permission scopes requested by the authorizer.
pub const DEFAULT_SCOPES: &str = "user-read-playback-state user-modify-playback-state \
user-read-currently-playing playlist-read-private app-remote-control streaming user-library-read";

/// Spotify accounts service authorization endpoint.
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Spotify accounts service token endpoint.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Token set returned by a successful code exchange
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// The access token used to authenticate Web API requests
    pub access_token: String,
    /// Usually "Bearer"
    pub token_type: String,
    /// Space-separated scopes actually granted
    pub scope: String,
    /// Long-lived credential for obtaining new access tokens.
    ///
    /// Spotify includes it for the authorization code grant, but the field is
    /// optional on the wire. Use [`TokenSet::refresh_token`] to require it.
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) when the access token expires
    pub expires_at: u64,
}

impl TokenSet {
    /// The refresh token, or [`SpotifyAuthError::MissingRefreshToken`] if the
    /// provider did not return one.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(SpotifyAuthError::MissingRefreshToken)
    }

    /// Get the duration until the access token expires
    ///
    /// Returns `Duration::ZERO` if the token is already expired.
    pub fn expires_in(&self) -> Duration {
        let now = unix_now();
        if self.expires_at > now {
            Duration::from_secs(self.expires_at - now)
        } else {
            Duration::ZERO
        }
    }
}

/// Authorization request handed to the user
#[derive(Debug, Clone)]
pub struct OAuthFlow {
    /// The URL the user should visit to authorize the application
    pub authorization_url: String,
    /// The CSRF state token sent with the request
    pub state: String,
}

/// Configuration for the Spotify OAuth client
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Application client ID from the Spotify developer dashboard
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
    /// Redirect URI registered for the application
    pub redirect_uri: String,
    /// Space-separated scopes (default: [`DEFAULT_SCOPES`])
    pub scope: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token exchange endpoint URL
    pub token_url: String,
    /// Force the consent dialog even if the user already approved the app
    pub show_dialog: bool,
}

impl OAuthConfig {
    /// Create a config for the given credentials with Spotify's endpoints and
    /// the default scopes
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self::builder(client_id, client_secret, redirect_uri).build()
    }

    /// Create a new config builder
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> OAuthConfigBuilder {
        OAuthConfigBuilder {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: None,
            auth_url: None,
            token_url: None,
            show_dialog: false,
        }
    }
}

/// Builder for OAuthConfig
#[derive(Debug, Clone)]
pub struct OAuthConfigBuilder {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: Option<String>,
    auth_url: Option<String>,
    token_url: Option<String>,
    show_dialog: bool,
}

impl OAuthConfigBuilder {
    /// Override the requested scopes
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the authorization endpoint URL
    pub fn auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Set the token exchange endpoint URL
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    /// Force the consent dialog on every authorization
    pub fn show_dialog(mut self, show_dialog: bool) -> Self {
        self.show_dialog = show_dialog;
        self
    }

    /// Build the OAuthConfig
    pub fn build(self) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            scope: self.scope.unwrap_or_else(|| DEFAULT_SCOPES.to_string()),
            auth_url: self.auth_url.unwrap_or_else(|| SPOTIFY_AUTH_URL.to_string()),
            token_url: self
                .token_url
                .unwrap_or_else(|| SPOTIFY_TOKEN_URL.to_string()),
            show_dialog: self.show_dialog,
        }
    }
}

/// Token response from the accounts service
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        TokenSet {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: response.scope.unwrap_or_default(),
            refresh_token: response.refresh_token,
            expires_at: unix_now() + response.expires_in.unwrap_or(3600),
        }
    }
}

/// Error body returned by the token endpoint on a failed grant
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Generate a random state string for CSRF protection
pub(crate) fn generate_random_state() -> String {
    use base64::{Engine as _, engine::general_purpose};
    use rand::RngCore;

    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Shorten a secret for log output, keeping a short prefix and suffix.
pub fn mask_token(token: &str) -> String {
    const PREFIX_LEN: usize = 6;
    const SUFFIX_LEN: usize = 4;

    let trimmed = token.trim();
    let len = trimmed.len();
    if len <= PREFIX_LEN + SUFFIX_LEN || !trimmed.is_ascii() {
        return "*".repeat(len.min(8));
    }
    format!("{}...{}", &trimmed[..PREFIX_LEN], &trimmed[len - SUFFIX_LEN..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_spotify_endpoints_and_fixed_scopes() {
        let config = OAuthConfig::new("id", "secret", "http://localhost:8888/callback");
        assert_eq!(config.auth_url, SPOTIFY_AUTH_URL);
        assert_eq!(config.token_url, SPOTIFY_TOKEN_URL);
        assert_eq!(
            config.scope,
            "user-read-playback-state user-modify-playback-state user-read-currently-playing \
playlist-read-private app-remote-control streaming user-library-read"
        );
        assert!(!config.show_dialog);
    }

    #[test]
    fn builder_overrides_endpoints() {
        let config = OAuthConfig::builder("id", "secret", "http://localhost/cb")
            .auth_url("http://127.0.0.1:9000/authorize")
            .token_url("http://127.0.0.1:9000/api/token")
            .scope("streaming")
            .show_dialog(true)
            .build();
        assert_eq!(config.auth_url, "http://127.0.0.1:9000/authorize");
        assert_eq!(config.token_url, "http://127.0.0.1:9000/api/token");
        assert_eq!(config.scope, "streaming");
        assert!(config.show_dialog);
    }

    #[test]
    fn token_response_without_refresh_token_is_reported() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"BQD","token_type":"Bearer","expires_in":3600}"#,
        )
        .unwrap();
        let tokens = TokenSet::from(response);
        assert!(matches!(
            tokens.refresh_token(),
            Err(SpotifyAuthError::MissingRefreshToken)
        ));
    }

    #[test]
    fn token_response_maps_fields() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"BQD","token_type":"Bearer","scope":"streaming","expires_in":120,"refresh_token":"AQC"}"#,
        )
        .unwrap();
        let tokens = TokenSet::from(response);
        assert_eq!(tokens.refresh_token().unwrap(), "AQC");
        assert_eq!(tokens.scope, "streaming");
        assert!(tokens.expires_in() <= Duration::from_secs(120));
        assert!(tokens.expires_in() > Duration::from_secs(60));
    }

    #[test]
    fn random_state_is_url_safe() {
        let state = generate_random_state();
        assert_eq!(state.len(), 22);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(state, generate_random_state());
    }

    #[test]
    fn mask_token_keeps_prefix_and_suffix() {
        assert_eq!(mask_token("AQCabcdef1234567890"), "AQCabc...7890");
        assert_eq!(mask_token("abcd"), "****");
    }
}
