use base64::{Engine as _, engine::general_purpose};
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::types::{ErrorResponse, TokenResponse};
use crate::{OAuthConfig, OAuthFlow, Result, SpotifyAuthError, TokenSet};

/// Spotify OAuth client for the authorization code flow
///
/// This client builds the authorization URL the user has to visit and
/// exchanges the returned code for tokens using blocking I/O.
///
/// # Example
///
/// ```no_run
/// use spotify_auth::{OAuthClient, OAuthConfig};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = OAuthConfig::new("client-id", "client-secret", "http://localhost:8888/callback");
///     let client = OAuthClient::new(config)?;
///     let flow = client.start_flow()?;
///
///     println!("Visit: {}", flow.authorization_url);
///     // User authorizes and pastes the redirect URL or code...
///
///     let code = client.parse_response_code("pasted", &flow.state)?;
///     let tokens = client.exchange_code(&code)?;
///     println!("Refresh token: {}", tokens.refresh_token()?);
///     Ok(())
/// }
/// ```
pub struct OAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// The credentials are passed through untouched. Only the endpoint URLs
    /// are checked here.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyAuthError::InvalidConfig`] if either endpoint is not a
    /// valid URL
    pub fn new(config: OAuthConfig) -> Result<Self> {
        for (name, endpoint) in [("auth_url", &config.auth_url), ("token_url", &config.token_url)]
        {
            Url::parse(endpoint).map_err(|e| {
                SpotifyAuthError::InvalidConfig(format!("{name} {endpoint:?}: {e}"))
            })?;
        }

        let http = Client::builder().build()?;
        Ok(Self { config, http })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Start the OAuth authorization flow
    ///
    /// Generates a fresh CSRF state and the authorization URL the user should
    /// visit. Nothing is opened or sent.
    pub fn start_flow(&self) -> Result<OAuthFlow> {
        let state = crate::types::generate_random_state();

        let mut url = Url::parse(&self.config.auth_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("scope", &self.config.scope)
                .append_pair("state", &state);
            if self.config.show_dialog {
                query.append_pair("show_dialog", "true");
            }
        }

        debug!(auth_url = %self.config.auth_url, "built authorization url");
        Ok(OAuthFlow {
            authorization_url: url.to_string(),
            state,
        })
    }

    /// Extract the authorization code from what the user pasted
    ///
    /// Accepts either the bare code or the full URL the browser was
    /// redirected to. For a URL, the `error` and `state` parameters are
    /// checked before the `code` is returned.
    ///
    /// # Errors
    ///
    /// - [`SpotifyAuthError::InvalidAuthorizationCode`] if no code is present
    /// - [`SpotifyAuthError::AuthorizationDenied`] if the user declined
    /// - [`SpotifyAuthError::StateMismatch`] if the state differs from
    ///   `expected_state`
    pub fn parse_response_code(&self, input: &str, expected_state: &str) -> Result<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SpotifyAuthError::InvalidAuthorizationCode);
        }

        // Bare codes never carry an authority, so only host-bearing URLs are
        // treated as redirects.
        let Some(url) = Url::parse(input).ok().filter(Url::has_host) else {
            return Ok(input.to_string());
        };

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => return Err(SpotifyAuthError::AuthorizationDenied(value.into_owned())),
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }

        if state.is_some_and(|s| s != expected_state) {
            return Err(SpotifyAuthError::StateMismatch);
        }

        code.filter(|c| !c.is_empty())
            .ok_or(SpotifyAuthError::InvalidAuthorizationCode)
    }

    /// Exchange an authorization code for access and refresh tokens
    ///
    /// The client authenticates with HTTP Basic credentials, as the
    /// accounts service expects for confidential clients.
    ///
    /// # Errors
    ///
    /// - [`SpotifyAuthError::OAuth`] if the token endpoint rejects the grant
    ///   (expired or reused code, bad credentials, redirect URI mismatch)
    /// - [`SpotifyAuthError::Http`] for other non-success responses
    /// - [`SpotifyAuthError::Network`] if the request could not be sent or
    ///   the body could not be decoded
    pub fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .header("Authorization", self.basic_auth_header())
            .form(&params)
            .send()?;

        let status = response.status();
        debug!(%status, token_url = %self.config.token_url, "token exchange response");

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => SpotifyAuthError::OAuth {
                    error: err.error,
                    description: err.error_description,
                },
                Err(_) => SpotifyAuthError::Http {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let token_response: TokenResponse = response.json()?;
        Ok(TokenSet::from(token_response))
    }

    fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }
}
