use crate::{Result, SpotifyAuthError};

/// Open a URL in the user's default web browser
///
/// The authorizer never calls this on its own; the caller opts in.
///
/// # Errors
///
/// Returns an error if the browser cannot be launched
///
/// # Example
///
/// ```no_run
/// use spotify_auth::{OAuthClient, OAuthConfig, open_browser};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OAuthConfig::new("client-id", "client-secret", "http://localhost:8888/callback");
/// let flow = OAuthClient::new(config)?.start_flow()?;
///
/// open_browser(&flow.authorization_url)?;
/// # Ok(())
/// # }
/// ```
pub fn open_browser(url: &str) -> Result<()> {
    webbrowser::open(url).map_err(|e| SpotifyAuthError::BrowserLaunch(e.to_string()))
}
