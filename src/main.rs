use anyhow::{Context, Error};
use clap::Parser;
use spotify_auth::{
    OAuthClient, OAuthConfig, REFRESH_TOKEN_KEY, SPOTIFY_AUTH_URL, SPOTIFY_TOKEN_URL,
    append_entry, find_entries, mask_token,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Authorize a Spotify application and save its refresh token
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Application client ID
    client_id: String,

    /// Application client secret
    client_secret: String,

    /// Redirect URI registered for the application
    redirect_uri: String,

    /// File the refresh token is appended to
    #[arg(long, env = "SPOTIFY_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,

    /// Also try to open the authorization URL in a browser
    #[cfg(feature = "browser")]
    #[arg(long)]
    open_browser: bool,

    /// Ask Spotify to show the consent dialog even if already approved
    #[arg(long)]
    show_dialog: bool,

    #[arg(long, env = "SPOTIFY_AUTH_URL", default_value = SPOTIFY_AUTH_URL, hide = true)]
    auth_url: String,

    #[arg(long, env = "SPOTIFY_TOKEN_URL", default_value = SPOTIFY_TOKEN_URL, hide = true)]
    token_url: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let config = OAuthConfig::builder(&args.client_id, &args.client_secret, &args.redirect_uri)
        .auth_url(&args.auth_url)
        .token_url(&args.token_url)
        .show_dialog(args.show_dialog)
        .build();
    let client = OAuthClient::new(config).context("create oauth client")?;
    debug!(client_id = %client.config().client_id, scope = %client.config().scope, "starting authorization");

    let flow = client.start_flow().context("build authorization url")?;
    println!(
        "Please open the following URL in your browser to authorize the application: {}",
        flow.authorization_url
    );

    open_in_browser(&args, &flow.authorization_url);

    print!("Enter the authorization code from the URL: ");
    io::stdout().flush().context("flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("read authorization code")?;
    let code = client
        .parse_response_code(&input, &flow.state)
        .context("parse authorization response")?;

    let tokens = client
        .exchange_code(&code)
        .context("exchange authorization code")?;
    let refresh_token = tokens.refresh_token().context("read refresh token")?;
    info!(
        refresh_token = %mask_token(refresh_token),
        expires_in = ?tokens.expires_in(),
        "received tokens"
    );

    let line = append_entry(&args.env_file, REFRESH_TOKEN_KEY, refresh_token)
        .with_context(|| format!("write {}", args.env_file.display()))?;
    println!(
        "Authorization complete. The refresh token has been saved to {}.",
        args.env_file.display()
    );
    debug!(line = %mask_entry(&line), "appended entry");

    if tracing::enabled!(tracing::Level::DEBUG) {
        let entries = find_entries(&args.env_file, REFRESH_TOKEN_KEY)
            .with_context(|| format!("read {}", args.env_file.display()))?;
        for entry in entries {
            debug!(entry = %mask_entry(&entry), "found in {}", args.env_file.display());
        }
    }

    Ok(())
}

#[cfg(feature = "browser")]
fn open_in_browser(args: &Args, url: &str) {
    if !args.open_browser {
        return;
    }
    if let Err(e) = spotify_auth::open_browser(url) {
        tracing::warn!("{}", e);
    }
}

#[cfg(not(feature = "browser"))]
fn open_in_browser(_args: &Args, _url: &str) {}

fn mask_entry(line: &str) -> String {
    match line.split_once('=') {
        Some((key, value)) => format!("{}={}", key, mask_token(value)),
        None => mask_token(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_entry_masks_only_the_value() {
        assert_eq!(
            mask_entry("SPOTIFY_REFRESH_TOKEN=AQC-refresh-token-xyz"),
            "SPOTIFY_REFRESH_TOKEN=AQC-re...-xyz"
        );
    }

    #[test]
    fn mask_entry_without_separator_masks_whole_line() {
        assert_eq!(mask_entry("AQC-refresh-token-xyz"), "AQC-re...-xyz");
        assert_eq!(mask_entry("short"), "*****");
    }
}
