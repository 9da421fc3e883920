use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::Result;

/// Key under which the refresh token is stored.
pub const REFRESH_TOKEN_KEY: &str = "SPOTIFY_REFRESH_TOKEN";

/// Append a `KEY=VALUE` line to a dotenv-style file
///
/// The file is created if it does not exist. Existing content is never
/// rewritten, and earlier entries for the same key are left in place.
///
/// Returns the line that was written, without surrounding newlines.
pub fn append_entry(path: impl AsRef<Path>, key: &str, value: &str) -> Result<String> {
    let line = format!("{key}={value}");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    write!(file, "\n{line}\n")?;
    file.flush()?;
    Ok(line)
}

/// Return every line in the file whose key is `key`, in file order
pub fn find_entries(path: impl AsRef<Path>, key: &str) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.split_once('=')
                .is_some_and(|(k, _)| k.trim() == key)
        })
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        let line = append_entry(&path, REFRESH_TOKEN_KEY, "AQC-token").unwrap();
        assert_eq!(line, "SPOTIFY_REFRESH_TOKEN=AQC-token");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\nSPOTIFY_REFRESH_TOKEN=AQC-token\n"
        );
    }

    #[test]
    fn append_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "SPOTIFY_CLIENT_ID=abc\nOTHER=1").unwrap();

        append_entry(&path, REFRESH_TOKEN_KEY, "AQC-token").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "SPOTIFY_CLIENT_ID=abc\nOTHER=1\nSPOTIFY_REFRESH_TOKEN=AQC-token\n"
        );
    }

    #[test]
    fn repeated_appends_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        append_entry(&path, REFRESH_TOKEN_KEY, "first").unwrap();
        append_entry(&path, REFRESH_TOKEN_KEY, "second").unwrap();

        assert_eq!(
            find_entries(&path, REFRESH_TOKEN_KEY).unwrap(),
            vec![
                "SPOTIFY_REFRESH_TOKEN=first".to_string(),
                "SPOTIFY_REFRESH_TOKEN=second".to_string(),
            ]
        );
    }

    #[test]
    fn find_entries_matches_whole_key_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "OLD_SPOTIFY_REFRESH_TOKEN=x\n# SPOTIFY_REFRESH_TOKEN note\n  SPOTIFY_REFRESH_TOKEN = y \n",
        )
        .unwrap();

        assert_eq!(
            find_entries(&path, REFRESH_TOKEN_KEY).unwrap(),
            vec!["SPOTIFY_REFRESH_TOKEN = y".to_string()]
        );
    }

    #[test]
    fn find_entries_on_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_entries(dir.path().join("absent"), REFRESH_TOKEN_KEY).unwrap_err();
        assert!(matches!(err, crate::SpotifyAuthError::Io(_)));
    }
}
