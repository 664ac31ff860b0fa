use std::fs;
use std::path::{Path, PathBuf};

pub const CREDENTIALS_FILE_NAME: &str = "storage.txt";
const API_KEY_FIELD: &str = "deepai-key";

pub fn default_credentials_path(root: &Path) -> PathBuf {
    root.join(CREDENTIALS_FILE_NAME)
}

/// API credential loaded from the `key: value` line file next to the tool.
///
/// A missing file or missing key is not an error here; calls made without a
/// key fail at the transform adapter boundary instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: Option<String>,
}

impl ApiCredentials {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
        }
    }

    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) => {
                tracing::debug!(
                    "credentials file {} not readable: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut api_key = None;
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            if key.trim() == API_KEY_FIELD {
                let value = value.trim();
                if !value.is_empty() {
                    api_key = Some(value.to_string());
                }
            }
        }
        Self { api_key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn parses_the_api_key_line() {
        let creds = ApiCredentials::parse("deepai-key: abc-123\n");
        assert_eq!(creds.api_key.as_deref(), Some("abc-123"));
    }

    #[test]
    fn ignores_unrelated_lines_and_whitespace() {
        let creds = ApiCredentials::parse("# comment\nother-key: nope\n  deepai-key :  xyz  \n");
        assert_eq!(creds.api_key.as_deref(), Some("xyz"));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let creds = ApiCredentials::parse("deepai-key:\n");
        assert!(creds.api_key.is_none());
    }

    #[test]
    fn missing_file_is_not_fatal() {
        let temp = TempDir::new().expect("temp dir");
        let creds = ApiCredentials::load(&default_credentials_path(temp.path()));
        assert!(creds.api_key.is_none());
    }

    #[test]
    fn loads_from_disk() {
        let temp = TempDir::new().expect("temp dir");
        let path = default_credentials_path(temp.path());
        let mut file = fs::File::create(&path).expect("create");
        writeln!(file, "deepai-key: from-disk").expect("write");

        let creds = ApiCredentials::load(&path);
        assert_eq!(creds.api_key.as_deref(), Some("from-disk"));
    }
}
