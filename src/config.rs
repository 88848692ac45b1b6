// Configuration file handling. The file is a small TOML document holding
// the API token and, optionally, the account's user name:
//
//     auth-token = "user:0123456789ABCDEF"
//     user = "user"
//
// When the file does not exist a template is written and loading fails so
// the user can fill it in.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "PINBOARD_CLI_CONFIG";

const TOKEN_KEY: &str = "auth-token";
const TOKEN_PLACEHOLDER: &str = "Add your auth token here";
const USER_PLACEHOLDER: &str = "Add your user name here";

#[derive(Deserialize)]
struct RawConfig {
    #[serde(rename = "auth-token")]
    auth_token: Option<String>,
    user: Option<String>,
}

/// Settings loaded once per invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub auth_token: String,
    pub user: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("auth_token", &"***")
            .field("user", &self.user)
            .finish()
    }
}

/// `~/.config/pinboard-cli.toml`
pub fn default_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".config").join("pinboard-cli.toml"))
        .ok_or(ConfigError::NoHomeDir)
}

fn template() -> String {
    format!("{TOKEN_KEY} = \"{TOKEN_PLACEHOLDER}\"\nuser = \"{USER_PLACEHOLDER}\"\n")
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, template()).map_err(io_err)
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_path()?,
        };
        if !path.exists() {
            write_template(&path)?;
            return Err(ConfigError::Created { path });
        }
        debug!("loading config from {}", path.display());
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    /// Parse config text; `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let auth_token = raw
            .auth_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                key: TOKEN_KEY,
                path: path.to_path_buf(),
            })?;
        if auth_token == TOKEN_PLACEHOLDER {
            return Err(ConfigError::Placeholder {
                key: TOKEN_KEY,
                path: path.to_path_buf(),
            });
        }

        let user = raw
            .user
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty() && u != USER_PLACEHOLDER);

        Ok(Config { auth_token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        Config::parse(text, Path::new("test.toml"))
    }

    #[test]
    fn parses_token_and_user() {
        let config = parse("auth-token = \"joe:ABC123\"\nuser = \"joe\"\n").unwrap();
        assert_eq!(config.auth_token, "joe:ABC123");
        assert_eq!(config.user.as_deref(), Some("joe"));
    }

    #[test]
    fn user_is_optional() {
        let config = parse("auth-token = \"joe:ABC123\"\n").unwrap();
        assert_eq!(config.user, None);
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = parse("user = \"joe\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "auth-token", .. }));
    }

    #[test]
    fn template_values_are_rejected() {
        let err = parse(&template()).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = parse("auth-token = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = parse("auth-token = \"joe:SECRET\"\n").unwrap();
        assert!(!format!("{config:?}").contains("SECRET"));
    }

    #[test]
    fn missing_file_gets_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pinboard-cli.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Created { .. }));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("auth-token"));
        assert!(written.contains("user"));

        // Second run finds the unedited template.
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { .. }));
    }
}
