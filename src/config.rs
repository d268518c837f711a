use std::fmt;
use std::path::PathBuf;

use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

/// Connection and sync settings for the Plex server.
///
/// Every key has a default, so an empty file (or no file at all) is a valid
/// configuration apart from the token, which Plex requires for any request.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Plex access token. Treated as a secret: never logged, redacted in Debug.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_library_name")]
    pub library_name: String,
    /// Use https instead of http when talking to the server.
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub ignore_cert_errors: bool,
    /// Offer an interactive manual search when a track cannot be found.
    #[serde(default)]
    pub manual_search: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    32400
}

fn default_library_name() -> String {
    "Music".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: String::new(),
            library_name: default_library_name(),
            secure: false,
            ignore_cert_errors: false,
            manual_search: false,
        }
    }
}

// The token must never end up in logs, so Debug redacts it.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "token",
                &if self.token.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("library_name", &self.library_name)
            .field("secure", &self.secure)
            .field("ignore_cert_errors", &self.ignore_cert_errors)
            .field("manual_search", &self.manual_search)
            .finish()
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("plexsync").join("config.toml"))
    }

    /// Load config from the default location, falling back to defaults when
    /// no file exists yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or(eyre!("No config directory found"))?;

        if config_path.is_file() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default config file, if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or(eyre!("No config directory found"))?;

        if config_path.exists() {
            return Ok(config_path);
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let contents =
            toml::to_string_pretty(&Self::default()).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context(format!(
            "Failed to write config file: {}",
            config_path.display()
        ))?;

        Ok(config_path)
    }

    /// Base URL of the Plex server, scheme depending on `secure`.
    pub fn base_url(&self) -> Result<Url> {
        let scheme = if self.secure { "https" } else { "http" };
        Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))
            .context("Invalid Plex host/port configuration")
    }
}
