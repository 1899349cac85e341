use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Home-directory rc file for the Climate Data Store API.
pub const CDS_RC: &str = ".cdsapirc";
/// Home-directory rc file for the legacy ECMWF web API.
pub const ECMWF_RC: &str = ".ecmwfapirc";

/// Connection settings for a retrieval service.
///
/// Matches the `.cdsapirc`/`.ecmwfapirc` layout:
///
/// ```text
/// url: https://cds.climate.copernicus.eu/api/v2
/// key: <UID>:<API key>
/// verify: 0
/// ```
///
/// The rc files are YAML either way (`.ecmwfapirc` is JSON, which parses as
/// YAML). Clients take this struct at construction; nothing else in the crate
/// touches credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub url: String,
    pub key: String,
    #[serde(default = "default_verify")]
    pub verify: u8,
    #[serde(default)]
    pub email: Option<String>,
}

fn default_verify() -> u8 {
    1
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            verify: 1,
            email: None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load `file_name` from the user's home directory.
    pub fn from_home_rc(file_name: &str) -> Result<Self> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| Error::Config("HOME is not set".to_string()))?;
        Self::from_file(&home.join(file_name))
    }

    pub fn verify_tls(&self) -> bool {
        self.verify != 0
    }

    /// Split a `UID:KEY` credential into HTTP basic auth parts. A key with no
    /// colon is passed whole as the username.
    pub fn basic_auth_parts(&self) -> (String, Option<String>) {
        match self.key.split_once(':') {
            Some((uid, key)) => (uid.to_string(), Some(key.to_string())),
            None => (self.key.clone(), None),
        }
    }
}
