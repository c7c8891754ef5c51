use std::{net::SocketAddr, path::Path};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_RELATIONAL_URL: &str = "https://api.dbhub.io/v1/query";

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: std::path::PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationalSettings {
    pub url: String,
    /// API credential for the relational query service. Mandatory; startup
    /// fails without it.
    pub api_key: String,
    pub owner: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSettings {
    pub url: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub relational: RelationalSettings,
    pub document: DocumentSettings,
}

impl Settings {
    /// Load settings from the given TOML file, with sane defaults.
    /// Environment variables (`AQS_RELATIONAL__API_KEY`, …) override the
    /// file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("relational.url", DEFAULT_RELATIONAL_URL)?
            .set_default("relational.owner", "Davelexic")?
            .set_default("relational.database", "coffee_sales.db")?
            .set_default("document.url", "http://127.0.0.1:8080")?
            .set_default("document.database", "chatdb")?;

        let cfg = builder
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("AQS").separator("__"))
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        if settings.relational.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "relational.api_key is required".to_string(),
            ));
        }
        Ok(settings)
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_fill_everything_but_the_credential() {
        let file = write_config("[relational]\napi_key = \"secret\"\n");
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.web.address, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(settings.relational.url, DEFAULT_RELATIONAL_URL);
        assert_eq!(settings.relational.api_key, "secret");
        assert_eq!(settings.document.database, "chatdb");
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let file = write_config("[web]\naddress = \"0.0.0.0:9000\"\n");
        assert!(Settings::from_file(file.path()).is_err());
    }

    #[test]
    fn blank_credential_is_rejected() {
        let file = write_config("[relational]\napi_key = \"  \"\n");
        assert!(Settings::from_file(file.path()).is_err());
    }
}
