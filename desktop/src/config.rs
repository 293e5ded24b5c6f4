//! Layered configuration for the `anvil-build` binary.
//!
//! Order: built-in defaults, then the TOML file (`$ANVIL_CONFIG` or
//! `<config_dir>/anvil-build/config.toml`), then `ANVIL_*` environment
//! variables. The API key has no default and must come from one of the two.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anvil_core::TransactionBuildRequest;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://preprod.api.ada-anvil.app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_CHANGE_ADDRESS: &str = "addr_test1qrydyk6uw6cehk5u3zspyz3dhnwzmhfls2fp42vv5dv9g2z3885pg4kpkn30ptezc855lu3w5ey93zcr5lrezjmwkftqg8xvge";
const DEFAULT_RECEIVER_ADDRESS: &str = "addr_test1qr0tkwvlln0v5fljdxceudmlpt5y6szc84vpj4skm836tgn4hsqaesgg97l8ppy5rsn0alj8pth6lqe20fdyydsdgw6sr74cyt";
const DEFAULT_LOVELACE: u64 = 10_000_000;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    /// Whole-request timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    pub transaction: TransactionBuildRequest,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            transaction: TransactionBuildRequest::single_payment(
                DEFAULT_CHANGE_ADDRESS,
                DEFAULT_RECEIVER_ADDRESS,
                DEFAULT_LOVELACE,
            ),
        }
    }
}

impl Config {
    /// Load from the default location and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Like [`Config::load`], reading variables through `lookup`.
    /// A file named by `ANVIL_CONFIG` must exist; only the default path may
    /// be absent.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("ANVIL_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path)).context("loading $ANVIL_CONFIG")?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("anvil-build").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override fields from `ANVIL_API_URL`, `ANVIL_API_KEY` and
    /// `ANVIL_TIMEOUT_SECS` as reported by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ANVIL_API_URL") {
            self.base_url = url;
        }
        if let Some(key) = lookup("ANVIL_API_KEY") {
            self.api_key = key;
        }
        if let Some(secs) = lookup("ANVIL_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("ANVIL_TIMEOUT_SECS is not a number: {secs:?}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("no API key configured; set ANVIL_API_KEY or api_key in the config file");
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            bail!("base_url must be an http(s) URL, got {:?}", self.base_url);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_carry_example_payment() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.transaction.outputs.len(), 1);
        assert_eq!(config.transaction.outputs[0].lovelace, 10_000_000);
        assert!(config.transaction.change_address.ends_with("ftqg8xvge"));
    }

    #[test]
    fn default_config_fails_validation_without_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("ANVIL_API_KEY"));
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = Config::from_toml_str(
            r#"
api_key = "testnet_abc"
timeout_secs = 0

[transaction]
changeAddress = "addr_test1change"
outputs = [
    { address = "addr_test1a", lovelace = 1500000 },
    { address = "addr_test1b", lovelace = 2000000 },
]
"#,
        )
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "testnet_abc");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.transaction.change_address, "addr_test1change");
        assert_eq!(config.transaction.outputs[1].lovelace, 2_000_000);
        config.validate().unwrap();
    }

    #[test]
    fn toml_rejects_negative_lovelace() {
        let result = Config::from_toml_str(
            r#"
[transaction]
changeAddress = "addr"
outputs = [{ address = "addr", lovelace = -1 }]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::from_toml_str(r#"api_key = "from_file""#).unwrap();
        config
            .apply_env(env(&[
                ("ANVIL_API_KEY", "from_env"),
                ("ANVIL_API_URL", "http://127.0.0.1:3000"),
                ("ANVIL_TIMEOUT_SECS", " 5 "),
            ]))
            .unwrap();
        assert_eq!(config.api_key, "from_env");
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn bad_timeout_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("ANVIL_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("ANVIL_TIMEOUT_SECS"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let mut config = Config::default();
        config.api_key = "k".to_string();
        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let path = std::env::temp_dir()
            .join(format!("anvil-build-missing-{}", std::process::id()))
            .join("config.toml");
        let path = path.to_string_lossy().into_owned();
        let err = Config::load_with(env(&[
            ("ANVIL_CONFIG", path.as_str()),
            ("ANVIL_API_KEY", "k"),
        ]))
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("ANVIL_CONFIG"), "{message}");
        assert!(message.contains(&path), "{message}");
    }

    #[test]
    fn explicit_config_file_is_layered_under_env() {
        let dir = std::env::temp_dir().join(format!("anvil-build-explicit-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "api_key = \"from_file\"\ntimeout_secs = 7\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let config = Config::load_with(env(&[
            ("ANVIL_CONFIG", path_str.as_str()),
            ("ANVIL_API_URL", "http://127.0.0.1:3000"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "from_file");
        assert_eq!(config.timeout(), Some(Duration::from_secs(7)));
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn from_file_reports_path_on_error() {
        let dir = std::env::temp_dir().join(format!("anvil-build-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "timeout_secs = \"ten\"").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
