use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use esg_chain::RpcConfig;
use esg_types::Address;
use esg_workflow::{Deployment, Role};
use serde::{Deserialize, Serialize};

const GOVERNANCE_ADDRESS: &str = "0x4b73515d2DfEfd5aaaDA2286227A2cBC6DbB903e";
const TOKEN_ADDRESS: &str = "0x3B7b8dF8f95166a919Ec4C252Ca71a06561DDF98";

/// Settings for the `esg` binary, read from a TOML file.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsgConfig {
    /// JSON-RPC endpoint of a node that holds the signing account.
    pub rpc_url: Option<String>,
    pub governance_address: Address,
    pub token_address: Address,
    pub upload_url: String,
    pub explorer_tx_url: String,
    pub feed_interval_secs: u64,
    pub poll_interval_ms: u64,
    pub confirmation_timeout_secs: u64,
    pub token_symbol: String,
    pub role: Role,
}

impl Default for EsgConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            governance_address: GOVERNANCE_ADDRESS.parse().unwrap_or_default(),
            token_address: TOKEN_ADDRESS.parse().unwrap_or_default(),
            upload_url: "https://backend-2h3r.onrender.com".into(),
            explorer_tx_url: "https://sepolia.etherscan.io/tx/".into(),
            feed_interval_secs: 60,
            poll_interval_ms: 1000,
            confirmation_timeout_secs: 120,
            token_symbol: "GRT".into(),
            role: Role::Submitter,
        }
    }
}

impl EsgConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn deployment(&self) -> Deployment {
        Deployment {
            governance: self.governance_address,
            token: self.token_address,
        }
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_secs(self.feed_interval_secs.max(1))
    }

    pub fn rpc_config(&self, url: &str) -> RpcConfig {
        RpcConfig {
            url: url.to_string(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = EsgConfig::default();
        assert!(!c.governance_address.is_zero());
        assert!(!c.token_address.is_zero());
        assert_ne!(c.governance_address, c.token_address);
        assert_eq!(c.feed_interval(), Duration::from_secs(60));
        assert_eq!(c.token_symbol, "GRT");
        assert_eq!(c.role, Role::Submitter);
        assert!(c.rpc_url.is_none());
    }

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(EsgConfig::load(None).unwrap(), EsgConfig::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
rpc_url = "http://127.0.0.1:8545"
role = "auditor"
feed_interval_secs = 5
"#
        )
        .unwrap();
        let c = EsgConfig::load(Some(file.path())).unwrap();
        assert_eq!(c.rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert_eq!(c.role, Role::Auditor);
        assert_eq!(c.feed_interval(), Duration::from_secs(5));
        assert_eq!(c.token_symbol, "GRT");
    }

    #[test]
    fn addresses_parse_from_hex() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"token_address = "0x{}""#, "11".repeat(20)).unwrap();
        let c = EsgConfig::load(Some(file.path())).unwrap();
        assert_eq!(c.token_address, Address::new([0x11; 20]));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "role = \"admin\"").unwrap();
        assert!(EsgConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn rpc_settings_follow_config() {
        let c = EsgConfig {
            poll_interval_ms: 250,
            ..Default::default()
        };
        let rpc = c.rpc_config("http://node");
        assert_eq!(rpc.url, "http://node");
        assert_eq!(rpc.poll_interval, Duration::from_millis(250));
        assert_eq!(rpc.confirmation_timeout, Duration::from_secs(120));
    }
}
