use crate::network::{ChainConfigError, NetworkConfig, CHAIN_ID_SEPOLIA};
use serde::Deserialize;
use starknet_core::utils::cairo_short_string_to_felt;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use url::Url;

/// YAML file declaring custom networks:
///
/// ```yaml
/// networks:
///   appchain:
///     base_url: http://gateway.appchain.internal:8080
///     chain_id: MY_APPCHAIN
///   split-endpoints:
///     gateway_url: https://gw.example.org/gateway
///     feeder_gateway_url: https://feeder.example.org/feeder_gateway
/// ```
#[derive(Debug, Deserialize)]
pub(crate) struct NetworksFile {
    networks: BTreeMap<String, CustomNetwork>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomNetwork {
    /// Base url from which `/gateway` and `/feeder_gateway` are derived.
    /// Alternative to spelling out both endpoint urls.
    #[serde(default)]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub gateway_url: Option<Url>,
    #[serde(default)]
    pub feeder_gateway_url: Option<Url>,
    /// Cairo short string; devnet chains default to `SN_SEPOLIA`.
    #[serde(default)]
    pub chain_id: Option<String>,
}

impl NetworksFile {
    pub(crate) fn from_path(path: &Path) -> Result<Self, ChainConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ChainConfigError::Io { path: display.clone(), source })?;
        serde_yaml::from_str(&raw).map_err(|source| ChainConfigError::Parse { path: display, source })
    }

    pub(crate) fn network(&self, name: &str) -> Result<CustomNetwork, ChainConfigError> {
        self.networks.get(name).cloned().ok_or_else(|| ChainConfigError::UnknownNetwork(name.to_string()))
    }
}

impl CustomNetwork {
    pub(crate) fn into_config(self, name: &str) -> Result<NetworkConfig, ChainConfigError> {
        let chain_id = match &self.chain_id {
            Some(short_string) => cairo_short_string_to_felt(short_string).map_err(|e| {
                ChainConfigError::InvalidNetwork { name: name.to_string(), reason: format!("bad chain_id: {e}") }
            })?,
            None => CHAIN_ID_SEPOLIA,
        };

        match (self.base_url, self.gateway_url, self.feeder_gateway_url) {
            (Some(base), None, None) => Ok(NetworkConfig::new_from_base_path(name, base, chain_id)),
            (None, Some(gateway), Some(feeder)) => Ok(NetworkConfig::new(name, gateway, feeder, chain_id)),
            (Some(_), _, _) => Err(ChainConfigError::InvalidNetwork {
                name: name.to_string(),
                reason: "declare either base_url or the two endpoint urls, not both".to_string(),
            }),
            _ => Err(ChainConfigError::InvalidNetwork {
                name: name.to_string(),
                reason: "declare base_url, or both gateway_url and feeder_gateway_url".to_string(),
            }),
        }
    }
}
