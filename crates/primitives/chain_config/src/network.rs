use crate::networks_file::NetworksFile;
use op_utils::parsers::url_join_segment;
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Cairo short string `"SN_MAIN"`.
pub const CHAIN_ID_MAINNET: Felt = Felt::from_hex_unchecked("0x534e5f4d41494e");
/// Cairo short string `"SN_SEPOLIA"`.
pub const CHAIN_ID_SEPOLIA: Felt = Felt::from_hex_unchecked("0x534e5f5345504f4c4941");
/// Cairo short string `"SN_INTEGRATION_SEPOLIA"`.
pub const CHAIN_ID_INTEGRATION_SEPOLIA: Felt =
    Felt::from_hex_unchecked("0x534e5f494e544547524154494f4e5f5345504f4c4941");

#[derive(Debug, thiserror::Error)]
pub enum ChainConfigError {
    #[error("unknown network `{0}`; expected one of mainnet, sepolia, integration, localhost or a name declared in the networks file")]
    UnknownNetwork(String),
    #[error("network `{0}` needs a networks file (`--networks-file`) declaring it")]
    MissingNetworksFile(String),
    #[error("reading networks file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("networks file `{path}` is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("network `{name}`: {reason}")]
    InvalidNetwork { name: String, reason: String },
}

/// A network selector, as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkId {
    Mainnet,
    Sepolia,
    IntegrationSepolia,
    Localhost,
    /// Resolved through the networks file.
    Custom(String),
}

impl FromStr for NetworkId {
    type Err = std::convert::Infallible;

    /// Normalizes common aliases: anything mentioning `localhost` or
    /// `127.0.0.1` is the local devnet, anything mentioning `testnet` is
    /// sepolia. Unrecognized names resolve later against the networks file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let id = if normalized.contains("localhost") || normalized.contains("127.0.0.1") {
            Self::Localhost
        } else if normalized.contains("testnet") {
            Self::Sepolia
        } else {
            match normalized.as_str() {
                "mainnet" => Self::Mainnet,
                "sepolia" => Self::Sepolia,
                "integration" => Self::IntegrationSepolia,
                _ => Self::Custom(normalized),
            }
        };
        Ok(id)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet"),
            Self::Sepolia => f.write_str("sepolia"),
            Self::IntegrationSepolia => f.write_str("integration"),
            Self::Localhost => f.write_str("localhost"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Resolved endpoints for one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub gateway_url: Url,
    pub feeder_gateway_url: Url,
    pub chain_id: Felt,
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>, gateway_url: Url, feeder_gateway_url: Url, chain_id: Felt) -> Self {
        Self { name: name.into(), gateway_url, feeder_gateway_url, chain_id }
    }

    /// Derives the gateway and feeder-gateway urls by appending the `/gateway`
    /// and `/feeder_gateway` suffixes to a single base url.
    pub fn new_from_base_path(name: impl Into<String>, base_path: Url, chain_id: Felt) -> Self {
        let (mut gateway_url, mut feeder_gateway_url) = (base_path.clone(), base_path);
        url_join_segment(&mut gateway_url, "gateway");
        url_join_segment(&mut feeder_gateway_url, "feeder_gateway");
        Self::new(name, gateway_url, feeder_gateway_url, chain_id)
    }

    pub fn starknet_alpha_mainnet() -> Self {
        Self::new(
            "mainnet",
            Url::parse("https://alpha-mainnet.starknet.io/gateway/")
                .expect("Failed to parse Starknet Alpha Mainnet gateway url. This should not fail in prod."),
            Url::parse("https://feeder.alpha-mainnet.starknet.io/feeder_gateway/")
                .expect("Failed to parse Starknet Alpha Mainnet feeder gateway url. This should not fail in prod."),
            CHAIN_ID_MAINNET,
        )
    }

    pub fn starknet_alpha_sepolia() -> Self {
        Self::new(
            "sepolia",
            Url::parse("https://alpha-sepolia.starknet.io/gateway/")
                .expect("Failed to parse Starknet Alpha Sepolia gateway url. This should not fail in prod."),
            Url::parse("https://feeder.alpha-sepolia.starknet.io/feeder_gateway/")
                .expect("Failed to parse Starknet Alpha Sepolia feeder gateway url. This should not fail in prod."),
            CHAIN_ID_SEPOLIA,
        )
    }

    pub fn starknet_integration_sepolia() -> Self {
        Self::new(
            "integration",
            Url::parse("https://integration-sepolia.starknet.io/gateway/")
                .expect("Failed to parse Starknet Integration Sepolia gateway url. This should not fail in prod."),
            Url::parse("https://feeder.integration-sepolia.starknet.io/feeder_gateway/").expect(
                "Failed to parse Starknet Integration Sepolia feeder gateway url. This should not fail in prod.",
            ),
            CHAIN_ID_INTEGRATION_SEPOLIA,
        )
    }

    /// The local devnet. Devnets identify as sepolia by default.
    pub fn localhost() -> Self {
        Self::new_from_base_path(
            "localhost",
            Url::parse("http://127.0.0.1:5050/")
                .expect("Failed to parse the localhost base url. This should not fail in prod."),
            CHAIN_ID_SEPOLIA,
        )
    }

    /// Resolves a selector to its endpoints. Named networks use the baked-in
    /// presets; custom names require the networks file.
    pub fn resolve(id: &NetworkId, networks_file: Option<&Path>) -> Result<Self, ChainConfigError> {
        match id {
            NetworkId::Mainnet => Ok(Self::starknet_alpha_mainnet()),
            NetworkId::Sepolia => Ok(Self::starknet_alpha_sepolia()),
            NetworkId::IntegrationSepolia => Ok(Self::starknet_integration_sepolia()),
            NetworkId::Localhost => Ok(Self::localhost()),
            NetworkId::Custom(name) => {
                let path = networks_file.ok_or_else(|| ChainConfigError::MissingNetworksFile(name.clone()))?;
                let file = NetworksFile::from_path(path)?;
                file.network(name)?.into_config(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mainnet", NetworkId::Mainnet)]
    #[case("MAINNET", NetworkId::Mainnet)]
    #[case("sepolia", NetworkId::Sepolia)]
    #[case("testnet", NetworkId::Sepolia)]
    #[case("sepolia-testnet", NetworkId::Sepolia)]
    #[case("integration", NetworkId::IntegrationSepolia)]
    #[case("localhost", NetworkId::Localhost)]
    #[case("127.0.0.1:5050", NetworkId::Localhost)]
    #[case("my-appchain", NetworkId::Custom("my-appchain".to_string()))]
    fn selector_normalization(#[case] input: &str, #[case] expected: NetworkId) {
        assert_eq!(input.parse::<NetworkId>().unwrap(), expected);
    }

    #[test]
    fn presets_point_at_the_expected_hosts() {
        let mainnet = NetworkConfig::starknet_alpha_mainnet();
        assert_eq!(mainnet.gateway_url.host_str(), Some("alpha-mainnet.starknet.io"));
        assert_eq!(mainnet.feeder_gateway_url.host_str(), Some("feeder.alpha-mainnet.starknet.io"));
        assert_eq!(mainnet.chain_id, CHAIN_ID_MAINNET);

        let localhost = NetworkConfig::localhost();
        assert_eq!(localhost.gateway_url.as_str(), "http://127.0.0.1:5050/gateway");
        assert_eq!(localhost.feeder_gateway_url.as_str(), "http://127.0.0.1:5050/feeder_gateway");
    }

    #[test]
    fn custom_network_without_file_is_an_error() {
        let id = NetworkId::Custom("appchain".to_string());
        let err = NetworkConfig::resolve(&id, None).unwrap_err();
        assert!(matches!(err, ChainConfigError::MissingNetworksFile(name) if name == "appchain"));
    }
}
