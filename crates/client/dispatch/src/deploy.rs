use crate::dispatcher::Dispatcher;
use oc_gateway_client::GatewayClientError;
use oc_registry::{DeploymentRecord, RegistryError};
use op_gateway::{DeclareTransaction, DeployTransaction, UserTransaction};
use starknet_types_core::felt::Felt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sender the sequencer expects on unsigned (v0) declarations.
const DECLARE_V0_SENDER: Felt = Felt::ONE;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("reading artifact `{path}`: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifact `{path}` is not valid JSON: {source}")]
    MalformedArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Gateway(#[from] GatewayClientError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("gateway accepted the deployment but returned no contract address")]
    MissingAddress,
    #[error("gateway accepted the declaration but returned no class hash")]
    MissingClassHash,
    #[error("gateway accepted the transaction but returned no transaction hash")]
    MissingTransactionHash,
}

#[derive(Debug)]
pub struct DeployRequest<'a> {
    /// Compiled contract artifact (opaque JSON from the external toolchain).
    pub artifact: &'a Path,
    pub constructor_calldata: Vec<Felt>,
    pub salt: Option<Felt>,
    /// Extra registry identifier on top of the artifact name.
    pub alias: Option<String>,
    pub token: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub identifier: String,
    pub address: Felt,
    pub transaction_hash: Felt,
    pub abi: String,
}

#[derive(Debug)]
pub struct DeclareRequest<'a> {
    pub artifact: &'a Path,
    pub signature: Option<(Felt, Felt)>,
    pub alias: Option<String>,
    pub token: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredClass {
    pub class_hash: Felt,
    pub transaction_hash: Felt,
}

impl Dispatcher {
    /// Submits a DEPLOY transaction for `artifact` and appends the resulting
    /// address to the registry under the artifact name (and `alias`, if any).
    pub async fn deploy(&self, request: DeployRequest<'_>) -> Result<DeployedContract, DeployError> {
        let (artifact_name, contract_definition) = read_artifact(request.artifact)?;

        let tx = UserTransaction::Deploy(DeployTransaction {
            contract_address_salt: request.salt.unwrap_or(Felt::ZERO),
            constructor_calldata: request.constructor_calldata,
            contract_definition,
            version: Felt::ZERO,
        });
        let response = self.provider().add_transaction(&tx, request.token).await?;
        let address = response.address.ok_or(DeployError::MissingAddress)?;
        let transaction_hash = response.transaction_hash.ok_or(DeployError::MissingTransactionHash)?;

        let abi = request.artifact.display().to_string();
        self.registry().register(self.network(), &DeploymentRecord::new(&artifact_name, address, &abi))?;
        if let Some(alias) = &request.alias {
            self.registry().register(self.network(), &DeploymentRecord::new(alias, address, &abi))?;
        }

        let identifier = request.alias.unwrap_or(artifact_name);
        tracing::info!("🚀 Deployment of {identifier} successfully sent at {address:#x}");
        tracing::info!("Transaction hash: {transaction_hash:#x}");
        Ok(DeployedContract { identifier, address, transaction_hash, abi })
    }

    /// Submits a DECLARE transaction for `artifact`. The class hash is
    /// recorded in the registry (declarations share the deployment store) so
    /// later commands can refer to it by name.
    pub async fn declare(&self, request: DeclareRequest<'_>) -> Result<DeclaredClass, DeployError> {
        let (artifact_name, contract_class) = read_artifact(request.artifact)?;

        let tx = UserTransaction::Declare(DeclareTransaction {
            contract_class,
            sender_address: DECLARE_V0_SENDER,
            signature: request.signature.map(|(r, s)| vec![r, s]).unwrap_or_default(),
            nonce: Felt::ZERO,
            max_fee: Felt::ZERO,
            version: Felt::ZERO,
        });
        let response = self.provider().add_transaction(&tx, request.token).await?;
        let class_hash = response.class_hash.ok_or(DeployError::MissingClassHash)?;
        let transaction_hash = response.transaction_hash.ok_or(DeployError::MissingTransactionHash)?;

        let identifier = request.alias.unwrap_or(artifact_name);
        self.registry().register(
            self.network(),
            &DeploymentRecord::new(&identifier, class_hash, request.artifact.display().to_string()),
        )?;

        tracing::info!("🔖 Declaration of {identifier} successfully sent, class hash {class_hash:#x}");
        tracing::info!("Transaction hash: {transaction_hash:#x}");
        Ok(DeclaredClass { class_hash, transaction_hash })
    }
}

fn read_artifact(path: &Path) -> Result<(String, serde_json::Value), DeployError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| DeployError::ReadArtifact { path: path.to_path_buf(), source })?;
    let definition = serde_json::from_str(&raw)
        .map_err(|source| DeployError::MalformedArtifact { path: path.to_path_buf(), source })?;
    let name = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
    Ok((name, definition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_ref::ContractRef;
    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use oc_gateway_client::GatewayProvider;
    use oc_registry::DeploymentRegistry;
    use op_chain_config::NetworkConfig;
    use serde_json::json;
    use std::io::Write;
    use std::sync::Arc;

    const NETWORK: &str = "devnet";

    fn dispatcher(server: &MockServer, dir: &tempfile::TempDir) -> Dispatcher {
        let network = NetworkConfig::new_from_base_path(NETWORK, server.base_url().parse().unwrap(), Felt::ONE);
        let provider = Arc::new(GatewayProvider::from_network(&network));
        Dispatcher::new(provider, DeploymentRegistry::new(dir.path()), &network)
    }

    fn write_artifact(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(br#"{"program": {}, "abi": [{"name": "increase_balance", "type": "function"}]}"#)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn deploy_registers_the_artifact_name_and_alias() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock_async(|when, then| {
                when.method(POST).path("/gateway/add_transaction").body_contains("\"type\":\"DEPLOY\"");
                then.status(200).json_body(json!({
                    "code": "TRANSACTION_RECEIVED",
                    "transaction_hash": "0x777",
                    "address": "0xc0ffee"
                }));
            })
            .await;

        let dispatcher = dispatcher(&server, &dir);
        let artifact = write_artifact(&dir, "Counter.json");
        let deployed = dispatcher
            .deploy(DeployRequest {
                artifact: &artifact,
                constructor_calldata: vec![Felt::ONE],
                salt: None,
                alias: Some("my-counter".to_string()),
                token: None,
            })
            .await
            .unwrap();

        assert_eq!(deployed.address, Felt::from_hex_unchecked("0xc0ffee"));
        assert_eq!(deployed.transaction_hash, Felt::from_hex_unchecked("0x777"));
        assert_eq!(deployed.identifier, "my-counter");

        // Both identifiers now resolve to the deployed address.
        for identifier in ["Counter", "my-counter"] {
            let resolved =
                ContractRef::parse(identifier).resolve(dispatcher.registry(), NETWORK).unwrap();
            assert_eq!(resolved.address, Felt::from_hex_unchecked("0xc0ffee"));
        }
    }

    #[tokio::test]
    async fn deploy_with_missing_artifact_fails_before_the_network() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();

        let err = dispatcher(&server, &dir)
            .deploy(DeployRequest {
                artifact: Path::new("does/not/exist.json"),
                constructor_calldata: vec![],
                salt: None,
                alias: None,
                token: None,
            })
            .await
            .unwrap_err();
        assert_matches!(err, DeployError::ReadArtifact { .. });
    }

    #[tokio::test]
    async fn rejected_deployment_registers_nothing() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock_async(|when, then| {
                when.method(POST).path("/gateway/add_transaction");
                then.status(200).body(r#"{"code": "test"}"#);
            })
            .await;

        let dispatcher = dispatcher(&server, &dir);
        let artifact = write_artifact(&dir, "Counter.json");
        let err = dispatcher
            .deploy(DeployRequest {
                artifact: &artifact,
                constructor_calldata: vec![],
                salt: None,
                alias: None,
                token: None,
            })
            .await
            .unwrap_err();
        assert_matches!(err, DeployError::Gateway(GatewayClientError::TransactionRejected { .. }));
        assert_matches!(
            ContractRef::parse("Counter").resolve(dispatcher.registry(), NETWORK),
            Err(_)
        );
    }

    #[tokio::test]
    async fn declare_records_the_class_hash() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock_async(|when, then| {
                when.method(POST).path("/gateway/add_transaction").body_contains("\"type\":\"DECLARE\"");
                then.status(200).json_body(json!({
                    "code": "TRANSACTION_RECEIVED",
                    "transaction_hash": "0x778",
                    "class_hash": "0xc1a55"
                }));
            })
            .await;

        let dispatcher = dispatcher(&server, &dir);
        let artifact = write_artifact(&dir, "Counter.json");
        let declared = dispatcher
            .declare(DeclareRequest { artifact: &artifact, signature: None, alias: None, token: None })
            .await
            .unwrap();

        assert_eq!(declared.transaction_hash, Felt::from_hex_unchecked("0x778"));
        let resolved = ContractRef::parse("Counter").resolve(dispatcher.registry(), NETWORK).unwrap();
        assert_eq!(resolved.address, declared.class_hash);
    }
}
