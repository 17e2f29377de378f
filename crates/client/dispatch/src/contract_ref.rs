use oc_account::Account;
use oc_registry::{DeploymentRegistry, RegistryError};
use op_utils::parsers::parse_felt;
use starknet_types_core::felt::Felt;

/// The contract reference has no match in the registry. Fatal: commands abort
/// instead of logging past it.
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve contract reference: {0}")]
pub struct ResolutionError(#[from] pub RegistryError);

/// A reference to a contract the dispatcher can act on.
#[derive(Debug)]
pub enum ContractRef<'a> {
    /// Registry identifier (alias or contract name).
    Alias(String),
    /// Literal on-chain address; no abi is known for it.
    Address(Felt),
    /// An account handle; address and abi come straight from it.
    Account(&'a Account),
}

/// Address and abi once a reference has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContract {
    pub address: Felt,
    pub abi: Option<String>,
}

impl ContractRef<'_> {
    /// `0x`-prefixed input is an address; everything else goes through the
    /// registry.
    pub fn parse(s: &str) -> ContractRef<'static> {
        if s.starts_with("0x") || s.starts_with("0X") {
            if let Ok(address) = parse_felt(s) {
                return ContractRef::Address(address);
            }
        }
        ContractRef::Alias(s.to_string())
    }

    pub fn resolve(
        &self,
        registry: &DeploymentRegistry,
        network: &str,
    ) -> Result<ResolvedContract, ResolutionError> {
        match self {
            Self::Account(account) => {
                Ok(ResolvedContract { address: account.address, abi: Some(account.abi.clone()) })
            }
            Self::Address(address) => Ok(ResolvedContract { address: *address, abi: None }),
            Self::Alias(identifier) => {
                let record = registry.load_first(identifier, network)?;
                Ok(ResolvedContract { address: record.address, abi: Some(record.abi) })
            }
        }
    }
}
