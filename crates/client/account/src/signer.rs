use async_trait::async_trait;
use op_utils::parsers::parse_felt;
use starknet_signers::SigningKey;
use starknet_types_core::felt::Felt;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("environment variable `{0}` is not set; export the account's private key under that name")]
    MissingKey(String),
    #[error("environment variable `{0}` does not hold a valid private key")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signature(String),
}

/// Opaque signing capability. The rest of the system only ever asks for a
/// signature over a transaction hash and for the public key; key material
/// never crosses this seam.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, hash: &Felt) -> Result<(Felt, Felt), SignerError>;

    fn public_key(&self) -> Felt;
}

/// In-process signer backed by an ECDSA key read from the environment.
#[derive(Debug)]
pub struct LocalSigner {
    key: SigningKey,
}

impl LocalSigner {
    /// Reads the private key from the environment variable named `alias`.
    pub fn from_env(alias: &str) -> Result<Self, SignerError> {
        let raw = std::env::var(alias).map_err(|_| SignerError::MissingKey(alias.to_string()))?;
        let secret = parse_felt(&raw).map_err(|_| SignerError::InvalidKey(alias.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    pub fn from_secret(secret: Felt) -> Self {
        Self { key: SigningKey::from_secret_scalar(secret) }
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign(&self, hash: &Felt) -> Result<(Felt, Felt), SignerError> {
        let signature = self.key.sign(hash).map_err(|e| SignerError::Signature(e.to_string()))?;
        Ok((signature.r, signature.s))
    }

    fn public_key(&self) -> Felt {
        self.key.verifying_key().scalar()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use starknet_crypto::Signature;

    #[tokio::test]
    async fn signatures_verify_against_the_public_key() {
        let signer = LocalSigner::from_secret(Felt::from_hex_unchecked("0xdeadbeef"));
        let hash = Felt::from_hex_unchecked("0x1234");

        let (r, s) = signer.sign(&hash).await.unwrap();
        let key = SigningKey::from_secret_scalar(Felt::from_hex_unchecked("0xdeadbeef"));
        assert!(key.verifying_key().verify(&hash, &Signature { r, s }).unwrap());
    }

    #[test]
    fn missing_environment_variable_is_reported() {
        assert_matches!(LocalSigner::from_env("OBELISK_TEST_UNSET_SIGNER"), Err(SignerError::MissingKey(_)));
    }

    #[test]
    fn garbage_key_material_is_reported() {
        std::env::set_var("OBELISK_TEST_BAD_SIGNER", "not a key");
        assert_matches!(LocalSigner::from_env("OBELISK_TEST_BAD_SIGNER"), Err(SignerError::InvalidKey(_)));
    }

    #[test]
    fn key_material_loads_from_the_environment() {
        std::env::set_var("OBELISK_TEST_GOOD_SIGNER", "0x123");
        let signer = LocalSigner::from_env("OBELISK_TEST_GOOD_SIGNER").unwrap();
        assert_eq!(signer.public_key(), LocalSigner::from_secret(Felt::from_hex_unchecked("0x123")).public_key());
    }
}
