//! The account abstraction: a signer capability behind a trait seam, and an
//! [`Account`] handle that relays invocations through its on-chain
//! `__execute__` entry point with serialized nonce allocation.

mod account;
mod signer;

pub use account::{account_identifier, Account, AccountError, SentTransaction};
pub use signer::{LocalSigner, Signer, SignerError};
