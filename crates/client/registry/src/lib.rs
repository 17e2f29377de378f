//! Append-only registry mapping human identifiers to deployed contract
//! addresses, one newline-delimited store per network.
//!
//! Records are immutable once written. Redeploys append a new record for the
//! same identifier instead of rewriting anything, and lookups scan in append
//! order (first match wins). Reads take no lock; writes rely on whole-line
//! `O_APPEND` appends so parallel deploy jobs never interleave mid-line.

use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Lines, Write};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no deployment registered as `{identifier}` on network `{network}`")]
    NotFound { identifier: String, network: String },
    #[error("malformed registry entry at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding registry entry: {0}")]
    Encode(serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One deployment. `abi` is an opaque reference (an artifact path or a class
/// hash rendering), never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub identifier: String,
    pub address: Felt,
    pub abi: String,
}

impl DeploymentRecord {
    pub fn new(identifier: impl Into<String>, address: Felt, abi: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), address, abi: abi.into() }
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentRegistry {
    base_dir: PathBuf,
}

impl DeploymentRegistry {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Path of the per-network record store.
    pub fn store_path(&self, network: &str) -> PathBuf {
        self.base_dir.join(format!("{network}.deployments.jsonl"))
    }

    /// Appends a record. Duplicate identifiers are legal and expected across
    /// redeploys; nothing is ever overwritten.
    pub fn register(&self, network: &str, record: &DeploymentRecord) -> Result<(), RegistryError> {
        fs::create_dir_all(&self.base_dir)?;
        let mut line = serde_json::to_vec(record).map_err(RegistryError::Encode)?;
        line.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(self.store_path(network))?;
        // One write per record on an O_APPEND handle: concurrent registrations
        // cannot interleave mid-line.
        file.write_all(&line)?;

        tracing::debug!(
            target: "registry",
            "registered `{}` -> {:#x} on `{network}`",
            record.identifier,
            record.address
        );
        Ok(())
    }

    /// All records for `identifier` on `network`, lazily, in append order.
    ///
    /// A missing store yields an empty sequence; a corrupted line surfaces as
    /// [`RegistryError::Malformed`] when reached.
    pub fn load(&self, identifier: &str, network: &str) -> Result<RecordIter, RegistryError> {
        let path = self.store_path(network);
        let lines = match File::open(&path) {
            Ok(file) => Some(BufReader::new(file).lines()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(RecordIter { path, identifier: identifier.to_string(), lines, line_no: 0 })
    }

    /// The first (earliest) record for `identifier`, or
    /// [`RegistryError::NotFound`].
    pub fn load_first(&self, identifier: &str, network: &str) -> Result<DeploymentRecord, RegistryError> {
        match self.load(identifier, network)?.next() {
            Some(record) => record,
            None => {
                Err(RegistryError::NotFound { identifier: identifier.to_string(), network: network.to_string() })
            }
        }
    }
}

/// Lazy scan over one network's record store.
pub struct RecordIter {
    path: PathBuf,
    identifier: String,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
}

impl Iterator for RecordIter {
    type Item = Result<DeploymentRecord, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        loop {
            self.line_no += 1;
            let line = match lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DeploymentRecord>(&line) {
                Ok(record) if record.identifier == self.identifier => return Some(Ok(record)),
                Ok(_) => continue,
                Err(source) => {
                    return Some(Err(RegistryError::Malformed {
                        path: self.path.clone(),
                        line: self.line_no,
                        source,
                    }))
                }
            }
        }
    }
}
