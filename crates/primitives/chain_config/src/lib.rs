//! Network identities and their gateway/feeder endpoints.
//!
//! The named networks resolve to baked-in endpoint presets; anything else is
//! looked up in an optional YAML networks file so app-chains can be targeted
//! without recompiling.

mod network;
mod networks_file;

pub use network::{ChainConfigError, NetworkConfig, NetworkId};
pub use networks_file::CustomNetwork;
