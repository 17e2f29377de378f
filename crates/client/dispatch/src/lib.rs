//! Target resolution and the call/invoke dispatch boundary.
//!
//! Resolution failures are fatal and propagate; every executor failure is
//! translated into a [`DispatchOutcome::Failed`] value instead of an error,
//! so scripts and tests must treat the outcome, never a panic or propagated
//! error, as the failure signal. Deploy and declare flows live here too, as
//! they are what feeds the deployment registry.

mod contract_ref;
mod deploy;
mod dispatcher;

pub use contract_ref::{ContractRef, ResolutionError, ResolvedContract};
pub use deploy::{DeclareRequest, DeclaredClass, DeployError, DeployRequest, DeployedContract};
pub use dispatcher::{CallKind, DispatchFailure, DispatchOutcome, Dispatcher, InvokeOptions};
