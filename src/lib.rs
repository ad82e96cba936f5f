//! Replica set test-cluster orchestration.
//!
//! Provisions the nodes of a replicated data store, submits the membership,
//! waits for the set to converge and then injects failures (targeted
//! shutdown, restart, step-down) so client test suites can exercise
//! elections and failover.
//!
//! Node processes and the wire protocol stay outside this crate: callers plug
//! them in through [`NodeManager`] and [`ClusterClient`]. The [`testkit`]
//! module provides an in-memory replica set implementing both.

mod client;
mod config;
pub mod constants;
mod convergence;
mod errors;
mod membership;
mod node;
mod orchestrator;
pub mod testkit;
mod utils;

pub use client::*;
pub use config::*;
pub use convergence::*;
pub use errors::*;
pub use membership::*;
pub use node::*;
pub use orchestrator::*;
