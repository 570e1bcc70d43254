#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

mod transports;
pub use transports::*;

mod provider;
pub use provider::Provider;

mod pending_transaction;
pub use pending_transaction::{PendingTransaction, WaitState};

mod errors;
pub use errors::{ProviderError, RpcError};

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde_json::Value;
use std::fmt::Debug;

/// Trait which must be implemented by data transports to be used with the Ethereum
/// JSON-RPC provider.
///
/// Requests and responses are plain JSON values so that transports can be held behind a trait
/// object and swapped at runtime. Typed access goes through [`Provider::request`].
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait JsonRpcClient: Debug + Send + Sync {
    /// Sends a request with the provided JSON-RPC method and parameters
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}
