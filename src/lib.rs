#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms, unreachable_pub)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # ethwallet
//!
//! Issue Ethereum JSON-RPC requests against named network connections, signing locally when
//! a connection holds a private key, and wait for transactions to be confirmed.
//!
//! # Quickstart
//!
//! A prelude is provided which imports all the important things for you.
//!
//! ```no_run
//! use ethwallet::prelude::*;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WalletConfig::from_json_str(r#"{
//!     "networks": {
//!         "local": {
//!             "provider": "http://localhost:8545",
//!             "signer": "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d"
//!         }
//!     },
//!     "defaultNetwork": "local"
//! }"#)?;
//! let wallet = EthereumWallet::new(ConnectionRegistry::from_config(&config)?);
//!
//! // answered by the local signer
//! let tx_hash = wallet
//!     .request(ArgsRequest {
//!         method: "eth_sendTransaction".to_string(),
//!         params: Some(r#"[{"to":"0x8ba1f109551bd432803012645ac136ddd64dba72","value":"0x1"}]"#.to_string()),
//!         connection: None,
//!     })
//!     .await?;
//!
//! // forwarded to the node
//! let block = wallet
//!     .request(ArgsRequest { method: "eth_blockNumber".to_string(), ..Default::default() })
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// # Named connections and request dispatch
///
/// The registry of network connections, the method table deciding which requests are
/// answered locally, and the wallet surface tying them together.
pub mod connections {
    pub use ethwallet_connections::*;
}

/// # Clients for interacting with Ethereum nodes
///
/// An object-safe JSON-RPC transport trait with HTTP and mock implementations, the provider
/// handle caching the chain id, and the confirmation waiter.
///
/// ```no_run
/// use ethwallet::providers::Provider;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Provider::try_from("http://localhost:8545")?;
/// let chain_id = provider.chain_id().await?;
/// # Ok(())
/// # }
/// ```
pub mod providers {
    pub use ethwallet_providers::*;
}

/// # Local signing
///
/// Sign messages, EIP-712 typed data and transactions with a private key held in memory.
///
/// ```
/// use ethwallet::signers::{LocalWallet, Signer};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet: LocalWallet =
///     "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".parse()?;
/// let signature = wallet.sign_message("Some data").await?;
/// assert_eq!(signature.recover("Some data")?, wallet.address());
/// # Ok(())
/// # }
/// ```
pub mod signers {
    pub use ethwallet_signers::*;
}

/// # Ethereum types and utilities
///
/// Primitive types, transaction envelopes, EIP-712 typed data, the known network catalog and
/// hashing helpers.
pub mod core {
    pub use ethwallet_core::*;
}

pub use ethwallet_core::utils;

/// Easy imports of frequently used type definitions and traits
pub mod prelude {
    pub use ethwallet_connections::*;

    pub use ethwallet_providers::*;

    pub use ethwallet_signers::*;

    pub use ethwallet_core::types::*;
}
