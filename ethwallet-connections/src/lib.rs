//! Named Ethereum connections with signing-aware request dispatch.
//!
//! A [`ConnectionRegistry`] maps network names to [`Connection`]s, each a JSON-RPC provider
//! optionally paired with a local private key. The [`EthereumWallet`] resolves a
//! [`ConnectionRef`] against the registry and either answers a request locally (chain id,
//! signing) or forwards it to the node, see [`METHOD_TABLE`].
//!
//! ```no_run
//! use ethwallet_connections::{
//!     ArgsRequest, Connection, ConnectionRegistry, EthereumWallet, ProviderSource, SignerSource,
//! };
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let local = Connection::new(
//!     ProviderSource::Url("http://localhost:8545".to_string()),
//!     SignerSource::Hex("0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d".to_string()),
//! )?;
//! let registry = ConnectionRegistry::new([("local", local)], Some("local"))?;
//! let wallet = EthereumWallet::new(registry);
//!
//! let chain_id = wallet
//!     .request(ArgsRequest { method: "eth_chainId".to_string(), ..Default::default() })
//!     .await?;
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

mod config;
pub use config::{NetworkConfig, WalletConfig, INFURA_PROJECT_ID_ENV};

mod connection;
pub use connection::{Connection, ProviderSource, SignerSource, Snapshot};

pub mod dispatcher;
pub use dispatcher::{MethodRule, RequestDispatcher, METHOD_TABLE};

mod error;
pub use error::WalletError;

mod registry;
pub use registry::{ConnectionRef, ConnectionRegistry, NetworkRef};

pub mod types;
pub use types::*;

mod wallet;
pub use wallet::EthereumWallet;
