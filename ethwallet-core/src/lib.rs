#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! Ethereum types, hashing and transaction envelopes used by the `ethwallet` crates.
//!
//! ## Signing an ethereum-prefixed message
//!
//! Signing in Ethereum is done by first prefixing the message with
//! `"\x19Ethereum Signed Message:\n" + message.length`, and then
//! signing the hash of the result.
//!
//! ```rust
//! use ethwallet_core::utils::hash_message;
//!
//! let hash = hash_message("Hello World");
//! assert_eq!(
//!     format!("{hash:?}"),
//!     "0xa1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
//! );
//! ```

pub mod types;

pub mod utils;

/// Re-export of the `ethabi` crate, whose `ethereum_types` back [`types`].
pub use ethabi as abi;

/// Re-export of the `k256` crate.
pub use k256;
