//! Wallet adapter abstraction for the Solgate client.
//!
//! A [`WalletAdapter`] mediates connect/disconnect with one wallet
//! vendor. Adapters deliver lifecycle events over a bound channel; the
//! session controller owns the binding and guarantees that at most one
//! adapter holds a live binding at any time.
//!
//! Concrete adapters:
//! - [`relay::RelayAdapter`] — pairs with a phone/extension wallet
//!   through a rendezvous relay (pairing URL out, wallet address back).
//! - [`local::LocalAdapter`] — deterministic in-process adapter for
//!   development and tests.

pub mod adapter;
pub mod factory;
pub mod local;
pub mod relay;

pub use adapter::{AdapterEvent, WalletAdapter};
pub use factory::{usable, AdapterFactory, LocalFactory, RelayFactory, StaticFactory};
pub use local::LocalAdapter;
pub use relay::{RelayAdapter, WalletVendor, DEFAULT_RELAY_URL};
