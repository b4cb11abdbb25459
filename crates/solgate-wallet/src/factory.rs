//! Adapter discovery.
//!
//! The capability check the controller performs once at startup goes
//! through an [`AdapterFactory`]: whichever concrete wallet plumbing is
//! linked feeds the factory, and the controller never probes for vendor
//! libraries itself.

use std::sync::Mutex;

use solgate_types::{Result, SolgateError, WalletAddress};

use crate::adapter::WalletAdapter;
use crate::local::LocalAdapter;
use crate::relay::{RelayAdapter, WalletVendor};

// ---------------------------------------------------------------------------
// AdapterFactory trait
// ---------------------------------------------------------------------------

/// Produces the wallet adapters available in this build.
///
/// A factory error is a fatal startup condition (the wallet plumbing is
/// broken); an *empty* adapter list is not — the controller renders a
/// terminal "no compatible wallets" view instead.
pub trait AdapterFactory: Send + Sync {
    /// Instantiates the configured adapters.
    fn discover(&self) -> Result<Vec<Box<dyn WalletAdapter>>>;
}

/// Filters discovered adapters down to the usable ones.
///
/// An adapter is usable iff it exposes a non-empty name; anything else
/// is skipped with a warning rather than crashing the session.
pub fn usable(adapters: Vec<Box<dyn WalletAdapter>>) -> Vec<Box<dyn WalletAdapter>> {
    adapters
        .into_iter()
        .filter(|a| {
            let ok = !a.name().is_empty();
            if !ok {
                tracing::warn!("skipping adapter with empty name");
            }
            ok
        })
        .collect()
}

// ---------------------------------------------------------------------------
// RelayFactory
// ---------------------------------------------------------------------------

/// One relay-backed adapter per configured vendor.
pub struct RelayFactory {
    relay_url: String,
    vendors: Vec<WalletVendor>,
}

impl RelayFactory {
    /// Factory for the given vendors against one relay.
    pub fn new(relay_url: impl Into<String>, vendors: Vec<WalletVendor>) -> Self {
        Self {
            relay_url: relay_url.into(),
            vendors,
        }
    }
}

impl AdapterFactory for RelayFactory {
    fn discover(&self) -> Result<Vec<Box<dyn WalletAdapter>>> {
        let mut adapters: Vec<Box<dyn WalletAdapter>> = Vec::with_capacity(self.vendors.len());
        for vendor in &self.vendors {
            adapters.push(Box::new(RelayAdapter::new(*vendor, self.relay_url.clone())?));
        }
        Ok(adapters)
    }
}

// ---------------------------------------------------------------------------
// LocalFactory
// ---------------------------------------------------------------------------

/// A single in-process adapter with a fixed address (development mode).
pub struct LocalFactory {
    name: String,
    address: WalletAddress,
}

impl LocalFactory {
    /// Factory yielding one local adapter.
    pub fn new(name: impl Into<String>, address: WalletAddress) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

impl AdapterFactory for LocalFactory {
    fn discover(&self) -> Result<Vec<Box<dyn WalletAdapter>>> {
        Ok(vec![Box::new(LocalAdapter::new(
            self.name.clone(),
            self.address.clone(),
        ))])
    }
}

// ---------------------------------------------------------------------------
// StaticFactory
// ---------------------------------------------------------------------------

/// Hands out a pre-built adapter list, once.
///
/// Used by tests that need remote-control handles to the adapters they
/// feed into the controller.
pub struct StaticFactory {
    adapters: Mutex<Option<Vec<Box<dyn WalletAdapter>>>>,
}

impl StaticFactory {
    /// Factory around pre-built adapters.
    pub fn new(adapters: Vec<Box<dyn WalletAdapter>>) -> Self {
        Self {
            adapters: Mutex::new(Some(adapters)),
        }
    }

    /// Factory yielding no adapters at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl AdapterFactory for StaticFactory {
    fn discover(&self) -> Result<Vec<Box<dyn WalletAdapter>>> {
        self.adapters
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| SolgateError::AdapterError {
                reason: "adapters already handed out".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> WalletAddress {
        WalletAddress::new("4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi").unwrap()
    }

    #[test]
    fn local_factory_discovers_one_adapter() -> Result<()> {
        let factory = LocalFactory::new("Local", address());
        let adapters = factory.discover()?;
        assert_eq!(adapters.len(), 1);
        assert_eq!(adapters[0].name(), "Local");
        Ok(())
    }

    #[tokio::test]
    async fn relay_factory_discovers_per_vendor() -> Result<()> {
        let factory = RelayFactory::new(
            "https://relay.example.org",
            vec![WalletVendor::Phantom, WalletVendor::Solflare],
        );
        let adapters = factory.discover()?;
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Phantom", "Solflare"]);
        Ok(())
    }

    #[test]
    fn usable_filters_empty_names() {
        let adapters: Vec<Box<dyn WalletAdapter>> = vec![
            Box::new(LocalAdapter::new("Phantom", address())),
            Box::new(LocalAdapter::new("", address())),
        ];
        let usable = usable(adapters);
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].name(), "Phantom");
    }

    #[test]
    fn static_factory_hands_out_once() {
        let factory = StaticFactory::new(vec![Box::new(LocalAdapter::new("Local", address()))]);
        assert!(factory.discover().is_ok());
        assert!(factory.discover().is_err());
    }

    #[test]
    fn empty_factory_is_not_an_error() -> Result<()> {
        let factory = StaticFactory::empty();
        assert!(factory.discover()?.is_empty());
        Ok(())
    }
}
