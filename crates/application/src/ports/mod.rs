//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the resolution engine and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

use std::sync::Arc;

mod file_loader;
mod provider_client;
mod value_provider;

pub use file_loader::{FileLoadError, FileLoader, LoadedFile};
pub use provider_client::{ProviderClient, ProviderError, UnconfiguredProviderClient};
pub use value_provider::{NoValueProvider, ValueProvider};

/// The set of adapters a resolver works with.
#[derive(Clone)]
pub struct ResolverPorts {
    /// Reads `file(...)` references.
    pub files: Arc<dyn FileLoader>,

    /// Invokes exports of executable files.
    pub values: Arc<dyn ValueProvider>,

    /// Serves `cf:` and `s3:` references.
    pub provider: Arc<dyn ProviderClient>,
}

impl ResolverPorts {
    /// Creates a port set from a file loader, with no executable support and
    /// no cloud provider.
    #[must_use]
    pub fn new(files: Arc<dyn FileLoader>) -> Self {
        Self {
            files,
            values: Arc::new(NoValueProvider),
            provider: Arc::new(UnconfiguredProviderClient),
        }
    }

    /// Sets the value provider for executable files.
    #[must_use]
    pub fn with_values(mut self, values: Arc<dyn ValueProvider>) -> Self {
        self.values = values;
        self
    }

    /// Sets the cloud provider client.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ProviderClient>) -> Self {
        self.provider = provider;
        self
    }
}

impl std::fmt::Debug for ResolverPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverPorts").finish_non_exhaustive()
    }
}
