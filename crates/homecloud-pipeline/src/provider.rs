use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use homecloud_core::{DocumentProvider, FileProvider, ProviderKind, RecordProvider};

use crate::error::ConfigError;

/// A capability-typed handle to one backing-store singleton.
///
/// Handles are cheap to clone (an `Arc` per variant) and never own the
/// provider; the same instance is shared by every command bound to it.
#[derive(Clone)]
pub enum ProviderHandle {
    FileSystem(Arc<dyn FileProvider>),
    DataStore(Arc<dyn RecordProvider>),
    Aggregation(Arc<dyn DocumentProvider>),
}

impl ProviderHandle {
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderHandle::FileSystem(_) => ProviderKind::FileSystem,
            ProviderHandle::DataStore(_) => ProviderKind::DataStore,
            ProviderHandle::Aggregation(_) => ProviderKind::Aggregation,
        }
    }

    #[must_use]
    pub fn as_file_system(&self) -> Option<&dyn FileProvider> {
        match self {
            ProviderHandle::FileSystem(provider) => Some(provider.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_data_store(&self) -> Option<&dyn RecordProvider> {
        match self {
            ProviderHandle::DataStore(provider) => Some(provider.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_aggregation(&self) -> Option<&dyn DocumentProvider> {
        match self {
            ProviderHandle::Aggregation(provider) => Some(provider.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProviderHandle").field(&self.kind()).finish()
    }
}

/// Immutable map from provider kind to its singleton handle.
///
/// Built once at startup through [`ProviderRegistry::builder`] and injected
/// into the command factory; resolution of an unregistered kind is a
/// configuration error.
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, ProviderHandle>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder {
            handles: Vec::new(),
        }
    }

    /// Resolve the handle registered for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProviderUnregistered` if no provider of this
    /// kind was registered.
    pub fn get(&self, kind: ProviderKind) -> Result<ProviderHandle, ConfigError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or(ConfigError::ProviderUnregistered(kind))
    }

    #[must_use]
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder collecting provider handles before freezing them into a registry.
pub struct ProviderRegistryBuilder {
    handles: Vec<ProviderHandle>,
}

impl ProviderRegistryBuilder {
    #[must_use]
    pub fn register(mut self, handle: ProviderHandle) -> Self {
        self.handles.push(handle);
        self
    }

    /// Freeze the collected handles into an immutable registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateProvider` if two handles share a kind.
    pub fn build(self) -> Result<ProviderRegistry, ConfigError> {
        let mut providers = HashMap::new();
        for handle in self.handles {
            let kind = handle.kind();
            if providers.insert(kind, handle).is_some() {
                return Err(ConfigError::DuplicateProvider(kind));
            }
        }
        Ok(ProviderRegistry { providers })
    }
}
