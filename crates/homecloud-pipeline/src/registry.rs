use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use homecloud_core::HandlerKind;

use crate::error::ConfigError;
use crate::factory::CommandFactory;
use crate::handler::CommandHandler;

/// Constructor closure producing a fresh handler of one kind.
pub type HandlerCtor<E> = Box<dyn Fn() -> Result<CommandHandler<E>, ConfigError> + Send + Sync>;

/// Kind-keyed table of handler constructors.
///
/// Seeded once at startup (usually via [`HandlerRegistry::with_defaults`])
/// and immutable afterwards; processors consult it from `create_handler`.
pub struct HandlerRegistry<E> {
    ctors: HashMap<HandlerKind, HandlerCtor<E>>,
}

impl<E> HandlerRegistry<E> {
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder<E> {
        HandlerRegistryBuilder {
            entries: Vec::new(),
        }
    }

    /// Register the standard constructor for every handler kind, each
    /// resolving its provider through the factory's registry.
    ///
    /// # Errors
    ///
    /// Never fails in practice; kept fallible for parity with custom
    /// builders.
    pub fn with_defaults(factory: &Arc<CommandFactory>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        for kind in HandlerKind::ALL {
            let ctor_factory = Arc::clone(factory);
            builder = builder.register(
                kind,
                Box::new(move || {
                    let provider = ctor_factory.registry().get(kind.provider_kind())?;
                    CommandHandler::new(kind, provider, Arc::clone(&ctor_factory))
                }),
            );
        }
        builder.build()
    }

    /// Construct a handler of the requested kind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HandlerUnregistered` for unknown kinds, or the
    /// constructor's own configuration error (e.g. an unregistered
    /// provider).
    pub fn create(&self, kind: HandlerKind) -> Result<CommandHandler<E>, ConfigError> {
        let ctor = self
            .ctors
            .get(&kind)
            .ok_or(ConfigError::HandlerUnregistered(kind))?;
        ctor()
    }

    #[must_use]
    pub fn contains(&self, kind: HandlerKind) -> bool {
        self.ctors.contains_key(&kind)
    }
}

impl<E> fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.ctors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder collecting handler constructors before freezing them.
pub struct HandlerRegistryBuilder<E> {
    entries: Vec<(HandlerKind, HandlerCtor<E>)>,
}

impl<E> HandlerRegistryBuilder<E> {
    #[must_use]
    pub fn register(mut self, kind: HandlerKind, ctor: HandlerCtor<E>) -> Self {
        self.entries.push((kind, ctor));
        self
    }

    /// Freeze the collected constructors into an immutable registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateHandler` if a kind was registered
    /// twice.
    pub fn build(self) -> Result<HandlerRegistry<E>, ConfigError> {
        let mut ctors = HashMap::new();
        for (kind, ctor) in self.entries {
            if ctors.insert(kind, ctor).is_some() {
                return Err(ConfigError::DuplicateHandler(kind));
            }
        }
        Ok(HandlerRegistry { ctors })
    }
}
