use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cas::options::{normalize_provider_name, Options};
use crate::cas::provider::CertificateAuthorityService;
use crate::error::Error;
use crate::types::Result;

/// Builds a backend instance from options
pub type CasConstructor =
    Arc<dyn Fn(&Options) -> Result<Arc<dyn CertificateAuthorityService>> + Send + Sync>;

/// Backends available by name.
///
/// Built once at startup from an explicit list of constructors; a later
/// registration under the same name replaces the earlier one.
#[derive(Clone, Default)]
pub struct Registry {
    constructors: HashMap<String, CasConstructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with `backends`
    pub fn with_backends<I>(backends: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, CasConstructor)>,
    {
        let mut registry = Self::new();
        for (name, constructor) in backends {
            registry.register(name, constructor);
        }
        registry
    }

    /// Register a constructor, returning the one it replaced
    pub fn register(&mut self, name: &str, constructor: CasConstructor) -> Option<CasConstructor> {
        let name = normalize_provider_name(name);
        debug!("Registering certificate authority backend '{}'", name);
        self.constructors.insert(name, constructor)
    }

    pub fn resolve(&self, name: &str) -> Result<CasConstructor> {
        let name = normalize_provider_name(name);
        self.constructors
            .get(&name)
            .cloned()
            .ok_or(Error::UnknownBackend(name))
    }

    /// Build the backend selected by `options`; constructor errors are returned as is
    pub fn construct(&self, options: &Options) -> Result<Arc<dyn CertificateAuthorityService>> {
        let constructor = self.resolve(&options.cas_type)?;
        constructor(options)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("names", &self.names()).finish()
    }
}
