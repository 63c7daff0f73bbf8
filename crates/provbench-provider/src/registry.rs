use std::collections::BTreeMap;
use std::sync::Arc;

use crate::container::ContainerCluster;
use crate::error::ResourceError;
use crate::resource::Resource;
use crate::sql::SqlDatabaseInstance;

/// Resource types by name, as the provider exposes them.
#[derive(Default, Clone)]
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every resource this crate implements.
    pub fn builtin() -> Result<Self, ResourceError> {
        let mut registry = Self::new();
        registry
            .register(Arc::new(SqlDatabaseInstance::new()))?
            .register(Arc::new(ContainerCluster::new()))?;
        Ok(registry)
    }

    /// Register a resource under its type name. Returns `&mut self` for chaining.
    pub fn register(&mut self, resource: Arc<dyn Resource>) -> Result<&mut Self, ResourceError> {
        let name = resource.resource_type();
        if self.resources.contains_key(name) {
            return Err(ResourceError::DuplicateResource(name.to_string()));
        }
        self.resources.insert(name, resource);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(name).cloned()
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.names())
            .finish()
    }
}
