use std::sync::Arc;

use crate::{
    config::ContainerConfig,
    container::Container,
    errors::ConfigurationError,
    module::{ConfiguredRecipes, ModuleRef, RecipeExtractor},
};

/// Collects configuration and modules for a new container
///
/// # Example
/// ```rust
/// use kiln_di::{ContainerBuilder, ContainerConfig, Module, RetryPolicy};
///
/// struct Empty;
/// impl Module for Empty {}
///
/// let container = ContainerBuilder::new()
///     .config(ContainerConfig::default().with_retry(RetryPolicy::Rounds(3)))
///     .module(Empty)
///     .build()
///     .unwrap();
/// assert!(container.is_empty());
/// ```
pub struct ContainerBuilder {
    config: ContainerConfig,
    extractor: Arc<dyn RecipeExtractor>,
    modules: Vec<ModuleRef>,
}
impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        ContainerBuilder {
            config: ContainerConfig::default(),
            extractor: Arc::new(ConfiguredRecipes),
            modules: Vec::new(),
        }
    }
}
impl ContainerBuilder {
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the strategy turning modules into recipes
    pub fn extractor<E: RecipeExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn module(mut self, module: impl Into<ModuleRef>) -> Self {
        self.modules.push(module.into());
        self
    }

    pub fn modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ModuleRef>,
    {
        self.modules.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Creates the container and resolves all modules
    pub fn build(self) -> Result<Container, ConfigurationError> {
        let container = Container::from_parts(self.config, self.extractor);
        container.expand(self.modules)?;
        Ok(container)
    }
}
