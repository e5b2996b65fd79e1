use std::{
    fmt::Debug,
    sync::{Arc, Weak},
};

use parking_lot::{Mutex, RwLock};

use crate::{
    builder::ContainerBuilder,
    config::ContainerConfig,
    discovery::{self, DeclaredRecipes},
    errors::{ConfigurationError, LookupError},
    module::{ModuleRef, RecipeExtractor},
    registry::DefinitionRegistry,
    resolver::{ResolveFailure, Resolver},
    store::InstanceStore,
    types::TypeInfo,
};

/// Container holding all produced instances
///
/// Cloning is cheap, all clones share the same instances.
///
/// # Example
/// ```rust
/// use kiln_di::{Container, Definitions, Module};
///
/// struct Greeting(String);
///
/// struct App;
/// impl Module for App {
///     fn configure(&self, definitions: &mut Definitions) {
///         definitions
///             .recipe::<Greeting>()
///             .input::<String>()
///             .produce_value(|inputs| Ok(Greeting(format!("Hello {}", inputs.take::<String>()?))));
///         definitions
///             .recipe::<String>()
///             .produce_value(|_| Ok("World".to_string()));
///     }
/// }
///
/// let container = Container::new();
/// container.expand([App]).unwrap();
/// assert_eq!(container.require::<Greeting>().unwrap().0, "Hello World");
/// ```
#[derive(Clone)]
pub struct Container(pub(crate) Arc<ContainerInner>);
pub struct ContainerInner {
    config: ContainerConfig,
    registry: Mutex<DefinitionRegistry>,
    store: RwLock<InstanceStore>,
}
impl Drop for ContainerInner {
    fn drop(&mut self) {
        for instance in self.store.get_mut().drain() {
            instance.release();
        }
    }
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.0.store.read();
        let mut map = f.debug_map();
        for id in store.ids() {
            if let Some(instance) = store.get(id) {
                map.entry(&id, &instance.concrete().type_name);
            }
        }
        map.finish()
    }
}
impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::from_parts(config, Arc::new(crate::module::ConfiguredRecipes))
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Builds a container from every discovered module and its declared recipes
    pub fn discover() -> Result<Self, ConfigurationError> {
        ContainerBuilder::new()
            .extractor(DeclaredRecipes)
            .modules(discovery::discover_modules())
            .build()
    }

    pub(crate) fn from_parts(config: ContainerConfig, extractor: Arc<dyn RecipeExtractor>) -> Self {
        Self(Arc::new(ContainerInner {
            config,
            registry: Mutex::new(DefinitionRegistry::new(extractor)),
            store: RwLock::new(InstanceStore::default()),
        }))
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.0.config
    }

    /// A handle which does not keep the container alive
    pub fn handle(&self) -> ContainerHandle {
        ContainerHandle(Arc::downgrade(&self.0))
    }

    /// Registers modules and resolves their recipes
    ///
    /// Modules registered before are skipped. Recipes left unresolved by a failed
    /// pass stay pending and are retried by the next `expand`.
    pub fn expand<I>(&self, modules: I) -> Result<&Self, ConfigurationError>
    where
        I: IntoIterator,
        I::Item: Into<ModuleRef>,
    {
        let mut registry = self.0.registry.lock();
        for module in modules {
            registry.register(module.into())?;
        }

        self.resolve_pending(&mut registry)?;
        Ok(self)
    }

    /// Releases all instances and rebuilds them from the registered modules
    ///
    /// Nothing is released if the registered modules no longer agree on their recipe ids.
    pub fn reconfigure(&self) -> Result<(), ConfigurationError> {
        let mut registry = self.0.registry.lock();
        registry.replay()?;

        let released = self.release_all();
        tracing::debug!("Reconfiguring - released {released} instances");
        self.resolve_pending(&mut registry)
    }

    /// Releases all instances and forgets every module
    pub fn dispose(&self) {
        let mut registry = self.0.registry.lock();
        registry.forget();
        let released = self.release_all();
        tracing::debug!("Disposed container - released {released} instances");
    }

    fn release_all(&self) -> usize {
        let instances = self.0.store.write().drain();
        for instance in &instances {
            instance.release();
        }
        instances.len()
    }

    fn resolve_pending(&self, registry: &mut DefinitionRegistry) -> Result<(), ConfigurationError> {
        let recipes = registry.take_pending();
        let resolver = Resolver::new(&self.0.store, self.handle(), &self.0.config);

        match resolver.resolve(recipes) {
            Ok(_) => Ok(()),
            Err(ResolveFailure { error, unbuilt }) => {
                tracing::error!("Resolution failed: {error}");
                registry.restore_pending(unbuilt);
                Err(error)
            }
        }
    }

    /// Attempts to get the instance of the requested type
    ///
    /// The declared types are searched first, then the concrete types, then an id named like the type.
    pub fn require<T: ?Sized + 'static>(&self) -> Result<Arc<T>, LookupError> {
        let instance = self.0.store.read().lookup_type(TypeInfo::of::<T>())?;
        instance.materialize()
    }

    /// Attempts to get the instance with the given id as the requested type
    pub fn require_id<T: ?Sized + 'static>(&self, id: &str) -> Result<Arc<T>, LookupError> {
        let instance = self
            .0
            .store
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))?;
        instance.materialize()
    }

    /// All instances declared as `T`, or if there are none, all instances of the concrete type `T`
    pub fn require_all<T: ?Sized + 'static>(&self) -> Result<Vec<Arc<T>>, LookupError> {
        let instances = self.0.store.read().assignable(TypeInfo::of::<T>());
        instances
            .iter()
            .map(|instance| instance.materialize())
            .collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.0.store.read().contains_id(id)
    }

    /// True if at least one instance could answer a lookup for `T`
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.0.store.read().contains_type(TypeInfo::of::<T>())
    }

    /// Ids of all instances in creation order
    pub fn ids(&self) -> Vec<String> {
        self.0.store.read().ids().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.0.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of recipes waiting for their inputs
    pub fn pending(&self) -> usize {
        self.0.registry.lock().pending_len()
    }

    pub fn module_count(&self) -> usize {
        self.0.registry.lock().module_count()
    }
}

/// Weak handle to a container, given to producers and object factories
#[derive(Clone)]
pub struct ContainerHandle(Weak<ContainerInner>);
impl Debug for ContainerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}
impl ContainerHandle {
    pub fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(Container)
    }

    pub fn require<T: ?Sized + 'static>(&self) -> Result<Arc<T>, LookupError> {
        self.container()?.require()
    }

    pub fn require_id<T: ?Sized + 'static>(&self, id: &str) -> Result<Arc<T>, LookupError> {
        self.container()?.require_id(id)
    }

    pub fn require_all<T: ?Sized + 'static>(&self) -> Result<Vec<Arc<T>>, LookupError> {
        self.container()?.require_all()
    }

    fn container(&self) -> Result<Container, LookupError> {
        self.upgrade().ok_or(LookupError::ContainerDropped)
    }
}
