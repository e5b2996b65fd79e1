use std::{
    any::{type_name, TypeId},
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use indexmap::IndexMap;

use crate::{
    errors::{ConfigurationError, LookupError},
    recipe::ProductParts,
    types::TypeInfo,
};

/// A produced object and the views it can be retrieved through
pub(crate) struct Instance {
    id: String,
    declared: TypeInfo,
    product: ProductParts,
}
impl Instance {
    pub fn new(id: String, declared: TypeInfo, product: ProductParts) -> Self {
        Instance {
            id,
            declared,
            product,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn concrete(&self) -> TypeInfo {
        self.product.concrete
    }

    pub fn declared(&self) -> TypeInfo {
        self.declared
    }

    /// Returns the value as `Arc<T>`
    ///
    /// Object factories produce a fresh value, unless the factory type itself is requested.
    pub fn materialize<T: ?Sized + 'static>(&self) -> Result<Arc<T>, LookupError> {
        if let Some(factory) = &self.product.factory {
            if TypeId::of::<T>() != self.product.concrete.type_id {
                let produced = factory
                    .create()
                    .map_err(|error| LookupError::ProductionFailed {
                        id: self.id.clone(),
                        error: Arc::new(error),
                    })?;

                return produced.downcast_ref::<Arc<T>>().cloned().ok_or(
                    LookupError::DowncastFailed {
                        required_type: type_name::<T>(),
                        actual_type: factory.product().type_name,
                    },
                );
            }
        }

        self.product
            .declared_view
            .as_ref()
            .and_then(|view| view.downcast_ref::<Arc<T>>())
            .or_else(|| self.product.value.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or(LookupError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type: self.product.concrete.type_name,
            })
    }

    pub fn release(&self) {
        if let Some(release) = &self.product.release {
            tracing::debug!("Releasing instance '{}'", self.id);
            release.release();
        }
    }
}

/// Produced instances by id, indexed by concrete and declared type
#[derive(Default)]
pub(crate) struct InstanceStore {
    instances: IndexMap<String, Arc<Instance>>,
    by_concrete: HashMap<TypeId, BTreeSet<String>>,
    by_declared: HashMap<TypeId, BTreeSet<String>>,
}
impl InstanceStore {
    pub fn insert(&mut self, instance: Instance) -> Result<(), ConfigurationError> {
        if self.instances.contains_key(instance.id()) {
            return Err(ConfigurationError::DuplicateInstance(instance.id));
        }

        let id = instance.id.clone();
        self.by_concrete
            .entry(instance.concrete().type_id)
            .or_default()
            .insert(id.clone());
        self.by_declared
            .entry(instance.declared().type_id)
            .or_default()
            .insert(id.clone());
        self.instances.insert(id, Arc::new(instance));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Instance>> {
        self.instances.get(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    /// True if any instance could answer a lookup for the type
    pub fn contains_type(&self, info: TypeInfo) -> bool {
        self.by_declared.contains_key(&info.type_id)
            || self.by_concrete.contains_key(&info.type_id)
            || self.instances.contains_key(info.name())
    }

    /// Resolves a recipe input: id named like the type, then a unique concrete match,
    /// then a unique declared match
    pub fn resolve_input(&self, info: TypeInfo) -> Option<Arc<Instance>> {
        if let Some(instance) = self.instances.get(info.name()) {
            return Some(instance.clone());
        }

        self.unique(&self.by_concrete, info.type_id)
            .or_else(|| self.unique(&self.by_declared, info.type_id))
    }

    /// Looks up a single instance by type: declared index, concrete index, then id
    pub fn lookup_type(&self, info: TypeInfo) -> Result<Arc<Instance>, LookupError> {
        for index in [&self.by_declared, &self.by_concrete] {
            let Some(ids) = index.get(&info.type_id) else {
                continue;
            };

            if ids.len() > 1 {
                return Err(LookupError::Ambiguous {
                    requested: info.type_name,
                    candidates: ids.iter().cloned().collect(),
                });
            }
            if let Some(instance) = ids.first().and_then(|id| self.instances.get(id)) {
                return Ok(instance.clone());
            }
        }

        self.instances
            .get(info.name())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(info.name().to_string()))
    }

    /// Every instance declared as the type, or if there are none, every instance of that concrete type
    pub fn assignable(&self, info: TypeInfo) -> Vec<Arc<Instance>> {
        let ids = self
            .by_declared
            .get(&info.type_id)
            .or_else(|| self.by_concrete.get(&info.type_id));

        ids.into_iter()
            .flatten()
            .filter_map(|id| self.instances.get(id).cloned())
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Empties the store, returning instances newest first
    pub fn drain(&mut self) -> Vec<Arc<Instance>> {
        self.by_concrete.clear();
        self.by_declared.clear();
        self.instances
            .drain(..)
            .rev()
            .map(|(_, instance)| instance)
            .collect()
    }

    fn unique(
        &self,
        index: &HashMap<TypeId, BTreeSet<String>>,
        type_id: TypeId,
    ) -> Option<Arc<Instance>> {
        match index.get(&type_id) {
            Some(ids) if ids.len() == 1 => ids.first().and_then(|id| self.instances.get(id)).cloned(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{factories::Release, recipe::Product};

    trait Tool: Send + Sync {
        fn name(&self) -> &str;
    }
    struct Hammer;
    impl Tool for Hammer {
        fn name(&self) -> &str {
            "hammer"
        }
    }
    struct Saw;
    impl Tool for Saw {
        fn name(&self) -> &str {
            "saw"
        }
    }

    fn tool<C: Tool + 'static>(id: &str, tool: C) -> Instance {
        let product = Product::of(tool).as_declared::<dyn Tool>(|it| it);
        Instance::new(id.into(), TypeInfo::of::<dyn Tool>(), product.into_parts())
    }

    #[test]
    fn unique_declared_type_is_found() {
        let mut store = InstanceStore::default();
        store.insert(tool("hammer", Hammer)).unwrap();

        let by_declared = store.lookup_type(TypeInfo::of::<dyn Tool>()).unwrap();
        assert_eq!(by_declared.materialize::<dyn Tool>().unwrap().name(), "hammer");

        let by_concrete = store.lookup_type(TypeInfo::of::<Hammer>()).unwrap();
        assert!(by_concrete.materialize::<Hammer>().is_ok());
        assert!(store.contains_type(TypeInfo::of::<Hammer>()));
    }

    #[test]
    fn shared_declared_type_is_ambiguous() {
        let mut store = InstanceStore::default();
        store.insert(tool("saw", Saw)).unwrap();
        store.insert(tool("hammer", Hammer)).unwrap();

        let error = store.lookup_type(TypeInfo::of::<dyn Tool>()).err().unwrap();
        assert_eq!(error.candidates(), ["hammer", "saw"]);

        // Concrete types still pick a unique instance
        assert!(store.resolve_input(TypeInfo::of::<Saw>()).is_some());
        assert!(store.resolve_input(TypeInfo::of::<dyn Tool>()).is_none());
        assert_eq!(store.assignable(TypeInfo::of::<dyn Tool>()).len(), 2);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut store = InstanceStore::default();
        store.insert(tool("tool", Hammer)).unwrap();

        let error = store.insert(tool("tool", Saw)).unwrap_err();
        assert!(matches!(error, ConfigurationError::DuplicateInstance(id) if id == "tool"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn input_prefers_instance_named_after_type() {
        let mut store = InstanceStore::default();
        store
            .insert(tool(TypeInfo::of::<dyn Tool>().name(), Hammer))
            .unwrap();
        store.insert(tool("saw", Saw)).unwrap();

        let input = store.resolve_input(TypeInfo::of::<dyn Tool>()).unwrap();
        assert_eq!(input.id(), TypeInfo::of::<dyn Tool>().name());
    }

    #[test]
    fn drain_returns_newest_first() {
        struct Counted(Arc<AtomicUsize>);
        impl Release for Counted {
            fn release(&self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let released = Arc::new(AtomicUsize::new(0));
        let mut store = InstanceStore::default();
        for id in ["first", "second"] {
            let product = Product::of(Counted(released.clone()))
                .releasable()
                .as_self();
            store
                .insert(Instance::new(id.into(), TypeInfo::of::<Counted>(), product.into_parts()))
                .unwrap();
        }

        let drained = store.drain();
        let ids: Vec<_> = drained.iter().map(|instance| instance.id()).collect();
        assert_eq!(ids, ["second", "first"]);
        assert_eq!(store.len(), 0);
        assert!(!store.contains_type(TypeInfo::of::<Counted>()));

        drained.iter().for_each(|instance| instance.release());
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }
}
