use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use kiln_di::{Definitions, Injectable, Module, Product, TypeInfo};

use crate::errors::ConfigError;

type SharedConfig = Arc<dyn Any + Send + Sync + 'static>;

struct ConfigEntry {
    info: TypeInfo,
    value: SharedConfig,
    declare: fn(&SharedConfig, &mut Definitions),
}

/// Declares a recipe handing out the shared config value
fn declare_config<T: Injectable>(value: &SharedConfig, definitions: &mut Definitions) {
    let Ok(config) = value.clone().downcast::<T>() else {
        tracing::error!("Config entry does not hold a {}", TypeInfo::of::<T>());
        return;
    };

    definitions
        .recipe::<T>()
        .produce(move |_| Ok(Product::shared(config.clone()).as_self()));
}

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type.
/// Expanded into a container, every config becomes an instance identified by its type name,
/// so recipes can take configs as inputs.
///
/// A container accepts a single `ConfigProvider`, further providers are skipped.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, ConfigEntry>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    pub fn get_config<T: Injectable>(&self) -> Option<Arc<T>> {
        self.configs
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.clone().downcast().ok())
    }

    /// Retrieve a config with specified type.
    ///
    /// If the config type is not available, it will return a [`ConfigError`] runtime error
    pub fn require_config<T: Injectable>(&self) -> Result<Arc<T>, ConfigError> {
        self.get_config()
            .ok_or(ConfigError::Missing(TypeInfo::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a
    /// [`ConfigError`] runtime error
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();

        if self.configs.contains_key(&info.type_id) {
            return Err(ConfigError::AlreadyRegistered(info));
        }

        tracing::debug!("Registered config {info}");
        self.configs.insert(
            info.type_id,
            ConfigEntry {
                info,
                value: Arc::new(config),
                declare: declare_config::<T>,
            },
        );
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    pub fn contains<T: Injectable>(&self) -> bool {
        self.configs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Module for ConfigProvider {
    fn configure(&self, definitions: &mut Definitions) {
        for entry in self.configs.values() {
            tracing::trace!("Declaring config {}", entry.info);
            (entry.declare)(&entry.value, definitions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Limits {
        max: u32,
    }

    #[test]
    fn configs_are_keyed_by_type() {
        let mut provider = ConfigProvider::new();
        provider
            .add_config(Limits { max: 3 })
            .unwrap()
            .maybe_add_config::<String>(None)
            .unwrap();

        assert_eq!(provider.len(), 1);
        assert_eq!(*provider.get_config::<Limits>().unwrap(), Limits { max: 3 });
        assert!(provider.get_config::<String>().is_none());
        assert!(matches!(
            provider.require_config::<String>(),
            Err(ConfigError::Missing(info)) if info == TypeInfo::of::<String>()
        ));
    }

    #[test]
    fn second_config_of_a_type_is_rejected() {
        let mut provider = ConfigProvider::new();
        provider.add_config(Limits { max: 1 }).unwrap();

        let error = provider.add_config(Limits { max: 2 }).err().unwrap();
        assert!(matches!(error, ConfigError::AlreadyRegistered(_)));
        assert_eq!(provider.get_config::<Limits>().unwrap().max, 1);
    }

    #[test]
    fn each_config_becomes_a_recipe() {
        let mut provider = ConfigProvider::new();
        provider
            .add_config(Limits { max: 1 })
            .unwrap()
            .add_config("name".to_string())
            .unwrap();

        let mut definitions = Definitions::new(TypeInfo::of::<ConfigProvider>());
        provider.configure(&mut definitions);

        let mut ids: Vec<_> = definitions
            .into_recipes()
            .iter()
            .map(|recipe| recipe.id().to_string())
            .collect();
        ids.sort();
        assert_eq!(
            ids,
            [TypeInfo::of::<String>().name(), TypeInfo::of::<Limits>().name()]
        );
    }
}
