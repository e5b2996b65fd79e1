use std::{fmt::Debug, ops::Deref, sync::Arc};

use crate::{
    recipe::{Definitions, Recipe},
    types::{Injectable, TypeInfo},
};

/// A unit of configuration contributing recipes to a container
///
/// # Example
/// ```rust
/// use kiln_di::{Definitions, Module};
///
/// struct Settings {
///     retries: u32,
/// }
///
/// struct SettingsModule;
/// impl Module for SettingsModule {
///     fn configure(&self, definitions: &mut Definitions) {
///         definitions
///             .recipe::<Settings>()
///             .produce_value(|_| Ok(Settings { retries: 3 }));
///     }
/// }
/// ```
pub trait Module: Injectable {
    fn info() -> TypeInfo
    where
        Self: Sized,
    {
        TypeInfo::of::<Self>()
    }

    /// Declares the recipes of this module
    fn configure(&self, definitions: &mut Definitions) {
        let _ = definitions;
    }
}

/// Wrapper Trait for modules, used through [`ModuleRef`]
pub trait DynModule: Send + Sync {
    fn info(&self) -> TypeInfo;

    fn configure(&self, definitions: &mut Definitions);
}
impl<SpecificModule: Module> DynModule for SpecificModule {
    fn info(&self) -> TypeInfo {
        <SpecificModule as Module>::info()
    }

    fn configure(&self, definitions: &mut Definitions) {
        <SpecificModule as Module>::configure(self, definitions)
    }
}

/// Shared reference to a type erased module
#[derive(Clone)]
pub struct ModuleRef(Arc<dyn DynModule>);
impl ModuleRef {
    pub fn new<M: Module>(module: M) -> Self {
        ModuleRef(Arc::new(module))
    }
}
impl<M: Module> From<M> for ModuleRef {
    fn from(module: M) -> Self {
        ModuleRef::new(module)
    }
}
impl Deref for ModuleRef {
    type Target = dyn DynModule;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
impl Debug for ModuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ModuleRef").field(&self.info()).finish()
    }
}

/// Strategy turning a module into its recipes
pub trait RecipeExtractor: Send + Sync {
    fn extract(&self, module: &dyn DynModule) -> Vec<Recipe>;
}

/// Extracts the recipes a module declares in [`Module::configure`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfiguredRecipes;
impl RecipeExtractor for ConfiguredRecipes {
    fn extract(&self, module: &dyn DynModule) -> Vec<Recipe> {
        let mut definitions = Definitions::new(module.info());
        module.configure(&mut definitions);
        definitions.into_recipes()
    }
}
