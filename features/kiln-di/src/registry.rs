use std::{any::TypeId, collections::HashSet, sync::Arc};

use indexmap::IndexMap;

use crate::{
    errors::ConfigurationError,
    module::{ModuleRef, RecipeExtractor},
    recipe::Recipe,
};

/// Registered modules and the recipes waiting for resolution
pub(crate) struct DefinitionRegistry {
    extractor: Arc<dyn RecipeExtractor>,
    modules: IndexMap<TypeId, ModuleRef>,
    pending: IndexMap<String, Recipe>,
}
impl DefinitionRegistry {
    pub fn new(extractor: Arc<dyn RecipeExtractor>) -> Self {
        DefinitionRegistry {
            extractor,
            modules: IndexMap::new(),
            pending: IndexMap::new(),
        }
    }

    /// Registers a module and queues its recipes
    ///
    /// Returns false if the module was already registered.
    /// A module whose recipes collide is rejected as a whole.
    pub fn register(&mut self, module: ModuleRef) -> Result<bool, ConfigurationError> {
        let info = module.info();
        if self.modules.contains_key(&info.type_id) {
            tracing::warn!("Module {info} is already registered - skipping");
            return Ok(false);
        }

        let added = stage(&*self.extractor, &module, &mut self.pending)?;
        tracing::debug!("Registered module {info} with {added} recipes");
        self.modules.insert(info.type_id, module);
        Ok(true)
    }

    pub fn take_pending(&mut self) -> Vec<Recipe> {
        self.pending.drain(..).map(|(_, recipe)| recipe).collect()
    }

    /// Puts recipes a failed pass did not build back in the queue
    pub fn restore_pending(&mut self, recipes: Vec<Recipe>) {
        for recipe in recipes {
            self.pending.insert(recipe.id.clone(), recipe);
        }
    }

    /// Drops pending recipes, keeping the registered modules
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Re-extracts the recipes of every registered module in place of the pending ones
    ///
    /// The pending recipes are kept as they are if two modules now collide.
    pub fn replay(&mut self) -> Result<(), ConfigurationError> {
        let mut staged = IndexMap::new();
        for module in self.modules.values() {
            stage(&*self.extractor, module, &mut staged)?;
        }
        self.pending = staged;
        Ok(())
    }

    /// Drops all modules and pending recipes
    pub fn forget(&mut self) {
        self.modules.clear();
        self.pending.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

/// Adds the recipes of a module to `target`, or none of them if an id collides
fn stage(
    extractor: &dyn RecipeExtractor,
    module: &ModuleRef,
    target: &mut IndexMap<String, Recipe>,
) -> Result<usize, ConfigurationError> {
    let recipes = extractor.extract(&**module);

    let mut seen = HashSet::new();
    for recipe in &recipes {
        if target.contains_key(recipe.id()) || !seen.insert(recipe.id()) {
            return Err(ConfigurationError::DuplicateRecipe {
                id: recipe.id().to_string(),
                module: recipe.module(),
            });
        }
    }

    let added = recipes.len();
    for recipe in recipes {
        target.insert(recipe.id.clone(), recipe);
    }
    Ok(added)
}
