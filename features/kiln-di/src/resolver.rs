use std::{collections::VecDeque, sync::Arc};

use parking_lot::RwLock;

use crate::{
    config::ContainerConfig,
    container::ContainerHandle,
    errors::ConfigurationError,
    recipe::{Inputs, Recipe},
    store::{Instance, InstanceStore},
};

/// A failed pass and the recipes it did not build
pub(crate) struct ResolveFailure {
    pub error: ConfigurationError,
    /// Excludes a recipe whose own instantiation failed
    pub unbuilt: Vec<Recipe>,
}

/// Builds recipes into instances, ordering them by their inputs
pub(crate) struct Resolver<'a> {
    store: &'a RwLock<InstanceStore>,
    handle: ContainerHandle,
    config: &'a ContainerConfig,
}
impl<'a> Resolver<'a> {
    pub fn new(
        store: &'a RwLock<InstanceStore>,
        handle: ContainerHandle,
        config: &'a ContainerConfig,
    ) -> Self {
        Resolver {
            store,
            handle,
            config,
        }
    }

    /// Runs one resolution pass, returning the number of built instances
    ///
    /// Recipes are tried fewest inputs first, ties in declaration order. Deferred
    /// recipes are retried in rounds until every recipe is built or a round builds nothing.
    pub fn resolve(&self, recipes: Vec<Recipe>) -> Result<usize, ResolveFailure> {
        let total = recipes.len();
        if total == 0 {
            return Ok(0);
        }
        tracing::debug!("Resolving {total} recipes");

        let mut ordered: Vec<(usize, Recipe)> = recipes.into_iter().enumerate().collect();
        kiln_sort::sort_by_with_threshold(
            &mut ordered,
            self.config.sort_threshold,
            |(a_at, a), (b_at, b)| {
                a.inputs
                    .len()
                    .cmp(&b.inputs.len())
                    .then_with(|| a_at.cmp(b_at))
            },
        );

        let mut deferred = VecDeque::new();
        let mut failure = None;
        let mut sorted = ordered.into_iter().map(|(_, recipe)| recipe);
        for recipe in sorted.by_ref() {
            match self.attempt(&recipe) {
                Ok(true) => {}
                Ok(false) => deferred.push_back(recipe),
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }
        if let Some(error) = failure {
            deferred.extend(sorted);
            return Err(ResolveFailure {
                error,
                unbuilt: deferred.into(),
            });
        }

        let mut round = 0;
        while !deferred.is_empty() && self.config.retry.allows(round) {
            round += 1;
            let queued = deferred.len();

            for _ in 0..queued {
                let Some(recipe) = deferred.pop_front() else {
                    break;
                };
                match self.attempt(&recipe) {
                    Ok(true) => {}
                    Ok(false) => deferred.push_back(recipe),
                    Err(error) => {
                        return Err(ResolveFailure {
                            error,
                            unbuilt: deferred.into(),
                        })
                    }
                }
            }

            if deferred.len() == queued {
                tracing::debug!("Retry round {round} built nothing - stopping");
                break;
            }
        }

        if !deferred.is_empty() {
            let ids: Vec<String> = deferred.iter().map(|recipe| recipe.id.clone()).collect();
            tracing::warn!("Unable to resolve {} recipes: {}", ids.len(), ids.join(", "));
            return Err(ResolveFailure {
                error: ConfigurationError::Unresolved(ids),
                unbuilt: deferred.into(),
            });
        }

        tracing::debug!("Resolved {total} recipes after {round} retry rounds");
        Ok(total)
    }

    /// Builds a recipe if all of its inputs are available
    ///
    /// Returns false if the recipe has to wait for other recipes.
    fn attempt(&self, recipe: &Recipe) -> Result<bool, ConfigurationError> {
        let resolved = {
            let store = self.store.read();
            if store.contains_id(&recipe.id) {
                return Err(ConfigurationError::DuplicateInstance(recipe.id.clone()));
            }

            let resolved: Option<Vec<Arc<Instance>>> = recipe
                .inputs
                .iter()
                .map(|input| store.resolve_input(*input))
                .collect();
            match resolved {
                Some(resolved) => resolved,
                None => {
                    tracing::trace!("Deferring '{}' - inputs not available yet", recipe.id);
                    return Ok(false);
                }
            }
        };

        // The store is unlocked while the producer runs
        let mut inputs = Inputs::new(&resolved, &self.handle);
        let product =
            recipe
                .produce(&mut inputs)
                .map_err(|error| ConfigurationError::ProducerFailed {
                    id: recipe.id.clone(),
                    error: Arc::new(error),
                })?;

        let instance = Instance::new(recipe.id.clone(), recipe.declared, product);
        tracing::debug!(
            "Constructed '{}' as {} declared {}",
            recipe.id,
            instance.concrete(),
            recipe.declared
        );
        self.store.write().insert(instance)?;
        Ok(true)
    }
}
