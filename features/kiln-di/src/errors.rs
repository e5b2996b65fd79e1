use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Errors while registering modules or resolving their recipes
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    /// Two pending recipes share an id
    #[error("A recipe with id '{id}' is already registered - rejected recipe from module '{module}'")]
    DuplicateRecipe { id: String, module: TypeInfo },

    /// A recipe's id already has a produced instance
    #[error("An object with the same identifier has already been created in the container: '{0}'")]
    DuplicateInstance(String),

    /// Recipes whose inputs could never be satisfied - missing or circular dependencies
    #[error("Unable to resolve recipes identified as: {}", .0.join(", "))]
    Unresolved(Vec<String>),

    /// A producer failed to build
    #[error("Producer for '{id}' failed - error: {error:?}")]
    ProducerFailed { id: String, error: Arc<DynError> },
}

impl ConfigurationError {
    /// Ids of all recipes the pass could not build, empty for other kinds
    pub fn unresolved_ids(&self) -> &[String] {
        match self {
            ConfigurationError::Unresolved(ids) => ids,
            _ => &[],
        }
    }
}

/// Errors when trying to retrieve an instance
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    /// No instance for the requested id or type
    #[error("No object found in the container for '{0}'")]
    NotFound(String),

    /// More than one instance satisfies the requested type - select one by id
    #[error("{} objects found for '{requested}', use an object id to select among: {}", .candidates.len(), .candidates.join(", "))]
    Ambiguous {
        requested: &'static str,
        candidates: Vec<String>,
    },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },

    /// An object factory failed to produce a value
    #[error("Object factory '{id}' failed - error: {error:?}")]
    ProductionFailed { id: String, error: Arc<DynError> },

    /// A container handle was used after its container was dropped
    #[error("The container behind this handle has been dropped")]
    ContainerDropped,
}

impl LookupError {
    /// Candidate ids for an ambiguous lookup, empty for other kinds
    pub fn candidates(&self) -> &[String] {
        match self {
            LookupError::Ambiguous { candidates, .. } => candidates,
            _ => &[],
        }
    }
}
