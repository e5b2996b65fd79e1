//! Kiln DI builds a container of shared instances from modules of recipes.
//!
//! A module declares recipes. Each recipe names the types it needs as inputs and a
//! producer creating the instance once those inputs exist. The container orders the
//! recipes by their inputs, so declaration order does not matter.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use kiln_di::{Container, Definitions, Module, Product};
//!
//! trait Storage: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//! struct MemoryStorage;
//! impl Storage for MemoryStorage {
//!     fn name(&self) -> &str {
//!         "memory"
//!     }
//! }
//!
//! struct Service {
//!     storage: Arc<dyn Storage>,
//! }
//!
//! struct AppModule;
//! impl Module for AppModule {
//!     fn configure(&self, definitions: &mut Definitions) {
//!         definitions
//!             .recipe::<Service>()
//!             .input::<dyn Storage>()
//!             .produce_value(|inputs| Ok(Service { storage: inputs.take()? }));
//!         definitions
//!             .recipe::<dyn Storage>()
//!             .produce(|_| Ok(Product::of(MemoryStorage).as_declared::<dyn Storage>(|it| it)));
//!     }
//! }
//!
//! let container = Container::new();
//! container.expand([AppModule]).unwrap();
//!
//! let service = container.require::<Service>().unwrap();
//! assert_eq!(service.storage.name(), "memory");
//! ```
//!
//! Kiln DI consists of the following components:
//!
//! 1. Recipe - declaring how an instance is produced and what it needs
//! 2. Module - grouping recipes, either configured in code or discovered at link time
//! 3. Container - resolving recipes and answering lookups by id or type
//! 4. Factories - object factories producing a value per lookup, and release hooks

pub mod builder;
pub mod config;
pub mod container;
pub mod discovery;
pub mod errors;
pub mod factories;
pub mod module;
pub mod recipe;
mod registry;
mod resolver;
mod store;
pub mod types;

pub use builder::ContainerBuilder;
pub use config::{ContainerConfig, RetryPolicy};
pub use container::{Container, ContainerHandle};
pub use discovery::{discover_modules, DeclaredRecipes};
pub use errors::{ConfigurationError, LookupError};
pub use factories::{ObjectFactory, Release};
pub use module::{ConfiguredRecipes, DynModule, Module, ModuleRef, RecipeExtractor};
pub use recipe::{Definitions, Inputs, Product, ProductBuilder, Recipe, RecipeBuilder};
pub use types::{DynError, Injectable, TypeInfo};

#[doc(hidden)]
pub use inventory;
