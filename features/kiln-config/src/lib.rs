//! Kiln Config provides a registry of configs that can be injected in the rest of the
//! modules.
//!
//! The [`ConfigProvider`](provider::ConfigProvider) holds one value per config type. It is
//! also a module: expanded into a container, each config becomes an instance that
//! recipes can take as an input.
//!
//! # Examples
//!
//! ```rust
//! use kiln_config::provider::ConfigProvider;
//! use kiln_di::{Container, Definitions, Module, ModuleRef};
//!
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! struct Server {
//!     address: String,
//! }
//!
//! struct ServerModule;
//! impl Module for ServerModule {
//!     fn configure(&self, definitions: &mut Definitions) {
//!         definitions
//!             .recipe::<Server>()
//!             .input::<AppConfig>()
//!             .produce_value(|inputs| {
//!                 let config = inputs.take::<AppConfig>()?;
//!                 Ok(Server {
//!                     address: format!("{}:{}", config.host, config.port),
//!                 })
//!             });
//!     }
//! }
//!
//! let mut config_provider = ConfigProvider::new();
//! config_provider
//!     .add_config(AppConfig {
//!         host: "localhost".to_string(),
//!         port: 8080,
//!     })
//!     .unwrap();
//!
//! let container = Container::new();
//! container
//!     .expand([ModuleRef::new(config_provider), ModuleRef::new(ServerModule)])
//!     .unwrap();
//!
//! assert_eq!(container.require::<Server>().unwrap().address, "localhost:8080");
//! ```
//!
//! Kiln Config consists of the following components:
//!
//! 1. Provider - for creating a registry of configs, adding and retrieving configs
//! 2. Errors - for config errors

pub mod errors;
pub mod provider;

pub use errors::ConfigError;
pub use provider::ConfigProvider;
