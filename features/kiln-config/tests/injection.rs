use std::sync::Arc;

use kiln_config::ConfigProvider;
use kiln_di::{Container, Definitions, Module, ModuleRef, TypeInfo};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct PoolConfig {
    size: usize,
}

struct Pool {
    config: Arc<PoolConfig>,
}

struct PoolModule;
impl Module for PoolModule {
    fn configure(&self, definitions: &mut Definitions) {
        definitions
            .recipe::<Pool>()
            .input::<PoolConfig>()
            .produce_value(|inputs| {
                Ok(Pool {
                    config: inputs.take()?,
                })
            });
    }
}

fn provider(size: usize) -> ConfigProvider {
    let mut provider = ConfigProvider::new();
    provider.add_config(PoolConfig { size }).unwrap();
    provider
}

#[test]
fn configs_are_injected_as_shared_values() {
    init_tracing();
    let provider = provider(8);
    let registered = provider.get_config::<PoolConfig>().unwrap();

    let container = Container::new();
    container
        .expand([ModuleRef::new(PoolModule), ModuleRef::new(provider)])
        .unwrap();

    let pool = container.require::<Pool>().unwrap();
    assert_eq!(pool.config.size, 8);
    assert!(Arc::ptr_eq(&pool.config, &registered));
    assert!(container.contains_id(TypeInfo::of::<PoolConfig>().name()));
}

#[test]
fn configs_survive_reconfiguration() {
    init_tracing();
    let container = Container::new();
    container
        .expand([ModuleRef::new(provider(2)), ModuleRef::new(PoolModule)])
        .unwrap();
    let before = container.require::<PoolConfig>().unwrap();

    container.reconfigure().unwrap();
    assert!(Arc::ptr_eq(&before, &container.require::<PoolConfig>().unwrap()));
    assert_eq!(container.require::<Pool>().unwrap().config.size, 2);
}

#[test]
fn missing_config_leaves_recipe_unresolved() {
    init_tracing();
    let container = Container::new();
    let error = container
        .expand([ModuleRef::new(ConfigProvider::new()), ModuleRef::new(PoolModule)])
        .unwrap_err();

    assert_eq!(error.unresolved_ids(), [TypeInfo::of::<Pool>().name()]);
}

#[test]
fn only_the_first_provider_is_used() {
    init_tracing();
    let container = Container::new();
    container.expand([provider(1)]).unwrap();
    container.expand([provider(5)]).unwrap();

    assert_eq!(container.require::<PoolConfig>().unwrap().size, 1);
    assert_eq!(container.module_count(), 1);
}
