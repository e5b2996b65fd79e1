use std::sync::Arc;

use kiln_di::{discover_modules, Container, Definitions, Module, TypeInfo};

struct Clock {
    offset: i64,
}
struct Scheduler {
    clock: Arc<Clock>,
}

#[derive(Default)]
struct TimeModule;
impl Module for TimeModule {
    fn configure(&self, definitions: &mut Definitions) {
        // Only used by the configured strategy, discovery reads the declared recipes
        definitions.recipe::<u8>().id("unused").produce_value(|_| Ok(0));
    }
}
kiln_di::module!(TimeModule);

#[derive(Default)]
struct SchedulingModule;
impl Module for SchedulingModule {}
kiln_di::module!(SchedulingModule);

fn clock(definitions: &mut Definitions) {
    definitions
        .recipe::<Clock>()
        .produce_value(|_| Ok(Clock { offset: 2 }));
}
kiln_di::recipe!(TimeModule => clock);

fn scheduler(definitions: &mut Definitions) {
    definitions
        .recipe::<Scheduler>()
        .input::<Clock>()
        .produce_value(|inputs| {
            Ok(Scheduler {
                clock: inputs.take()?,
            })
        });
}
kiln_di::recipe!(SchedulingModule => scheduler);

#[test]
fn modules_are_discovered_in_name_order() {
    let names: Vec<_> = discover_modules()
        .iter()
        .map(|module| module.info())
        .collect();

    assert_eq!(
        names,
        [
            TypeInfo::of::<SchedulingModule>(),
            TypeInfo::of::<TimeModule>()
        ]
    );
}

#[test]
fn discovered_container_uses_declared_recipes() {
    let container = Container::discover().unwrap();

    let scheduler = container.require::<Scheduler>().unwrap();
    assert_eq!(scheduler.clock.offset, 2);
    assert!(!container.contains_id("unused"));
    assert_eq!(container.module_count(), 2);
}

struct Programmatic;
impl Module for Programmatic {
    fn configure(&self, definitions: &mut Definitions) {
        clock(definitions);
        scheduler(definitions);
    }
}

#[test]
fn declared_and_configured_recipes_agree() {
    let discovered = Container::discover().unwrap();
    let configured = Container::new();
    configured.expand([Programmatic]).unwrap();

    let mut discovered_ids = discovered.ids();
    let mut configured_ids = configured.ids();
    discovered_ids.sort();
    configured_ids.sort();
    assert_eq!(discovered_ids, configured_ids);
}
