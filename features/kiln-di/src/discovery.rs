//! Link-time registration of modules and recipes
//!
//! Modules marked with [`module!`](crate::module) are collected by [`discover_modules`].
//! Functions marked with [`recipe!`](crate::recipe) are read by the [`DeclaredRecipes`] extractor.
use std::any::TypeId;

use crate::{
    module::{DynModule, Module, ModuleRef, RecipeExtractor},
    recipe::{Definitions, Recipe},
};

/// A module registered for discovery
pub struct ModuleDeclaration {
    make: fn() -> ModuleRef,
}
impl ModuleDeclaration {
    pub const fn of<M: Module + Default>() -> Self {
        ModuleDeclaration {
            make: make_module::<M>,
        }
    }
}
fn make_module<M: Module + Default>() -> ModuleRef {
    ModuleRef::new(M::default())
}
inventory::collect!(ModuleDeclaration);

/// A recipe function attached to a module
pub struct RecipeDeclaration {
    module: fn() -> TypeId,
    declare: fn(&mut Definitions),
}
impl RecipeDeclaration {
    pub const fn new(module: fn() -> TypeId, declare: fn(&mut Definitions)) -> Self {
        RecipeDeclaration { module, declare }
    }
}
inventory::collect!(RecipeDeclaration);

/// Every module marked for discovery, ordered by type name
pub fn discover_modules() -> Vec<ModuleRef> {
    let mut modules: Vec<ModuleRef> = inventory::iter::<ModuleDeclaration>
        .into_iter()
        .map(|declaration| (declaration.make)())
        .collect();
    kiln_sort::sort_by(&mut modules, |a, b| a.info().type_name.cmp(b.info().type_name));

    tracing::debug!("Discovered {} modules", modules.len());
    modules
}

/// Extracts the recipe functions declared for a module with [`recipe!`](crate::recipe)
///
/// The module's own `configure` is not consulted.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredRecipes;
impl RecipeExtractor for DeclaredRecipes {
    fn extract(&self, module: &dyn DynModule) -> Vec<Recipe> {
        let info = module.info();
        let mut definitions = Definitions::new(info);

        for declaration in inventory::iter::<RecipeDeclaration> {
            if (declaration.module)() == info.type_id {
                (declaration.declare)(&mut definitions);
            }
        }

        definitions.into_recipes()
    }
}

/// Marks a module for [`discover_modules`]
///
/// The module must implement `Default`.
///
/// # Example
/// ```rust
/// #[derive(Default)]
/// struct Storage;
/// impl kiln_di::Module for Storage {}
///
/// kiln_di::module!(Storage);
/// ```
#[macro_export]
macro_rules! module {
    ($module:ty) => {
        $crate::inventory::submit! {
            $crate::discovery::ModuleDeclaration::of::<$module>()
        }
    };
}

/// Attaches a recipe function to a module for the [`DeclaredRecipes`] extractor
///
/// # Example
/// ```rust
/// use kiln_di::Definitions;
///
/// #[derive(Default)]
/// struct Storage;
/// impl kiln_di::Module for Storage {}
///
/// fn capacity(definitions: &mut Definitions) {
///     definitions.recipe::<u64>().id("capacity").produce_value(|_| Ok(1024));
/// }
///
/// kiln_di::recipe!(Storage => capacity);
/// ```
#[macro_export]
macro_rules! recipe {
    ($module:ty => $declare:path) => {
        $crate::inventory::submit! {
            $crate::discovery::RecipeDeclaration::new(
                ::std::any::TypeId::of::<$module>,
                $declare,
            )
        }
    };
}
