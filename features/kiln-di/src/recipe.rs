use std::{any::Any, fmt::Debug, marker::PhantomData, sync::Arc};

use crate::{
    container::ContainerHandle,
    errors::LookupError,
    factories::{DynObjectFactory, ObjectFactory, Release},
    store::Instance,
    types::{DynError, Injectable, TypeInfo},
};

type Producer = dyn Fn(&mut Inputs<'_>) -> Result<ProductParts, DynError> + Send + Sync;

/// A declared factory rule
///
/// Produces one instance of its declared type once all of its inputs can be resolved.
pub struct Recipe {
    pub(crate) id: String,
    pub(crate) inputs: Vec<TypeInfo>,
    pub(crate) declared: TypeInfo,
    pub(crate) module: TypeInfo,
    producer: Box<Producer>,
}
impl Debug for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("declared", &self.declared)
            .field("module", &self.module)
            .finish()
    }
}
impl Recipe {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Required input types, in the order the producer takes them
    pub fn inputs(&self) -> &[TypeInfo] {
        &self.inputs
    }

    pub fn declared(&self) -> TypeInfo {
        self.declared
    }

    /// The module which contributed this recipe
    pub fn module(&self) -> TypeInfo {
        self.module
    }

    pub(crate) fn produce(&self, inputs: &mut Inputs<'_>) -> Result<ProductParts, DynError> {
        (self.producer)(inputs)
    }
}

/// Collects the recipes of one module
pub struct Definitions {
    module: TypeInfo,
    recipes: Vec<Recipe>,
}
impl Definitions {
    pub fn new(module: TypeInfo) -> Self {
        Definitions {
            module,
            recipes: Vec::new(),
        }
    }

    /// Starts a recipe producing the declared type `D`
    ///
    /// Without an explicit [`RecipeBuilder::id`] the recipe is identified by the name of `D`.
    pub fn recipe<D: ?Sized + Injectable>(&mut self) -> RecipeBuilder<'_, D> {
        RecipeBuilder {
            definitions: self,
            id: None,
            inputs: Vec::new(),
            _declared: PhantomData,
        }
    }

    pub fn module(&self) -> TypeInfo {
        self.module
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn into_recipes(self) -> Vec<Recipe> {
        self.recipes
    }
}

pub struct RecipeBuilder<'a, D: ?Sized> {
    definitions: &'a mut Definitions,
    id: Option<String>,
    inputs: Vec<TypeInfo>,
    _declared: PhantomData<fn() -> Arc<D>>,
}
impl<D: ?Sized + Injectable> RecipeBuilder<'_, D> {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Appends a required input type
    pub fn input<T: ?Sized + 'static>(mut self) -> Self {
        self.inputs.push(TypeInfo::of::<T>());
        self
    }

    /// Finishes the recipe with its producer
    pub fn produce<F>(self, producer: F)
    where
        F: Fn(&mut Inputs<'_>) -> Result<Product<D>, DynError> + Send + Sync + 'static,
    {
        let declared = TypeInfo::of::<D>();
        let recipe = Recipe {
            id: self.id.unwrap_or_else(|| declared.name().to_string()),
            inputs: self.inputs,
            declared,
            module: self.definitions.module,
            producer: Box::new(move |inputs| producer(inputs).map(Product::into_parts)),
        };

        self.definitions.recipes.push(recipe);
    }

    /// Finishes the recipe with a producer whose value is its own declared type
    pub fn produce_value<F>(self, producer: F)
    where
        D: Sized,
        F: Fn(&mut Inputs<'_>) -> Result<D, DynError> + Send + Sync + 'static,
    {
        self.produce(move |inputs| producer(inputs).map(|value| Product::of(value).as_self()))
    }
}

/// Resolved inputs handed to a producer
pub struct Inputs<'a> {
    resolved: &'a [Arc<Instance>],
    position: usize,
    container: &'a ContainerHandle,
}
impl<'a> Inputs<'a> {
    pub(crate) fn new(resolved: &'a [Arc<Instance>], container: &'a ContainerHandle) -> Self {
        Inputs {
            resolved,
            position: 0,
            container,
        }
    }

    /// Takes the next input in declaration order
    pub fn take<T: ?Sized + 'static>(&mut self) -> Result<Arc<T>, LookupError> {
        let value = self.get(self.position)?;
        self.position += 1;
        Ok(value)
    }

    /// Input at `index`, in declaration order
    pub fn get<T: ?Sized + 'static>(&self, index: usize) -> Result<Arc<T>, LookupError> {
        self.resolved
            .get(index)
            .ok_or_else(|| LookupError::NotFound(format!("input #{index}")))?
            .materialize()
    }

    /// Id of the instance resolved for the input at `index`
    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.resolved.get(index).map(|instance| instance.id())
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Handle to the container building this recipe
    ///
    /// Only use it after construction - e.g. from inside an [`ObjectFactory`].
    pub fn container(&self) -> ContainerHandle {
        self.container.clone()
    }
}

/// Type erased output of a producer
pub(crate) struct ProductParts {
    pub concrete: TypeInfo,
    /// Holds an `Arc<Concrete>`
    pub value: Box<dyn Any + Send + Sync>,
    /// Holds an `Arc<Declared>`
    pub declared_view: Option<Box<dyn Any + Send + Sync>>,
    pub factory: Option<Arc<dyn DynObjectFactory>>,
    pub release: Option<Arc<dyn Release>>,
}

/// Output of a producer for the declared type `D`
///
/// # Example
/// ```rust
/// use kiln_di::Product;
///
/// trait Greeter: Send + Sync {}
/// struct English;
/// impl Greeter for English {}
///
/// let product = Product::of(English).as_declared::<dyn Greeter>(|english| english);
/// ```
pub struct Product<D: ?Sized> {
    parts: ProductParts,
    _declared: PhantomData<fn() -> Arc<D>>,
}
impl Product<()> {
    /// Starts a product from a concrete value
    pub fn of<C: Injectable>(value: C) -> ProductBuilder<C> {
        Product::shared(Arc::new(value))
    }

    /// Starts a product from an already shared value
    pub fn shared<C: Injectable>(value: Arc<C>) -> ProductBuilder<C> {
        ProductBuilder {
            value,
            release: None,
        }
    }
}
impl<D: ?Sized> Product<D> {
    fn new(parts: ProductParts) -> Self {
        Product {
            parts,
            _declared: PhantomData,
        }
    }

    /// The concrete type behind this product
    pub fn concrete(&self) -> TypeInfo {
        self.parts.concrete
    }

    pub(crate) fn into_parts(self) -> ProductParts {
        self.parts
    }
}

pub struct ProductBuilder<C> {
    value: Arc<C>,
    release: Option<Arc<dyn Release>>,
}
impl<C: Injectable> ProductBuilder<C> {
    /// Releases the value when it is removed from the container
    pub fn releasable(mut self) -> Self
    where
        C: Release,
    {
        self.release = Some(self.value.clone());
        self
    }

    /// Exposes the value under the declared type `D`, usually a trait object
    pub fn as_declared<D: ?Sized + Injectable>(
        self,
        upcast: impl FnOnce(Arc<C>) -> Arc<D>,
    ) -> Product<D> {
        let declared = upcast(self.value.clone());
        Product::new(ProductParts {
            concrete: TypeInfo::of::<C>(),
            value: Box::new(self.value),
            declared_view: Some(Box::new(declared)),
            factory: None,
            release: self.release,
        })
    }

    /// Declares the value as its own type
    pub fn as_self(self) -> Product<C> {
        Product::new(ProductParts {
            concrete: TypeInfo::of::<C>(),
            value: Box::new(self.value),
            declared_view: None,
            factory: None,
            release: self.release,
        })
    }

    /// Stores the value as an object factory, declared as the type it produces
    pub fn as_factory(self) -> Product<C::Product>
    where
        C: ObjectFactory,
    {
        let factory: Arc<dyn DynObjectFactory> = self.value.clone();
        Product::new(ProductParts {
            concrete: TypeInfo::of::<C>(),
            value: Box::new(self.value),
            declared_view: None,
            factory: Some(factory),
            release: self.release,
        })
    }
}
