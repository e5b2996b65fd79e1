use std::{any::Any, sync::Arc};

use crate::types::{DynError, Injectable, TypeInfo};

/// An instance producing a fresh value on every retrieval
///
/// The factory itself is stored as a singleton. Retrieving its id, or any type it is
/// registered under other than the factory's own type, invokes [`ObjectFactory::create`].
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use kiln_di::{DynError, ObjectFactory};
///
/// struct Ticket(u64);
/// struct TicketFactory;
///
/// impl ObjectFactory for TicketFactory {
///     type Product = Ticket;
///
///     fn create(&self) -> Result<Arc<Ticket>, DynError> {
///         Ok(Arc::new(Ticket(7)))
///     }
/// }
/// ```
pub trait ObjectFactory: Injectable {
    type Product: ?Sized + Injectable;

    /// Returns the typeinfo about the factory's product
    fn product() -> TypeInfo {
        TypeInfo::of::<Self::Product>()
    }

    /// Produces a new value
    fn create(&self) -> Result<Arc<Self::Product>, DynError>;
}

/// Wrapper Trait for object factories, producing type erased values
pub(crate) trait DynObjectFactory: Send + Sync {
    fn product(&self) -> TypeInfo;

    /// Produces a new value - the box holds an `Arc<Product>`
    fn create(&self) -> Result<Box<dyn Any + Send + Sync>, DynError>;
}
// Impl DynObjectFactory for any ObjectFactory
impl<SpecificFactory: ObjectFactory> DynObjectFactory for SpecificFactory {
    fn product(&self) -> TypeInfo {
        <SpecificFactory as ObjectFactory>::product()
    }

    fn create(&self) -> Result<Box<dyn Any + Send + Sync>, DynError> {
        // Forward the call to the specific implementation
        let product = ObjectFactory::create(self)?;
        Ok(Box::new(product))
    }
}

/// Invoked exactly once when an instance is removed from the container
///
/// Removal happens on `dispose`, on `reconfigure` and when the last container handle is dropped.
pub trait Release: Send + Sync {
    fn release(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u8;
    }
    struct Square;
    impl Shape for Square {
        fn sides(&self) -> u8 {
            4
        }
    }

    struct ShapeFactory;
    impl ObjectFactory for ShapeFactory {
        type Product = dyn Shape;

        fn create(&self) -> Result<Arc<dyn Shape>, DynError> {
            Ok(Arc::new(Square))
        }
    }

    #[test]
    fn dyn_factory_erases_product() {
        let factory: Arc<dyn DynObjectFactory> = Arc::new(ShapeFactory);
        assert_eq!(factory.product(), TypeInfo::of::<dyn Shape>());

        let produced = factory.create().unwrap();
        let shape = produced.downcast_ref::<Arc<dyn Shape>>().unwrap();
        assert_eq!(shape.sides(), 4);
    }
}
