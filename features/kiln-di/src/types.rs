use std::any::TypeId;

/// Error type returned by producers and object factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Instances are shared across threads once the container is built
/// So anything injectable needs to be Send + Sync + 'static
///
/// Unsized types are allowed so trait objects can serve as declared types.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// The canonical name, used as the default recipe id
    pub fn name(&self) -> &'static str {
        self.type_name
    }
}
