use kiln_di::TypeInfo;

/// Errors when trying to register or acquire a config
#[derive(thiserror::Error, Debug, Clone)]
pub enum ConfigError {
    /// The config type is already registered
    #[error("The config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),

    /// The required config is not known
    #[error("The required config type '{0}' is not known")]
    Missing(TypeInfo),
}
