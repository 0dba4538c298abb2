use gf_core::error::CoreError;

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while configuring or ticking a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A store or level operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A required singleton such as the player is missing.
    #[error("no {0} in the level")]
    MissingSingleton(&'static str),

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A system failed mid-tick.
    #[error("system error: {0}")]
    SystemError(String),
}
