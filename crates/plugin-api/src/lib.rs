use axum::Router;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors raised by plugins during their lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("initialization error: {0}")]
    InitError(String),
    #[error("{0}")]
    Other(String),
}

/// Contract implemented by every feature mounted into the runtime.
pub trait Plugin: Sync + Send {
    /// Define a unique identifier
    fn name(&self) -> &'static str;

    /// Provide initialization actions as needed
    fn mount(&mut self) -> Result<(), PluginError>;

    /// Revert initialization actions as needed
    fn unmount(&self) -> Result<(), PluginError>;

    /// Export managed endpoints
    fn routes(&self) -> Result<Router, PluginError>;
}

impl Eq for dyn Plugin {}

impl PartialEq for dyn Plugin {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Hash for dyn Plugin {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.name().hash(state)
    }
}
