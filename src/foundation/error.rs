/// Convenience result type used across the pipeline.
pub type PlasmaResult<T> = Result<T, PlasmaError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum PlasmaError {
    /// Invalid configuration, arguments or task parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Worker process or pipe creation failed while building the pool. Fatal at startup.
    #[error("spawn error: {0}")]
    Spawn(String),

    /// A worker stream could not be written or read to completion.
    #[error("connection error: {0}")]
    Connection(String),

    /// A worker result did not satisfy the wire contract.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlasmaError {
    /// Build a [`PlasmaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlasmaError::Spawn`] value.
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Build a [`PlasmaError::Connection`] value.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Build a [`PlasmaError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Return `true` for errors after which the affected worker stream must not be trusted.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
