//! Errors for host-page controls.

use grapher_core::{GraphError, StartupError};
use thiserror::Error;

/// A host-page control call failed.
#[derive(Debug, Error)]
pub enum ControlError {
    /// No session is bound to this canvas.
    #[error("no grapher running on canvas '{0}'")]
    NotRunning(String),
    /// The session rejected the request.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The browser runtime could not be set up.
    #[error(transparent)]
    Startup(#[from] StartupError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ControlError::NotRunning("plot".to_string()).to_string(),
            "no grapher running on canvas 'plot'"
        );
        let err: ControlError = GraphError::FunctionLimit(18).into();
        assert_eq!(err.to_string(), "function limit of 18 reached");
    }
}
