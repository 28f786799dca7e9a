//! Error handling types

use crate::value_objects::RuntimeState;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Hearth runtime
#[derive(Error, Debug)]
pub enum Error {
    /// A binding already exists for the contract and can no longer be replaced
    #[error("Duplicate binding: {contract} is already bound and can no longer be replaced")]
    DuplicateBinding {
        /// The contract that was registered twice
        contract: String,
    },

    /// No binding exists for the requested contract
    #[error("Binding not found: {contract}")]
    BindingNotFound {
        /// The contract that was requested
        contract: String,
    },

    /// The dependency graph contains a cycle
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency {
        /// Contracts forming the cycle, first and last entries are the same contract
        chain: Vec<String>,
    },

    /// Constructing a component failed
    #[error("Failed to construct {contract}: {source}")]
    ComponentConstruction {
        /// The contract whose construction failed
        contract: String,
        /// The underlying failure, shared by every caller that observes it
        #[source]
        source: Arc<Error>,
    },

    /// The runtime was asked to move between states that are not adjacent
    #[error("Invalid runtime state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// State the runtime was in
        from: RuntimeState,
        /// State that was requested
        to: RuntimeState,
    },

    /// No pool entry is free and the pool cannot grow
    #[error("Pool exhausted: no free entry in '{pool}' ({in_use} in use)")]
    PoolExhausted {
        /// Pool name
        pool: String,
        /// Entries currently leased out
        in_use: usize,
    },

    /// An object was used while not in a state that allows the operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the violated state requirement
        message: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failure raised by a hosted component
    #[error("Component error: {message}")]
    Component {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal runtime error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Runtime error creation methods
impl Error {
    /// Create a duplicate binding error
    pub fn duplicate_binding(contract: impl fmt::Display) -> Self {
        Self::DuplicateBinding {
            contract: contract.to_string(),
        }
    }

    /// Create a binding not found error
    pub fn binding_not_found(contract: impl fmt::Display) -> Self {
        Self::BindingNotFound {
            contract: contract.to_string(),
        }
    }

    /// Create a circular dependency error from the contracts forming the cycle
    pub fn circular_dependency<I, S>(chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        Self::CircularDependency {
            chain: chain.into_iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Error reported to a caller that observes a failed construction
    ///
    /// A cached cycle is replayed as `CircularDependency` so every observer sees the
    /// structural problem rather than a wrapper around it.
    pub fn construction_failure(contract: impl fmt::Display, cause: &Arc<Error>) -> Self {
        match cause.as_ref() {
            Self::CircularDependency { chain } => Self::CircularDependency {
                chain: chain.clone(),
            },
            _ => Self::ComponentConstruction {
                contract: contract.to_string(),
                source: Arc::clone(cause),
            },
        }
    }

    /// Create an invalid state transition error
    pub fn invalid_transition(from: RuntimeState, to: RuntimeState) -> Self {
        Self::InvalidStateTransition { from, to }
    }

    /// Create a pool exhaustion error
    pub fn pool_exhausted<S: Into<String>>(pool: S, in_use: usize) -> Self {
        Self::PoolExhausted {
            pool: pool.into(),
            in_use,
        }
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

// Basic error creation methods
impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Component error creation methods
impl Error {
    /// Create a component error
    pub fn component<S: Into<String>>(message: S) -> Self {
        Self::Component {
            message: message.into(),
            source: None,
        }
    }

    /// Create a component error with source
    pub fn component_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Component {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Classification
impl Error {
    /// True when the error is a missing binding for the requested contract
    pub fn is_binding_not_found(&self) -> bool {
        matches!(self, Self::BindingNotFound { .. })
    }

    /// True when a dependency cycle caused the error, at any wrapping depth
    pub fn is_circular_dependency(&self) -> bool {
        match self {
            Self::CircularDependency { .. } => true,
            Self::ComponentConstruction { source, .. } => source.is_circular_dependency(),
            _ => false,
        }
    }

    /// True when the error reports an exhausted pool
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }

    /// True when an invalid-state violation caused the error, at any wrapping depth
    pub fn is_invalid_state(&self) -> bool {
        match self {
            Self::InvalidState { .. } => true,
            Self::ComponentConstruction { source, .. } => source.is_invalid_state(),
            _ => false,
        }
    }

    /// The innermost error behind any `ComponentConstruction` wrapping
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::ComponentConstruction { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Configuration {
            message: format!("JSON value error: {source}"),
            source: Some(Box::new(source)),
        }
    }
}
