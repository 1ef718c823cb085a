//! Error types for the component model.

/// Errors that can occur during component tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The component ID is invalid or the component has been destroyed.
    #[error("Invalid or destroyed component ID")]
    InvalidComponentId,

    /// An argument was malformed: a bad name, a foreign component, a path
    /// leading through a leaf, or an unknown component.
    #[error("{0}")]
    InvalidArgument(String),

    /// The tree is not in a state that allows the operation: duplicate names,
    /// cyclic parentage, a vetoed attach, or a factory that produced nothing.
    #[error("{0}")]
    InvalidState(String),

    /// A lookup found no ancestor matching the requested key.
    #[error("Component '{component}' is not attached to '{ancestor}'")]
    NotAttached {
        /// The component's name, or its type name when it has none.
        component: String,
        /// Description of the requested ancestor key.
        ancestor: String,
    },

    /// The operation is not supported for components.
    #[error("{0}")]
    Unsupported(String),
}

impl TreeError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a not-attached error.
    pub fn not_attached(component: impl Into<String>, ancestor: impl Into<String>) -> Self {
        Self::NotAttached {
            component: component.into(),
            ancestor: ancestor.into(),
        }
    }

    /// Create an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

/// Result type for component tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;
