pub type MinibemResult<T> = std::result::Result<T, MinibemError>;

/// Errors raised while registering templates.
///
/// Every variant is produced synchronously by a builder call. None of them is
/// recoverable inside the compiler: the tree that raised one should be thrown
/// away.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MinibemError {
    /// `match` was called without a single predicate.
    MissingPredicate,
    /// A `match` argument was neither a predicate nor a callable.
    InvalidPredicate {
        /// Rendering of the rejected argument, e.g. `5`.
        argument: String,
    },
    /// A zero-argument mode setter such as `tag` received arguments.
    UnexpectedArguments {
        method: String,
        arguments: String,
    },
    /// The name given to dynamic dispatch is not a builder method.
    UnknownMethod {
        name: String,
    },
    /// A builder method that takes arguments got the wrong shape.
    InvalidArgument {
        method: String,
        message: String,
    },
    /// A body was supplied to a chain that already received one.
    ClosedScope,
}

impl std::fmt::Display for MinibemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPredicate => {
                write!(f, ".match() must have argument")
            }
            Self::InvalidPredicate { argument } => {
                write!(f, "Wrong .match() argument: {}", argument)
            }
            Self::UnexpectedArguments { method, arguments } => {
                write!(
                    f,
                    "Predicate .{}() should not have arguments but {} passed",
                    method, arguments
                )
            }
            Self::UnknownMethod { name } => {
                write!(f, "Unknown builder method: {}", name)
            }
            Self::InvalidArgument { method, message } => {
                write!(f, "Invalid argument to .{}(): {}", method, message)
            }
            Self::ClosedScope => {
                write!(f, "Scope already received its body")
            }
        }
    }
}

impl std::error::Error for MinibemError {}

impl MinibemError {
    pub(crate) fn invalid_argument(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            method: method.into(),
            message: message.into(),
        }
    }
}
