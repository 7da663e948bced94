//! Error types for Tarkib container operations.
//!
//! Errors carry enough context to be actionable: what was requested,
//! which type required it, and which registered names look similar.

use std::fmt;

use tarkib_support::rendering::render_chain;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The requested (or configured) type has no registered factory.
    #[error("{}", .0)]
    UnresolvableType(UnresolvableTypeError),

    /// The method requested via `invoke` is not registered for the
    /// object's runtime type.
    #[error("{}", .0)]
    MissingMethod(MissingMethodError),

    /// The argument configuration forms a cycle; resolution fails fast
    /// instead of exhausting the call stack.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// A factory or method asked for an argument that was neither
    /// supplied by the caller, configured, nor resolvable from a hint.
    #[error("missing required argument `{parameter}`")]
    MissingArgument { parameter: String },

    /// A factory or method asked for an argument with a type the
    /// supplied value does not have. Scalar values are never validated
    /// upfront; mismatches surface here, at invocation time.
    #[error("argument `{parameter}` has the wrong type (expected {expected})")]
    ArgumentType {
        parameter: String,
        expected: &'static str,
    },

    /// A resolved instance could not be downcast to the requested Rust
    /// type (`create_as`/`get_as`).
    #[error("instance of `{type_name}` is not a {expected}")]
    TypeMismatch {
        type_name: String,
        expected: &'static str,
    },
}

/// Error when a type name has no registered factory.
#[derive(Debug)]
pub struct UnresolvableTypeError {
    /// The concrete type name that could not be resolved.
    pub requested: String,
    /// The type whose arguments required it (if resolution was nested).
    pub required_by: Option<String>,
    /// Registered names that look similar ("did you mean?").
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnresolvableTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no factory registered for type `{}`", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register a factory for `{}` on the builder",
            self.requested
        )
    }
}

/// Error when `invoke` names a method the receiver's type doesn't have.
#[derive(Debug)]
pub struct MissingMethodError {
    /// Registered name of the receiver's runtime type, or
    /// `<unregistered>` if the object was not built by the container.
    pub type_name: String,
    /// The requested method name.
    pub method: String,
}

impl fmt::Display for MissingMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no method `{}` registered for type `{}`",
            self.method, self.type_name
        )?;
        write!(
            f,
            "\n  Hint: register the method on the builder before calling invoke"
        )
    }
}

/// Error when argument resolution revisits a type already being built.
///
/// The chain shows the full path, so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// The chain of type names that forms the cycle.
    /// Example: `["A", "B", "C", "A"]`.
    pub chain: Vec<String>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cyclic dependency detected:\n  ")?;
        write!(f, "{}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: break the cycle in the argument configuration of one of these types"
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
