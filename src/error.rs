//! Runtime error conditions
//!
//! The object runtime has no I/O and no transient failure modes. Everything
//! here is either a language-level type error surfaced to the interpreter
//! (`TypeConversion`, `NotCallable`, `NotConstructible`) or a fatal
//! configuration/wiring defect (`AbstractMethod`, `MissingBuiltin`,
//! `PrototypeChainTooDeep`).
//!
//! Writes to read-only properties, rejected prototype-cycle assignments and
//! deletions of non-deletable properties are deliberately *not* errors; they
//! resolve to documented no-op outcomes.

use thiserror::Error;

/// Error raised by object-protocol and coercion operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `to_object` was given `undefined` or `null`.
    #[error("cannot convert {0} to an object")]
    TypeConversion(&'static str),

    /// A native function without a call entry point was invoked.
    #[error("object is not callable")]
    NotCallable,

    /// A native function without a construct entry point was used with `new`.
    #[error("object is not a constructor")]
    NotConstructible,

    /// `call`/`construct` reached a plain object that carries no function
    /// data. This is a wiring defect in the host, not a script error.
    #[error("abstract {0} invoked on a non-function object")]
    AbstractMethod(&'static str),

    /// A required builtin class is absent from the context registry.
    #[error("required builtin class `{0}` is not registered")]
    MissingBuiltin(String),

    /// Prototype-chain traversal exceeded the configured link limit.
    #[error("prototype chain exceeded {limit} links")]
    PrototypeChainTooDeep {
        /// The configured traversal limit that was exceeded.
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            RuntimeError::TypeConversion("undefined").to_string(),
            "cannot convert undefined to an object"
        );
        assert_eq!(
            RuntimeError::MissingBuiltin("Array".to_string()).to_string(),
            "required builtin class `Array` is not registered"
        );
        assert_eq!(
            RuntimeError::PrototypeChainTooDeep { limit: 256 }.to_string(),
            "prototype chain exceeded 256 links"
        );
    }
}
