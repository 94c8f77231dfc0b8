//! Engine error taxonomy
//!
//! Three kinds of failure, kept strictly apart:
//! - [`WeaveError`] — fatal synthesis/registration errors. Weaving never
//!   returns a partially built class.
//! - [`ContractViolation`] — programming errors detected at a runtime entry
//!   point or inside a pipeline (a null result where the declared type
//!   forbids one, a write to a read-only property). Loud, never coerced to
//!   a default value.
//! - User exceptions ([`Exception`]) — raised by hooks or member bodies and
//!   propagated verbatim to the original caller.

use weft_sdk::Exception;

/// Fatal class synthesis errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeaveError {
    /// Class declares no constructor
    #[error("class '{0}' declares no constructor")]
    NoConstructor(String),

    /// Two members of the same kind share a name
    #[error("duplicate {kind} '{member}' on class '{class}'")]
    DuplicateMember {
        /// Member kind ("field", "method" or "property")
        kind: &'static str,
        /// Owning class name
        class: String,
        /// Colliding member name
        member: String,
    },

    /// An interception declaration names a raw target that does not exist
    #[error("unknown raw target '{target}' for method '{method}' on class '{class}'")]
    UnknownRawTarget {
        /// Owning class name
        class: String,
        /// Method carrying the declaration
        method: String,
        /// Missing raw target name
        target: String,
    },

    /// A property names a backing field that does not exist
    #[error("unknown backing field '{field}' for property '{property}' on class '{class}'")]
    UnknownBackingField {
        /// Owning class name
        class: String,
        /// Property carrying the reference
        property: String,
        /// Missing field name
        field: String,
    },

    /// A property declares neither a backing field nor any accessor
    #[error("property '{property}' on class '{class}' has no backing field and no accessors")]
    InaccessibleProperty {
        /// Owning class name
        class: String,
        /// Offending property name
        property: String,
    },
}

/// Weaving result
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Contract violations: programming errors surfaced loudly at the point of
/// violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// A member produced a null result its declared type does not accept
    #[error("member '{member}' produced a null result but its declared type '{declared}' does not accept one")]
    NullResult {
        /// Qualified member name
        member: String,
        /// Declared type name
        declared: String,
    },

    /// Write attempted through a read-only property
    #[error("property '{0}' is read-only")]
    ReadOnly(String),

    /// Read attempted through a write-only property
    #[error("property '{0}' is write-only")]
    WriteOnly(String),

    /// Dispatch to a member the class does not declare
    #[error("unknown {kind} '{member}' on class '{class}'")]
    UnknownMember {
        /// Member kind ("method" or "property")
        kind: &'static str,
        /// Class name
        class: String,
        /// Missing member name
        member: String,
    },

    /// Construction with an out-of-range constructor index
    #[error("constructor index {index} out of range for class '{class}'")]
    UnknownConstructor {
        /// Class name
        class: String,
        /// Requested index
        index: usize,
    },

    /// Call with the wrong number of arguments
    #[error("'{member}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        /// Qualified member name
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },
}

/// Errors surfacing from a runtime dispatch or pipeline.
///
/// Callers of intercepted members see either a user exception (their own or
/// a hook's) or a loud contract violation — never an engine-internal error
/// shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// A user exception, propagated verbatim
    #[error(transparent)]
    Raised(#[from] Exception),

    /// A contract violation
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

/// Dispatch/pipeline result
pub type CallResult<T> = Result<T, CallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_from_exception() {
        let err: CallError = Exception::new("denied").into();
        assert_eq!(err.to_string(), "denied");
        assert!(matches!(err, CallError::Raised(_)));
    }

    #[test]
    fn test_call_error_from_violation() {
        let err: CallError = ContractViolation::ReadOnly("Ticket::id".to_string()).into();
        assert!(err.to_string().contains("read-only"));
        assert!(matches!(err, CallError::Contract(_)));
    }

    #[test]
    fn test_weave_error_display() {
        let err = WeaveError::UnknownRawTarget {
            class: "Counter".to_string(),
            method: "add_tick".to_string(),
            target: "raw_add".to_string(),
        };
        assert!(err.to_string().contains("raw_add"));
    }
}
