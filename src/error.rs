//! Error types for the Microtask promise core

use std::fmt;
use thiserror::Error;

/// Main error type for Microtask
///
/// Handler failures are *not* represented here: a reaction handler that
/// throws is absorbed into the rejection of its derived promise (see
/// [`crate::value::Completion`]). Only settlement misuse and host-level
/// invocation breakage surface as [`Error`] values.
#[derive(Error, Debug)]
pub enum Error {
    /// A promise was handed to the resolution procedure a second time.
    /// Non-fatal: the first settlement stands and the call is a no-op.
    #[error("promise has already been settled")]
    AlreadySettled,

    /// A promise operation received a value that is not a promise.
    #[error("TypeError: expected a promise, got {type_of}")]
    NotAPromise {
        /// `typeof` string of the offending value
        type_of: String,
    },

    /// `invoke` was handed a value with no call surface. This is host
    /// invocation breakage and the only error class that aborts a drain.
    #[error("TypeError: {type_of} is not callable")]
    NotCallable {
        /// `typeof` string of the offending value
        type_of: String,
    },

    /// The host call mechanism itself failed. Reserved for embedders
    /// whose callable plumbing can break independently of handler code.
    #[error("host invocation failed: {message}")]
    HostInvocation { message: String },
}

impl Error {
    /// Create a host invocation error
    pub fn host_invocation(message: impl Into<String>) -> Self {
        Error::HostInvocation {
            message: message.into(),
        }
    }
}

/// Result type alias for Microtask
pub type Result<T> = std::result::Result<T, Error>;

/// Script-level error kinds
///
/// These tag the error values built by the error factory
/// ([`crate::value::Value::new_error`]) and carry no behavior of their
/// own: the resolution procedure treats error values verbatim, and only
/// downstream handlers inspect the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic Error - the common, untyped error class
    Common,
    /// EvalError - error in eval()
    Eval,
    /// RangeError - value out of range
    Range,
    /// ReferenceError - undefined variable
    Reference,
    /// SyntaxError - invalid syntax
    Syntax,
    /// TypeError - wrong type for operation
    Type,
    /// URIError - malformed URI
    Uri,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Common => write!(f, "Error"),
            ErrorKind::Eval => write!(f, "EvalError"),
            ErrorKind::Range => write!(f, "RangeError"),
            ErrorKind::Reference => write!(f, "ReferenceError"),
            ErrorKind::Syntax => write!(f, "SyntaxError"),
            ErrorKind::Type => write!(f, "TypeError"),
            ErrorKind::Uri => write!(f, "URIError"),
        }
    }
}
