//! All errors that can occur while invoking a contract, including but not limited to
//! the following: connection, credential, ABI resolution and execution errors.

mod execution;
mod impls;

use std::borrow::Cow;

use crate::result::ExecutionFailure;

/// Error type that the invoker will make use of for all the errors
/// returned from this library
#[derive(Debug)]
pub struct Error {
    repr: ErrorRepr,
}

#[derive(Debug, thiserror::Error)]
enum ErrorRepr {
    #[error("{0}")]
    Simple(ErrorKind),
    #[error("{kind}: {message}")]
    Message {
        kind: ErrorKind,
        message: Cow<'static, str>,
    },
    #[error("{kind}: {error}")]
    Custom {
        kind: ErrorKind,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{kind}: {message}: {error}")]
    Full {
        kind: ErrorKind,
        message: Cow<'static, str>,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{kind}: {error}")]
    Detailed {
        kind: ErrorKind,
        // NOTE: Box to keep the size of Error small on the happy path.
        details: Box<ExecutionFailure>,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The category of an [`Error`]. Every failure of an invocation maps to exactly
/// one of these, which is what callers should match on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The endpoint was unreachable, invalid, or answered the handshake with garbage.
    #[error("connection error")]
    Connection,
    /// The private key was malformed or could not be used to sign.
    #[error("credential error")]
    Credential,
    /// The ABI descriptor has no method with the requested name.
    #[error("method not found")]
    MethodNotFound,
    /// The supplied arguments or call parameters do not fit the ABI signature.
    #[error("argument mismatch")]
    ArgumentMismatch,
    /// The node rejected the call or the contract reverted.
    #[error("execution error")]
    Execution,
    /// A required setting was missing or contradictory.
    #[error("configuration error")]
    Configuration,
    /// Data could not be converted into or out of its wire/ABI representation.
    #[error("data conversion error")]
    DataConversion,
    #[error("io error")]
    Io,
    #[error("other error")]
    Other,
}
