//! Validation errors for range requests.
//!
//! Every variant is a client-input error: it is reported before any task is
//! scheduled, it is never retried and it never affects other requests. Once a
//! range has been validated, evaluation has no reportable failure modes.
//!
//! The `Display` text of each variant is the message returned to HTTP
//! clients, so it is part of the public contract.

/// A result type for range validation and evaluation.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All reasons a range request can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// One or both bounds failed base-10 integer parsing.
    #[error("Invalid parameters: input must be an integer")]
    NotAnInteger,

    /// The lower bound is greater than the upper bound.
    #[error("Invalid parameters: 'from' cannot be greater than 'to'")]
    FromGreaterThanTo,

    /// The inclusive span exceeds [`crate::MAX_RANGE_SIZE`] elements.
    #[error("Invalid parameters: the maximum range from 'from' to 'to' is {}", crate::MAX_RANGE_SIZE)]
    RangeTooLarge,
}

impl From<core::num::ParseIntError> for Error {
    fn from(_: core::num::ParseIntError) -> Self {
        Self::NotAnInteger
    }
}
