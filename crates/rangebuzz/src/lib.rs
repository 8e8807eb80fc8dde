//! # `rangebuzz`: Concurrent FizzBuzz over inclusive ranges
//!
//! `rangebuzz` classifies every integer in a small, validated, inclusive range
//! as `Fizz`, `Buzz`, `FizzBuzz` or the number itself, and assembles the
//! results into a single space-delimited string.
//!
//! Classification itself is trivial. The interesting part is the
//! [`RangeEvaluator`], which fans each element out to its own Tokio task while:
//!
//! - validating the raw range bounds before any work is scheduled,
//! - bounding concurrent work with a shared permit pool,
//! - honoring a per-request [`Deadline`] that is also a child of the caller's
//!   cancellation token,
//! - preserving output order regardless of task completion order.
//!
//! ## Example
//!
//! ```rust
//! use rangebuzz::RangeEvaluator;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rangebuzz::Result<()> {
//! let evaluator = RangeEvaluator::new();
//! let body = evaluator
//!     .evaluate("1", "5", &CancellationToken::new())
//!     .await?;
//! assert_eq!(body, "1 2 Fizz 4 Buzz");
//! # Ok(())
//! # }
//! ```
//!
//! Elements whose task observes an expired deadline are left empty, so a slow
//! tail degrades the response (`"1 2 Fizz  "`) instead of failing it.

mod classify;
mod deadline;
mod error;
mod evaluator;
mod range;

pub use crate::classify::*;
pub use crate::deadline::*;
pub use crate::error::*;
pub use crate::evaluator::*;
pub use crate::range::*;
