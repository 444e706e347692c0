//! Lazy, single-pass, LINQ-style transformations over three kinds of sources:
//!
//! 1. pull sequences - anything implementing `Iterator`
//! 2. contiguous buffers - slices, and index-computed buffers such as a [`Transducer`]
//! 3. text segments - immutable `&str` views with O(1) sub-segment slicing
//!
//! Every operation is an explicit state machine that pulls exactly as much of its source as it
//! needs to produce the next element: filtering, projection, grouping of contiguous runs,
//! splitting on a value, a predicate or a sub-sequence, index search, and a key-ordered view over
//! a buffer.
//!
//! # Example
//!
//! ```rust
//! use lazy_linq::{ContiguousExt, PullExt, TextSegment};
//!
//! let runs: Vec<_> = vec![1, 1, 2, 2, 1]
//!     .into_iter()
//!     .group_runs(|n| *n)
//!     .map(|group| (group.key, group.members))
//!     .collect();
//! assert_eq!(runs, vec![(1, vec![1, 1]), (2, vec![2, 2]), (1, vec![1])]);
//!
//! let fields: Vec<_> = TextSegment::new("a,b,,c")
//!     .split_on(',')
//!     .map(|s| s.as_str())
//!     .collect();
//! assert_eq!(fields, vec!["a", "b", "", "c"]);
//! ```

extern crate scroll;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate once_cell;
extern crate parking_lot;

/// The kind of errors raised while constructing or driving lazy sequences
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[fail(display = "Invalid argument `{}`: {}", name, reason)]
    InvalidArgument { name: &'static str, reason: &'static str },
    #[fail(display = "Operation requires a non-empty source")]
    EmptySource,
    #[fail(display = "Unsupported operation: {}", _0)]
    Unsupported(&'static str),
    #[fail(display = "Arithmetic overflow while computing {}", what)]
    Overflow { what: &'static str },
    #[fail(display = "Too many elements (size = {} * {}) requested from src of size: {}", nelements, sizeof_element, src_size)]
    ElementOverflow { nelements: usize, sizeof_element: usize, src_size: usize },
    #[fail(display = "Error during building: {}", _0)]
    BuilderError(String),
}

mod builder;
mod contract;
mod ext;
mod filter;
mod group;
mod index;
mod lazy;
mod matcher;
mod order;
mod pool;
mod source;
mod split;
mod transducer;

pub use builder::*;
pub use contract::*;
pub use ext::*;
pub use filter::*;
pub use group::*;
pub use index::*;
pub use lazy::*;
pub use matcher::*;
pub use order::*;
pub use pool::*;
pub use source::*;
pub use split::*;
pub use transducer::*;

pub use failure::Error;
pub use scroll::Endian;
