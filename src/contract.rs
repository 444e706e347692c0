use failure::Error;

use crate::SequenceError;

/// Where an engine iterator is in its single forward traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing has been pulled from the source yet
    NotStarted,
    /// At least one element has been pulled, and the source may have more
    Running,
    /// The source ran dry; every further pull returns `None`
    Exhausted,
    /// `dispose` was called; the source and any pending buffers have been released
    Disposed,
}

impl State {
    /// Whether no further elements will ever be produced.
    #[inline]
    pub fn is_finished(self) -> bool {
        match self {
            State::Exhausted | State::Disposed => true,
            State::NotStarted | State::Running => false,
        }
    }
}

/// The contract every lazy operation in this crate implements on top of `Iterator`.
///
/// Engine iterators are strictly single pass:
///
/// 1. once `next` returns `None` it keeps returning `None` (they are all `FusedIterator`s)
/// 2. `dispose` releases the nested source early, and may be called any number of times
/// 3. `reset` always fails; a fresh traversal needs a fresh iterator, e.g. from a [`Lazy`](crate::Lazy)
pub trait Enumerator: Iterator {
    /// The current position of this iterator in its lifecycle
    fn state(&self) -> State;

    /// Drop the underlying source and any buffered elements; subsequent pulls yield `None`.
    fn dispose(&mut self);

    /// Rewinding is never supported.
    fn reset(&mut self) -> Result<(), Error> {
        Err(SequenceError::Unsupported("reset").into())
    }

    /// Expose this iterator through the explicit `move_next` / `current` protocol
    fn into_cursor(self) -> Cursor<Self>
    where
        Self: Sized,
    {
        Cursor::new(self)
    }
}

/// A `move_next` / `current` view over an [`Enumerator`].
///
/// `current` is only `Some` between a `move_next` that returned `true` and the next call to
/// `move_next` or `dispose`.
///
/// # Example
///
/// ```rust
/// use lazy_linq::{Enumerator, PullExt};
///
/// let mut cursor = vec![1, 2, 3, 4].into_iter().where_by(|n| n % 2 == 0).into_cursor();
/// let mut seen = Vec::new();
/// while cursor.move_next() {
///     seen.push(*cursor.current().unwrap());
/// }
/// assert_eq!(seen, vec![2, 4]);
/// assert!(cursor.reset().is_err());
/// ```
#[derive(Debug)]
pub struct Cursor<E: Enumerator> {
    inner: Option<E>,
    current: Option<E::Item>,
}

impl<E: Enumerator> Cursor<E> {
    pub fn new(inner: E) -> Self {
        Cursor {
            inner: Some(inner),
            current: None,
        }
    }

    /// Advance to the next element, returning whether there is one
    pub fn move_next(&mut self) -> bool {
        self.current = match self.inner.as_mut() {
            Some(inner) => inner.next(),
            None => None,
        };
        self.current.is_some()
    }

    /// The element produced by the last successful `move_next`
    #[inline]
    pub fn current(&self) -> Option<&E::Item> {
        self.current.as_ref()
    }

    pub fn state(&self) -> State {
        match self.inner {
            Some(ref inner) => inner.state(),
            None => State::Disposed,
        }
    }

    /// Release the wrapped iterator. Idempotent.
    pub fn dispose(&mut self) {
        self.current = None;
        if let Some(mut inner) = self.inner.take() {
            inner.dispose();
        }
    }

    pub fn reset(&mut self) -> Result<(), Error> {
        Err(SequenceError::Unsupported("reset").into())
    }
}
