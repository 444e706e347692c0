use std::collections::VecDeque;
use std::iter::FusedIterator;

use failure::Error;

use crate::contract::{Enumerator, State};
use crate::matcher::Matcher;
use crate::source::Contiguous;
use crate::SequenceError;

/// Rejects a zero count for first-N / last-N searches
pub(crate) fn check_count(count: usize) -> Result<usize, Error> {
    if count == 0 {
        Err(SequenceError::InvalidArgument {
            name: "count",
            reason: "must be greater than zero",
        }
        .into())
    } else {
        Ok(count)
    }
}

/// Lazily yields the zero-based indices of the elements of a pull sequence that match.
///
/// Nothing is collected up front, so composing with `take(n)` stops the scan at the `n`th match.
#[derive(Debug, Clone)]
pub struct IndicesOf<I, M> {
    source: Option<I>,
    matcher: M,
    index: usize,
    state: State,
}

impl<I, M> IndicesOf<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    pub fn new(source: I, matcher: M) -> Self {
        IndicesOf {
            source: Some(source),
            matcher,
            index: 0,
            state: State::NotStarted,
        }
    }
}

impl<I, M> Iterator for IndicesOf<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.state.is_finished() {
            return None;
        }
        let source = self.source.as_mut()?;
        self.state = State::Running;
        while let Some(item) = source.next() {
            let index = self.index;
            self.index += 1;
            if self.matcher.matches(&item) {
                return Some(index);
            }
        }
        trace!("indices: source exhausted after {} elements", self.index);
        self.source = None;
        self.state = State::Exhausted;
        None
    }
}

impl<I, M> FusedIterator for IndicesOf<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
}

impl<I, M> Enumerator for IndicesOf<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.source = None;
        self.state = State::Disposed;
    }
}

/// Index search over a contiguous source, from either end.
///
/// Yields zero-based element indices, the same numbers [`IndicesOf`] reports for the equivalent
/// pull sequence, including over text where a `char` may span several bytes. Because the source
/// is bounded, searching from the back is as lazy as searching from the front, which is how last-N
/// is served for buffers: `rev().take(n)`.
#[derive(Debug, Clone)]
pub struct BufferIndices<C, M> {
    buffer: C,
    matcher: M,
    front: usize,
    back: usize,
    front_index: usize,
    /// One past the index of the element ending at `back`; counted on the first `next_back`
    back_index: Option<usize>,
    state: State,
}

impl<C, M> BufferIndices<C, M>
where
    C: Contiguous,
    M: Matcher<C::Elem>,
{
    pub fn new(buffer: C, matcher: M) -> Self {
        BufferIndices {
            buffer,
            matcher,
            front: 0,
            back: buffer.len(),
            front_index: 0,
            back_index: None,
            state: State::NotStarted,
        }
    }

    fn exhaust(&mut self) -> Option<usize> {
        self.front = self.back;
        self.state = State::Exhausted;
        None
    }
}

impl<C, M> Iterator for BufferIndices<C, M>
where
    C: Contiguous,
    M: Matcher<C::Elem>,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.state.is_finished() {
            return None;
        }
        self.state = State::Running;
        while self.front < self.back {
            let (elem, next) = match self.buffer.step(self.front) {
                Some(step) => step,
                None => break,
            };
            let index = self.front_index;
            self.front = next;
            self.front_index += 1;
            if self.matcher.matches(&elem) {
                return Some(index);
            }
        }
        self.exhaust()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back.saturating_sub(self.front)))
    }
}

impl<C, M> DoubleEndedIterator for BufferIndices<C, M>
where
    C: Contiguous,
    M: Matcher<C::Elem>,
{
    fn next_back(&mut self) -> Option<usize> {
        if self.state.is_finished() {
            return None;
        }
        self.state = State::Running;
        let buffer = self.buffer;
        let mut back_index = match self.back_index {
            Some(index) => index,
            None => buffer.elem_count(),
        };
        while self.back > self.front {
            let (elem, start) = match buffer.step_back(self.back) {
                Some(step) => step,
                None => break,
            };
            self.back = start;
            back_index -= 1;
            if self.matcher.matches(&elem) {
                self.back_index = Some(back_index);
                return Some(back_index);
            }
        }
        self.back_index = Some(back_index);
        self.exhaust()
    }
}

impl<C, M> FusedIterator for BufferIndices<C, M>
where
    C: Contiguous,
    M: Matcher<C::Elem>,
{
}

impl<C, M> Enumerator for BufferIndices<C, M>
where
    C: Contiguous,
    M: Matcher<C::Elem>,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.front = self.back;
        self.state = State::Disposed;
    }
}

/// The last `count` matching indices of a pull sequence, highest first.
///
/// A pull sequence cannot be read backwards, so the first `next` traverses the *entire* source
/// before anything is yielded. Never use this on an unbounded source. At most `count` indices are
/// retained while scanning.
#[derive(Debug, Clone)]
pub struct LastIndices<I, M> {
    search: Option<IndicesOf<I, M>>,
    count: usize,
    found: VecDeque<usize>,
    state: State,
}

impl<I, M> LastIndices<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    /// Fails with [`SequenceError::InvalidArgument`] if `count` is zero.
    pub fn new(source: I, matcher: M, count: usize) -> Result<Self, Error> {
        let count = check_count(count)?;
        Ok(LastIndices {
            search: Some(IndicesOf::new(source, matcher)),
            count,
            found: VecDeque::new(),
            state: State::NotStarted,
        })
    }
}

impl<I, M> Iterator for LastIndices<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self.state {
            State::NotStarted => {
                if let Some(search) = self.search.take() {
                    for index in search {
                        if self.found.len() == self.count {
                            self.found.pop_front();
                        }
                        self.found.push_back(index);
                    }
                }
                self.state = State::Running;
            }
            State::Running => {}
            State::Exhausted | State::Disposed => return None,
        }
        let index = self.found.pop_back();
        if index.is_none() {
            self.state = State::Exhausted;
        }
        index
    }
}

impl<I, M> FusedIterator for LastIndices<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
}

impl<I, M> Enumerator for LastIndices<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.search = None;
        self.found.clear();
        self.state = State::Disposed;
    }
}
