//! Splitting a source into the segments between boundaries.
//!
//! One state machine, [`Split`], drives every variant; a [`Segmenter`] knows how to walk its
//! particular kind of source and recognise a boundary:
//!
//! | segmenter | source | boundary | segment |
//! |---|---|---|---|
//! | [`PullSegmenter`] | any `Iterator` | one element ([`Matcher`]) | `Vec<T>` |
//! | [`ElementSegmenter`] | any [`Contiguous`] | one element ([`Matcher`]) | sub-slice |
//! | [`WindowSegmenter`] | any [`SubSequence`] | a multi-element window | sub-slice |
//!
//! Boundaries are consumed and never part of a segment. Adjacent boundaries produce an empty
//! segment between them, and input that ends on a boundary produces a trailing empty segment, so
//! `n` boundaries always give `n + 1` segments. Empty input gives no segments at all.

use std::iter::FusedIterator;
use std::mem;

use failure::Error;

use crate::contract::{Enumerator, State};
use crate::matcher::Matcher;
use crate::source::{Contiguous, SubSequence};
use crate::SequenceError;

/// What a [`Segmenter`] found when it advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One or more elements were added to the pending segment
    Element,
    /// A boundary was consumed; the pending segment ends before it
    Boundary,
    /// The input is exhausted
    End,
}

pub trait Segmenter {
    type Segment;

    /// Advance past the next element(s) or boundary
    fn advance(&mut self) -> Step;

    /// Take the pending segment, up to but excluding the last boundary, and start a new one
    fn cut(&mut self) -> Self::Segment;
}

/// Splits a pull sequence on elements matched by `M`, collecting each segment into a `Vec`.
#[derive(Debug, Clone)]
pub struct PullSegmenter<I: Iterator, M> {
    source: I,
    boundary: M,
    pending: Vec<I::Item>,
}

impl<I: Iterator, M> PullSegmenter<I, M> {
    pub fn new(source: I, boundary: M) -> Self {
        PullSegmenter {
            source,
            boundary,
            pending: Vec::new(),
        }
    }
}

impl<I, M> Segmenter for PullSegmenter<I, M>
where
    I: Iterator,
    M: Matcher<I::Item>,
{
    type Segment = Vec<I::Item>;

    fn advance(&mut self) -> Step {
        match self.source.next() {
            None => Step::End,
            Some(item) => {
                if self.boundary.matches(&item) {
                    Step::Boundary
                } else {
                    self.pending.push(item);
                    Step::Element
                }
            }
        }
    }

    fn cut(&mut self) -> Vec<I::Item> {
        mem::replace(&mut self.pending, Vec::new())
    }
}

/// Splits a contiguous source on single elements matched by `M`; segments are sub-slices.
#[derive(Debug, Clone)]
pub struct ElementSegmenter<C, M> {
    buffer: C,
    boundary: M,
    start: usize,
    cursor: usize,
    boundary_at: Option<usize>,
}

impl<C: Contiguous, M> ElementSegmenter<C, M> {
    pub fn new(buffer: C, boundary: M) -> Self {
        ElementSegmenter {
            buffer,
            boundary,
            start: 0,
            cursor: 0,
            boundary_at: None,
        }
    }
}

impl<C, M> Segmenter for ElementSegmenter<C, M>
where
    C: Contiguous,
    M: Matcher<C::Elem>,
{
    type Segment = C;

    fn advance(&mut self) -> Step {
        match self.buffer.step(self.cursor) {
            None => Step::End,
            Some((elem, next)) => {
                let at = self.cursor;
                self.cursor = next;
                if self.boundary.matches(&elem) {
                    self.boundary_at = Some(at);
                    Step::Boundary
                } else {
                    Step::Element
                }
            }
        }
    }

    fn cut(&mut self) -> C {
        let end = self.boundary_at.take().unwrap_or(self.cursor);
        let segment = self.buffer.slice(self.start..end);
        self.start = self.cursor;
        segment
    }
}

/// Splits a contiguous source on every occurrence of a non-empty `needle`.
///
/// Candidates are positions whose element equals the needle's first element; only those are
/// checked against the whole window. Matches never overlap: scanning resumes after each one.
#[derive(Debug, Clone)]
pub struct WindowSegmenter<C: Contiguous> {
    buffer: C,
    needle: C,
    first: C::Elem,
    start: usize,
    cursor: usize,
    boundary_at: Option<usize>,
    /// A match found ahead of the cursor, consumed by the next `advance`
    next_match: Option<usize>,
}

impl<C> WindowSegmenter<C>
where
    C: SubSequence,
    C::Elem: PartialEq,
{
    /// Fails with [`SequenceError::InvalidArgument`] if `needle` is empty.
    pub fn new(buffer: C, needle: C) -> Result<Self, Error> {
        let first = match needle.step(0) {
            Some((first, _)) => first,
            None => {
                return Err(SequenceError::InvalidArgument {
                    name: "separator",
                    reason: "a sub-sequence separator must not be empty",
                }
                .into())
            }
        };
        Ok(WindowSegmenter {
            buffer,
            needle,
            first,
            start: 0,
            cursor: 0,
            boundary_at: None,
            next_match: None,
        })
    }

    /// The position of the next occurrence of the needle at or after `from`
    fn find(&self, from: usize) -> Option<usize> {
        let mut pos = from;
        while let Some((elem, next)) = self.buffer.step(pos) {
            if elem == self.first && self.buffer.matches_at(pos, self.needle) {
                return Some(pos);
            }
            pos = next;
        }
        None
    }
}

impl<C> Segmenter for WindowSegmenter<C>
where
    C: SubSequence,
    C::Elem: PartialEq,
{
    type Segment = C;

    fn advance(&mut self) -> Step {
        let len = self.buffer.len();
        if self.cursor >= len {
            return Step::End;
        }
        let found = match self.next_match.take() {
            Some(at) => Some(at),
            None => self.find(self.cursor),
        };
        match found {
            Some(at) if at == self.cursor => {
                self.boundary_at = Some(at);
                self.cursor = at + self.needle.len();
                Step::Boundary
            }
            Some(at) => {
                self.cursor = at;
                self.next_match = Some(at);
                Step::Element
            }
            None => {
                self.cursor = len;
                Step::Element
            }
        }
    }

    fn cut(&mut self) -> C {
        let end = self.boundary_at.take().unwrap_or(self.cursor);
        let segment = self.buffer.slice(self.start..end);
        self.start = self.cursor;
        segment
    }
}

/// Lazily yields the segments between boundaries, one per `next`.
#[derive(Debug, Clone)]
pub struct Split<S> {
    segmenter: Option<S>,
    pending: bool,
    state: State,
}

impl<S: Segmenter> Split<S> {
    pub fn new(segmenter: S) -> Self {
        Split {
            segmenter: Some(segmenter),
            pending: false,
            state: State::NotStarted,
        }
    }
}

impl<S: Segmenter> Iterator for Split<S> {
    type Item = S::Segment;

    fn next(&mut self) -> Option<S::Segment> {
        if self.state.is_finished() {
            return None;
        }
        let segmenter = self.segmenter.as_mut()?;
        self.state = State::Running;
        loop {
            match segmenter.advance() {
                Step::Element => self.pending = true,
                Step::Boundary => {
                    // whatever follows a boundary is a segment, even if it is empty
                    self.pending = true;
                    return Some(segmenter.cut());
                }
                Step::End => {
                    let last = if self.pending {
                        Some(segmenter.cut())
                    } else {
                        None
                    };
                    trace!("split: input exhausted");
                    self.segmenter = None;
                    self.pending = false;
                    self.state = State::Exhausted;
                    return last;
                }
            }
        }
    }
}

impl<S: Segmenter> FusedIterator for Split<S> {}

impl<S: Segmenter> Enumerator for Split<S> {
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.segmenter = None;
        self.pending = false;
        self.state = State::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{Equals, Predicate};
    use crate::source::TextSegment;
    use std::cell::Cell;
    use std::ops::Range;

    fn text_split(text: &str, separator: char) -> Vec<&str> {
        Split::new(ElementSegmenter::new(TextSegment::new(text), Equals(separator)))
            .map(|s| s.as_str())
            .collect()
    }

    fn window_split<'a>(text: &'a str, separator: &'a str) -> Vec<&'a str> {
        Split::new(WindowSegmenter::new(TextSegment::new(text), TextSegment::new(separator)).unwrap())
            .map(|s| s.as_str())
            .collect()
    }

    #[test]
    fn element_boundaries() {
        assert_eq!(text_split("a,b,,c", ','), vec!["a", "b", "", "c"]);
        assert_eq!(text_split("abc", ','), vec!["abc"]);
        assert_eq!(text_split("a,", ','), vec!["a", ""]);
        assert_eq!(text_split(",a", ','), vec!["", "a"]);
        assert_eq!(text_split(",", ','), vec!["", ""]);
        assert_eq!(text_split("", ','), Vec::<&str>::new());
    }

    #[test]
    fn pull_boundaries() {
        let split = |items: Vec<i32>| -> Vec<Vec<i32>> {
            Split::new(PullSegmenter::new(items.into_iter(), Equals(0))).collect()
        };
        assert_eq!(split(vec![1, 2, 0, 3]), vec![vec![1, 2], vec![3]]);
        assert_eq!(split(vec![0, 0]), vec![vec![], vec![], vec![]]);
        assert_eq!(split(vec![1, 0]), vec![vec![1], vec![]]);
        assert!(split(vec![]).is_empty());
    }

    #[test]
    fn predicate_boundaries_over_slices() {
        let data = [1, 2, 7, 3, 9, 4];
        let segments: Vec<&[i32]> =
            Split::new(ElementSegmenter::new(&data[..], Predicate(|n: &&i32| **n > 5))).collect();
        assert_eq!(segments, vec![&[1, 2][..], &[3][..], &[4][..]]);
    }

    #[test]
    fn window_boundaries() {
        assert_eq!(window_split("a::b::::c", "::"), vec!["a", "b", "", "c"]);
        assert_eq!(window_split("a:b", "::"), vec!["a:b"]);
        assert_eq!(window_split("ab::", "::"), vec!["ab", ""]);
        assert_eq!(window_split(":::", "::"), vec!["", ":"]);
        assert_eq!(window_split("añ->ñb->", "->"), vec!["añ", "ñb", ""]);
    }

    #[test]
    fn window_over_slices() {
        let data = [1, 0, 0, 2, 0, 3, 0, 0];
        let segments: Vec<&[i32]> =
            Split::new(WindowSegmenter::new(&data[..], &[0, 0][..]).unwrap()).collect();
        assert_eq!(segments, vec![&[1][..], &[2, 0, 3][..], &[][..]]);
    }

    #[derive(Clone, Copy)]
    struct CountedWindows<'a> {
        data: &'a [u8],
        checks: &'a Cell<usize>,
    }

    impl<'a> Contiguous for CountedWindows<'a> {
        type Elem = &'a u8;

        fn len(self) -> usize {
            self.data.len()
        }
        fn step(self, pos: usize) -> Option<(&'a u8, usize)> {
            self.data.step(pos)
        }
        fn step_back(self, end: usize) -> Option<(&'a u8, usize)> {
            self.data.step_back(end)
        }
        fn slice(self, range: Range<usize>) -> Self {
            CountedWindows {
                data: &self.data[range],
                ..self
            }
        }
    }

    impl<'a> SubSequence for CountedWindows<'a> {
        fn matches_at(self, pos: usize, needle: Self) -> bool {
            self.checks.set(self.checks.get() + 1);
            self.data.matches_at(pos, needle.data)
        }
    }

    #[test]
    fn each_window_match_is_checked_once() {
        let checks = Cell::new(0);
        let data = [1u8, 0, 0, 2, 0, 0, 3];
        let haystack = CountedWindows { data: &data[..], checks: &checks };
        let needle = CountedWindows { data: &[0, 0][..], checks: &checks };
        let segments: Vec<&[u8]> = Split::new(WindowSegmenter::new(haystack, needle).unwrap())
            .map(|segment| segment.data)
            .collect();
        assert_eq!(segments, vec![&[1][..], &[2][..], &[3][..]]);
        assert_eq!(checks.get(), 2);
    }

    #[test]
    fn empty_needle_is_invalid() {
        let err = WindowSegmenter::new(TextSegment::new("abc"), TextSegment::new("")).unwrap_err();
        match err.downcast_ref::<SequenceError>() {
            Some(&SequenceError::InvalidArgument { name, .. }) => assert_eq!(name, "separator"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn exhaustion_is_idempotent() {
        let mut split = Split::new(ElementSegmenter::new(TextSegment::new("a"), Equals(',')));
        assert_eq!(split.state(), State::NotStarted);
        assert_eq!(split.next().map(|s| s.as_str()), Some("a"));
        assert_eq!(split.next(), None);
        assert_eq!(split.next(), None);
        assert_eq!(split.state(), State::Exhausted);
        assert!(split.reset().is_err());
    }
}
