use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Deref, Range};

/// A bounded, positionally addressed, sliceable source.
///
/// Positions run from `0` to `len()`. For slices and [`Transducer`](crate::Transducer)s a position
/// is an element index; for a [`TextSegment`] it is a byte offset that always lies on a `char`
/// boundary. `step` and `step_back` are O(1), and `slice` never copies.
pub trait Contiguous: Copy {
    /// The element type produced by a step
    type Elem;

    /// One past the last position
    fn len(self) -> usize;

    #[inline]
    fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Number of elements; equal to `len` wherever a position is an element index
    #[inline]
    fn elem_count(self) -> usize {
        self.len()
    }

    /// The element starting at `pos`, and the position of the element after it
    fn step(self, pos: usize) -> Option<(Self::Elem, usize)>;

    /// The element ending at `end`, and the position it starts at
    fn step_back(self, end: usize) -> Option<(Self::Elem, usize)>;

    /// The sub-source covering `range`; both ends must be valid positions
    fn slice(self, range: Range<usize>) -> Self;
}

/// A contiguous source that can test for a multi-element window at a position
pub trait SubSequence: Contiguous {
    /// Whether `needle` occurs in `self` starting at `pos`
    fn matches_at(self, pos: usize, needle: Self) -> bool;
}

impl<'a, T: 'a> Contiguous for &'a [T] {
    type Elem = &'a T;

    #[inline]
    fn len(self) -> usize {
        <[T]>::len(self)
    }
    #[inline]
    fn step(self, pos: usize) -> Option<(&'a T, usize)> {
        self.get(pos).map(|elem| (elem, pos + 1))
    }
    #[inline]
    fn step_back(self, end: usize) -> Option<(&'a T, usize)> {
        if end == 0 {
            None
        } else {
            self.get(end - 1).map(|elem| (elem, end - 1))
        }
    }
    #[inline]
    fn slice(self, range: Range<usize>) -> Self {
        &self[range]
    }
}

impl<'a, T: 'a + PartialEq> SubSequence for &'a [T] {
    #[inline]
    fn matches_at(self, pos: usize, needle: Self) -> bool {
        self.get(pos..).map_or(false, |rest| rest.starts_with(needle))
    }
}

/// An immutable view of text; stepping yields `char`s, positions are byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextSegment<'a> {
    text: &'a str,
}

impl<'a> TextSegment<'a> {
    pub fn new(text: &'a str) -> Self {
        TextSegment { text }
    }
    pub fn as_str(&self) -> &'a str {
        self.text
    }
}

impl<'a> From<&'a str> for TextSegment<'a> {
    fn from(text: &'a str) -> Self {
        TextSegment::new(text)
    }
}

impl<'a> Deref for TextSegment<'a> {
    type Target = str;
    fn deref(&self) -> &str {
        self.text
    }
}

impl<'a, 'b> PartialEq<&'b str> for TextSegment<'a> {
    fn eq(&self, other: &&'b str) -> bool {
        self.text == *other
    }
}

impl<'a> fmt::Debug for TextSegment<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.text, f)
    }
}

impl<'a> fmt::Display for TextSegment<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text)
    }
}

impl<'a> Contiguous for TextSegment<'a> {
    type Elem = char;

    #[inline]
    fn len(self) -> usize {
        self.text.len()
    }
    fn elem_count(self) -> usize {
        self.text.chars().count()
    }
    #[inline]
    fn step(self, pos: usize) -> Option<(char, usize)> {
        let c = self.text.get(pos..)?.chars().next()?;
        Some((c, pos + c.len_utf8()))
    }
    #[inline]
    fn step_back(self, end: usize) -> Option<(char, usize)> {
        let c = self.text.get(..end)?.chars().next_back()?;
        Some((c, end - c.len_utf8()))
    }
    #[inline]
    fn slice(self, range: Range<usize>) -> Self {
        TextSegment {
            text: &self.text[range],
        }
    }
}

impl<'a> SubSequence for TextSegment<'a> {
    #[inline]
    fn matches_at(self, pos: usize, needle: Self) -> bool {
        self.text
            .get(pos..)
            .map_or(false, |rest| rest.starts_with(needle.text))
    }
}

/// A plain double-ended walk over the elements of a contiguous source
#[derive(Debug, Clone)]
pub struct Elements<C> {
    source: C,
    front: usize,
    back: usize,
}

impl<C: Contiguous> Elements<C> {
    pub fn new(source: C) -> Self {
        Elements {
            source,
            front: 0,
            back: source.len(),
        }
    }
    /// The position of the next element from the front
    pub fn position(&self) -> usize {
        self.front
    }
}

impl<C: Contiguous> Iterator for Elements<C> {
    type Item = C::Elem;
    #[inline]
    fn next(&mut self) -> Option<C::Elem> {
        if self.front >= self.back {
            return None;
        }
        let (elem, next) = self.source.step(self.front)?;
        self.front = next;
        Some(elem)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (if remaining > 0 { 1 } else { 0 }, Some(remaining))
    }
}

impl<C: Contiguous> DoubleEndedIterator for Elements<C> {
    #[inline]
    fn next_back(&mut self) -> Option<C::Elem> {
        if self.back <= self.front {
            return None;
        }
        let (elem, start) = self.source.step_back(self.back)?;
        self.back = start;
        Some(elem)
    }
}

impl<C: Contiguous> FusedIterator for Elements<C> {}
