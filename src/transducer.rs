use std::fmt::Debug;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Range;

use failure::Error;
use scroll::ctx::SizeWith;
use scroll::{self, ctx, Pread};

use crate::source::Contiguous;
use crate::SequenceError;

/// A transducer is a contiguous buffer whose elements are computed on demand.
///
/// The transducer function receives the original source input and an index, and returns the
/// element at that index. Nothing is computed until an element is requested, so a transducer is a
/// zero-copy, O(1)-indexable [`Contiguous`] source that every buffer operation in this crate
/// accepts. Slicing only adjusts the window, the input is shared.
///
/// # Example
///
/// ```rust
/// use lazy_linq::{ContiguousExt, Transducer};
///
/// let squares = Transducer::new(10usize, 10, |_, idx| idx * idx);
/// let odd: Vec<_> = squares.split_when(|n: &usize| n % 2 == 0).map(|run| run.len()).collect();
/// assert_eq!(odd, vec![0, 1, 1, 1, 1, 1]);
/// ```
#[derive(Debug)]
pub struct Transducer<'a, Input, Output>
where
    Input: 'a + Copy,
    Output: 'a,
{
    pub(crate) count: usize,
    pub(crate) offset: usize,
    pub(crate) contents: Input,
    pub(crate) transducer: fn(Input, usize) -> Output,
    pub(crate) _marker: PhantomData<&'a Output>,
}

impl<'a, Input, Output> Transducer<'a, Input, Output>
where
    Input: 'a + Copy,
    Output: 'a,
{
    /// Create a new transducer with `count` elements in `contents`, using `transducer` to extract
    /// them.
    pub fn new(contents: Input, count: usize, transducer: fn(Input, usize) -> Output) -> Self {
        Transducer {
            count,
            offset: 0,
            contents,
            transducer,
            _marker: PhantomData,
        }
    }

    /// How many elements are visible through this transducer
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get an element out of the transducer
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Output> {
        if idx >= self.count {
            None
        } else {
            Some((self.transducer)(self.contents, self.offset + idx))
        }
    }

    /// A view of the elements in `range`, sharing this transducer's input.
    pub fn window(&self, range: Range<usize>) -> Result<Self, Error> {
        if range.start > range.end || range.end > self.count {
            return Err(SequenceError::InvalidArgument {
                name: "range",
                reason: "window exceeds the transducer's length",
            }
            .into());
        }
        let offset = self
            .offset
            .checked_add(range.start)
            .ok_or(SequenceError::Overflow { what: "transducer offset" })?;
        Ok(Transducer {
            count: range.end - range.start,
            offset,
            ..*self
        })
    }

    pub fn iter(&self) -> Iter<'_, 'a, Input, Output> {
        self.into_iter()
    }
}

/// A scroll-based transducer parses fixed-size records out of a byte buffer, one record per index,
/// and only requires a parsing context for construction.
/// The bounds are checked according to the size of the input and the number of elements requested
/// from the byte source.
///
/// In order to use this, you must implement `TryFromCtx` and `SizeWith`, which you can usually
/// derive with `#[derive(Pread, SizeWith)]`
pub type ScrollTransducer<'a, Output, Ctx = scroll::Endian> =
    Transducer<'a, (&'a [u8], Ctx), Output>;

impl<'a, Output, Ctx, E> ScrollTransducer<'a, Output, Ctx>
where
    Ctx: Copy + Default,
    Output: 'a + ctx::TryFromCtx<'a, Ctx, Error = E, Size = usize> + SizeWith<Ctx, Units = usize>,
    E: From<scroll::Error> + Debug,
{
    /// The transducer is just `pread`, whose impl is defined by the user, or via derive macro.
    /// Fixed-size records only fail on bounds, and we bounds checked on creation.
    fn pread((input, ctx): (&'a [u8], Ctx), idx: usize) -> Output {
        let offset = Output::size_with(&ctx) * idx;
        input.pread_with(offset, ctx).unwrap()
    }

    /// Create a new scroll-based transducer,
    /// using the given context to parse `count` elements out of `contents`
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazy_linq::{ContiguousExt, Endian, ScrollTransducer};
    ///
    /// let bytes = vec![1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef];
    /// let lt: ScrollTransducer<u32> = ScrollTransducer::parse_with(&bytes, 4, Endian::Little).unwrap();
    /// let ones: Vec<_> = lt.indices_of(1).collect();
    /// assert_eq!(ones, vec![0, 2]);
    /// ```
    pub fn parse_with(contents: &'a [u8], count: usize, ctx: Ctx) -> Result<Self, Error> {
        let sizeof_element = Output::size_with(&ctx);
        let total_size = sizeof_element
            .checked_mul(count)
            .ok_or(SequenceError::Overflow { what: "record buffer size" })?;
        if total_size > contents.len() {
            Err(SequenceError::ElementOverflow {
                nelements: count,
                sizeof_element,
                src_size: contents.len(),
            }
            .into())
        } else {
            Ok(Transducer::new((contents, ctx), count, Self::pread))
        }
    }
}

impl<'a, Input: Copy, Output> Clone for Transducer<'a, Input, Output> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, Input: Copy, Output> Copy for Transducer<'a, Input, Output> {}

impl<'a, Input: Copy, Output> Contiguous for Transducer<'a, Input, Output> {
    type Elem = Output;

    #[inline]
    fn len(self) -> usize {
        self.count
    }
    #[inline]
    fn step(self, pos: usize) -> Option<(Output, usize)> {
        self.get(pos).map(|elem| (elem, pos + 1))
    }
    #[inline]
    fn step_back(self, end: usize) -> Option<(Output, usize)> {
        if end == 0 {
            None
        } else {
            self.get(end - 1).map(|elem| (elem, end - 1))
        }
    }
    fn slice(self, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= self.count,
            "slice {:?} out of range for transducer of length {}",
            range,
            self.count
        );
        Transducer {
            count: range.end - range.start,
            offset: self.offset + range.start,
            ..self
        }
    }
}

pub struct IntoIter<'a, Input: 'a + Copy, Output: 'a> {
    current: usize,
    lt: Transducer<'a, Input, Output>,
}

pub struct Iter<'b, 'a: 'b, Input: 'a + Copy, Output: 'a> {
    current: usize,
    lt: &'b Transducer<'a, Input, Output>,
}

impl<'a, 'b, Input: Copy, Output> Iterator for Iter<'a, 'b, Input, Output> {
    type Item = Output;
    fn next(&mut self) -> Option<Self::Item> {
        let output = self.lt.get(self.current)?;
        self.current += 1;
        Some(output)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.lt.count - self.current.min(self.lt.count);
        (remaining, Some(remaining))
    }
}

impl<'a, Input: Copy, Output> Iterator for IntoIter<'a, Input, Output> {
    type Item = Output;
    fn next(&mut self) -> Option<Self::Item> {
        let output = self.lt.get(self.current)?;
        self.current += 1;
        Some(output)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.lt.count - self.current.min(self.lt.count);
        (remaining, Some(remaining))
    }
}

impl<'a, Input: Copy, Output> IntoIterator for Transducer<'a, Input, Output> {
    type Item = Output;
    type IntoIter = IntoIter<'a, Input, Output>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { current: 0, lt: self }
    }
}

impl<'a, 'b, Input: Copy, Output> IntoIterator for &'b Transducer<'a, Input, Output> {
    type Item = Output;
    type IntoIter = Iter<'b, 'a, Input, Output>;

    fn into_iter(self) -> Self::IntoIter {
        Iter { current: 0, lt: self }
    }
}

impl<'a, Input: Copy, Output> ExactSizeIterator for IntoIter<'a, Input, Output> {}
impl<'a, 'b, Input: Copy, Output> ExactSizeIterator for Iter<'a, 'b, Input, Output> {}
impl<'a, Input: Copy, Output> FusedIterator for IntoIter<'a, Input, Output> {}
impl<'a, 'b, Input: Copy, Output> FusedIterator for Iter<'a, 'b, Input, Output> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubled(input: &[u32], idx: usize) -> u32 {
        input[idx] * 2
    }

    #[test]
    fn window_shares_input() {
        let data = [1, 2, 3, 4, 5];
        let lt = Transducer::new(&data[..], data.len(), doubled);
        let mid = lt.window(1..4).unwrap();
        assert_eq!(mid.len(), 3);
        assert_eq!(mid.get(0), Some(4));
        assert_eq!(mid.get(3), None);
        assert_eq!(mid.iter().collect::<Vec<_>>(), vec![4, 6, 8]);
        let inner = mid.slice(1..2);
        assert_eq!(inner.into_iter().collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn window_out_of_range() {
        let data = [1, 2, 3];
        let lt = Transducer::new(&data[..], data.len(), doubled);
        let err = lt.window(2..5).unwrap_err();
        match err.downcast_ref::<SequenceError>() {
            Some(SequenceError::InvalidArgument { name, .. }) => assert_eq!(*name, "range"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn scroll_transducer_rejects_short_input() {
        let bytes = [0u8; 7];
        let err = ScrollTransducer::<u32>::parse_with(&bytes, 2, scroll::LE).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SequenceError>(),
            Some(&SequenceError::ElementOverflow {
                nelements: 2,
                sizeof_element: 4,
                src_size: 7
            })
        );
    }

    #[test]
    fn steps_from_both_ends() {
        let bytes = [1u8, 0, 2, 0, 3, 0];
        let lt: ScrollTransducer<u16> = ScrollTransducer::parse_with(&bytes, 3, scroll::LE).unwrap();
        assert_eq!(lt.step(0), Some((1, 1)));
        assert_eq!(lt.step_back(3), Some((3, 2)));
        assert_eq!(lt.step(3), None);
    }
}
